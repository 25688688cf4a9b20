/*
[INPUT]:  ConsoleContext, a Prompter and the --init flag
[OUTPUT]: Menu loop that dispatches commands until EXIT
[POS]:    Shell layer - interactive session driver
[UPDATE]: When changing menu flow or exit handling
*/

use tracing::{debug, info};

use crate::commands::input::offer_wallet_alias;
use crate::commands::{Command, MenuEntry, dispatch, menu_entries};
use crate::display;
use crate::error::{ConsoleError, Result};
use crate::prompt::Prompter;
use crate::session::ConsoleContext;

const MENU_PROMPT: &str = "What would you like to do?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    Running,
    Exiting,
}

/// Interactive console session
pub struct Shell<P: Prompter> {
    ctx: ConsoleContext,
    prompter: P,
    state: ShellState,
}

impl<P: Prompter> Shell<P> {
    pub fn new(ctx: ConsoleContext, prompter: P) -> Self {
        Self {
            ctx,
            prompter,
            state: ShellState::Running,
        }
    }

    pub fn state(&self) -> ShellState {
        self.state
    }

    pub fn context(&self) -> &ConsoleContext {
        &self.ctx
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    /// Run until EXIT is chosen or the main menu is dismissed
    pub async fn run(&mut self, auto_init: bool) -> Result<()> {
        if auto_init {
            self.auto_initialize().await;
        }

        while self.state == ShellState::Running {
            match self.step().await {
                Ok(()) => {}
                Err(ConsoleError::PromptCancelled) => {
                    info!("menu dismissed, leaving console");
                    self.state = ShellState::Exiting;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    async fn auto_initialize(&mut self) {
        self.ctx.auto = true;
        let outcome = dispatch(&mut self.ctx, &mut self.prompter, Command::InitEmbeddedWallet).await;
        self.ctx.auto = false;
        display::print_outcome(&outcome);
    }

    /// Render the header and menu once, then act on the selection
    pub async fn step(&mut self) -> Result<()> {
        println!("{}", display::session_header(&self.ctx.config.env, &self.ctx.session));

        let entries = menu_entries(&self.ctx.session);
        let items: Vec<String> = entries.iter().map(MenuEntry::text).collect();
        let default = entries
            .iter()
            .position(|entry| !matches!(entry, MenuEntry::Header(_)))
            .unwrap_or(0);

        let index = self.prompter.select(MENU_PROMPT, &items, default)?;
        match entries.get(index) {
            Some(MenuEntry::Command(command)) => {
                let outcome = dispatch(&mut self.ctx, &mut self.prompter, *command).await;
                display::print_outcome(&outcome);
            }
            Some(MenuEntry::Exit) => self.exit().await?,
            Some(MenuEntry::Header(text)) => debug!(header = %text, "header selected, re-rendering"),
            None => debug!(index, "selection out of range, re-rendering"),
        }
        Ok(())
    }

    async fn exit(&mut self) -> Result<()> {
        if let Some(wallet_id) = self.ctx.session.active_wallet_id.clone() {
            if let Some(name) = offer_wallet_alias(&self.ctx, &mut self.prompter, &wallet_id).await? {
                info!(name = %name, wallet_id = %wallet_id, "wallet alias saved on exit");
            }
        }
        self.state = ShellState::Exiting;
        Ok(())
    }
}

impl<P: Prompter> std::fmt::Debug for Shell<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("ctx", &self.ctx)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
