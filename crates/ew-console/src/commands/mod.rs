/*
[INPUT]:  Session state and the command picked in the menu
[OUTPUT]: Visible command lists, menu entries and command outcomes
[POS]:    Command layer - command catalogue and dispatch boundary
[UPDATE]: When adding a command or changing tier gating
*/

pub mod base;
pub mod device;
pub mod input;
pub mod wallet;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ConsoleError, Result};
use crate::prompt::Prompter;
use crate::session::{ConsoleContext, SessionState};

/// Label of the menu entry that leaves the shell
pub const EXIT_LABEL: &str = "EXIT";

/// Gate deciding when a command is offered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Always available
    Base,
    /// Needs an initialized embedded wallet
    Wallet,
    /// Needs an initialized device session
    Device,
}

impl Tier {
    pub fn banner(&self) -> Option<&'static str> {
        match self {
            Tier::Base => None,
            Tier::Wallet => Some("========== EW Commands =========="),
            Tier::Device => Some("========== Core Commands =========="),
        }
    }

    pub fn is_open(&self, session: &SessionState) -> bool {
        match self {
            Tier::Base => true,
            Tier::Wallet => session.wallet_ready,
            Tier::Device => session.device_ready,
        }
    }
}

macro_rules! command_table {
    ($( $variant:ident => ($label:expr, $tier:ident, $section:expr) ),+ $(,)?) => {
        /// Every console command, in menu order
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Command {
            $( $variant, )+
        }

        impl Command {
            pub const ALL: &'static [Command] = &[ $( Command::$variant, )+ ];

            pub fn label(&self) -> &'static str {
                match self {
                    $( Command::$variant => $label, )+
                }
            }

            pub fn tier(&self) -> Tier {
                match self {
                    $( Command::$variant => Tier::$tier, )+
                }
            }

            /// Menu section heading the command is listed under
            pub fn section(&self) -> Option<&'static str> {
                match self {
                    $( Command::$variant => $section, )+
                }
            }
        }
    };
}

const WALLET_MANAGEMENT: Option<&str> = Some("Wallet Management");
const NFTS: Option<&str> = Some("NFTs");
const WEB3_CONNECTIONS: Option<&str> = Some("Web3 Connections");
const TRANSACTIONS: Option<&str> = Some("Transactions");
const KEY_MANAGEMENT: Option<&str> = Some("Key Management");
const TRANSACTION_MANAGEMENT: Option<&str> = Some("Transaction Management");
const GENERAL: Option<&str> = Some("General");

command_table! {
    // base
    WalletSummary => ("Get wallet summary", Base, None),
    InitEmbeddedWallet => ("Initialize embedded wallet", Base, None),
    InitCore => ("Initialize device (core)", Base, None),
    RefreshIdpToken => ("Refresh IdP token", Base, None),
    SetCustomPrincipalClaim => ("Set custom principal claim", Base, None),
    GetCustomPrincipalClaim => ("Get custom principal claim", Base, None),

    // embedded wallet
    AssignWallet => ("Assign wallet", Wallet, WALLET_MANAGEMENT),
    CreateAccount => ("Create account", Wallet, WALLET_MANAGEMENT),
    GetAccounts => ("Get accounts", Wallet, WALLET_MANAGEMENT),
    AddAsset => ("Add asset", Wallet, WALLET_MANAGEMENT),
    GetAsset => ("Get asset", Wallet, WALLET_MANAGEMENT),
    GetAssets => ("Get assets", Wallet, WALLET_MANAGEMENT),
    GetBalance => ("Get balance", Wallet, WALLET_MANAGEMENT),
    GetSupportedAssets => ("Get supported assets", Wallet, WALLET_MANAGEMENT),
    RefreshBalance => ("Refresh balance", Wallet, WALLET_MANAGEMENT),
    GetAddresses => ("Get addresses", Wallet, WALLET_MANAGEMENT),
    GetDevice => ("Get device", Wallet, WALLET_MANAGEMENT),
    GetLatestBackup => ("Get latest backup", Wallet, WALLET_MANAGEMENT),
    GetNft => ("Get NFT", Wallet, NFTS),
    GetOwnedNfts => ("Get owned NFTs", Wallet, NFTS),
    ListOwnedAssets => ("List owned assets", Wallet, NFTS),
    ListOwnedCollections => ("List owned collections", Wallet, NFTS),
    CreateWeb3Connection => ("Create web3 connection", Wallet, WEB3_CONNECTIONS),
    GetWeb3Connections => ("Get web3 connections", Wallet, WEB3_CONNECTIONS),
    RemoveWeb3Connection => ("Remove web3 connection", Wallet, WEB3_CONNECTIONS),
    SubmitWeb3Connection => ("Submit web3 connection", Wallet, WEB3_CONNECTIONS),
    CreateTransaction => ("Create transaction", Wallet, TRANSACTIONS),
    CreateAndSignTransaction => ("Create and sign transaction", Wallet, TRANSACTIONS),
    CreateTransactionFromJson => ("Create transaction from JSON", Wallet, TRANSACTIONS),
    GetLatestTransactions => ("Get latest transactions", Wallet, TRANSACTIONS),
    CancelTransaction => ("Cancel transaction", Wallet, TRANSACTIONS),
    EstimateTransactionFee => ("Estimate transaction fee", Wallet, TRANSACTIONS),
    GetTransactionById => ("Get transaction by ID", Wallet, TRANSACTIONS),
    GetTransactions => ("Get transactions", Wallet, TRANSACTIONS),

    // device (core)
    ApproveJoinWalletRequest => ("Approve join wallet request", Device, WALLET_MANAGEMENT),
    RequestJoinExistingWallet => ("Request join existing wallet", Device, WALLET_MANAGEMENT),
    StopJoinWallet => ("Stop join wallet", Device, WALLET_MANAGEMENT),
    Takeover => ("Takeover", Device, WALLET_MANAGEMENT),
    BackupKeys => ("Backup keys", Device, KEY_MANAGEMENT),
    RecoverKeys => ("Recover keys", Device, KEY_MANAGEMENT),
    GenerateMpcKeys => ("Generate MPC keys", Device, KEY_MANAGEMENT),
    DeriveAssetKey => ("Derive asset key", Device, KEY_MANAGEMENT),
    GetKeysStatus => ("Get keys status", Device, KEY_MANAGEMENT),
    StopMpcDeviceSetup => ("Stop MPC device setup", Device, KEY_MANAGEMENT),
    SignTransaction => ("Sign transaction", Device, TRANSACTION_MANAGEMENT),
    StopInProgressSignTransaction => ("Stop in-progress sign transaction", Device, TRANSACTION_MANAGEMENT),
    GetInProgressSigningTxId => ("Get in-progress signing tx ID", Device, TRANSACTION_MANAGEMENT),
    ClearAllStorage => ("Clear all storage", Device, GENERAL),
    Dispose => ("Dispose", Device, GENERAL),
    GetPhysicalDeviceId => ("Get physical device ID", Device, GENERAL),
}

impl Command {
    pub fn from_label(label: &str) -> Option<Command> {
        Command::ALL.iter().copied().find(|command| command.label() == label)
    }

    pub fn in_tier(tier: Tier) -> impl Iterator<Item = Command> {
        Command::ALL
            .iter()
            .copied()
            .filter(move |command| command.tier() == tier)
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

const TIER_ORDER: [Tier; 3] = [Tier::Base, Tier::Wallet, Tier::Device];

/// Commands the session may run: base, then wallet, then device tier
pub fn list_available_commands(session: &SessionState) -> Vec<Command> {
    TIER_ORDER
        .iter()
        .filter(|tier| tier.is_open(session))
        .flat_map(|tier| Command::in_tier(*tier))
        .collect()
}

/// One line of the main menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    /// Tier banner or section title; not selectable
    Header(String),
    Command(Command),
    Exit,
}

impl MenuEntry {
    pub fn text(&self) -> String {
        match self {
            MenuEntry::Header(text) => text.clone(),
            MenuEntry::Command(command) => command.label().to_string(),
            MenuEntry::Exit => EXIT_LABEL.to_string(),
        }
    }
}

/// Available commands with tier banners and section headers, ending in EXIT
pub fn menu_entries(session: &SessionState) -> Vec<MenuEntry> {
    let mut entries = Vec::new();
    for tier in TIER_ORDER.iter().filter(|tier| tier.is_open(session)) {
        if let Some(banner) = tier.banner() {
            entries.push(MenuEntry::Header(banner.to_string()));
        }
        let mut current_section = None;
        for command in Command::in_tier(*tier) {
            if command.section().is_some() && command.section() != current_section {
                current_section = command.section();
                if let Some(title) = current_section {
                    entries.push(MenuEntry::Header(format!("--- {title} ---")));
                }
            }
            entries.push(MenuEntry::Command(command));
        }
    }
    entries.push(MenuEntry::Exit);
    entries
}

/// Failure rendered in the red panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFailure {
    pub name: String,
    pub message: String,
}

impl From<&ConsoleError> for CommandFailure {
    fn from(err: &ConsoleError) -> Self {
        Self {
            name: err.name().to_string(),
            message: err.to_string(),
        }
    }
}

/// Result of one dispatched command
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Success(Value),
    Failure(CommandFailure),
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CommandOutcome::Success(_))
    }
}

/// Run `command`, converting every error into a failure outcome
pub async fn dispatch(
    ctx: &mut ConsoleContext,
    prompter: &mut dyn Prompter,
    command: Command,
) -> CommandOutcome {
    debug!(command = command.label(), "dispatching command");
    match invoke(ctx, prompter, command).await {
        Ok(value) => CommandOutcome::Success(value),
        Err(err) => {
            warn!(command = command.label(), error = %err, "command failed");
            CommandOutcome::Failure(CommandFailure::from(&err))
        }
    }
}

async fn invoke(
    ctx: &mut ConsoleContext,
    prompter: &mut dyn Prompter,
    command: Command,
) -> Result<Value> {
    match command.tier() {
        Tier::Wallet if !ctx.session.wallet_ready => {
            return Err(ConsoleError::precondition("Embedded Wallet not initialized"));
        }
        Tier::Device if !ctx.session.device_ready => {
            return Err(ConsoleError::precondition("Core not initialized"));
        }
        _ => {}
    }

    match command {
        Command::WalletSummary => base::wallet_summary(ctx).await,
        Command::InitEmbeddedWallet => base::init_embedded_wallet(ctx, prompter).await,
        Command::InitCore => base::init_core(ctx, prompter).await,
        Command::RefreshIdpToken => base::refresh_idp_token(ctx).await,
        Command::SetCustomPrincipalClaim => base::set_custom_principal_claim(ctx, prompter).await,
        Command::GetCustomPrincipalClaim => base::get_custom_principal_claim(ctx, prompter).await,

        Command::AssignWallet => wallet::assign_wallet(ctx).await,
        Command::CreateAccount => wallet::create_account(ctx).await,
        Command::GetAccounts => wallet::get_accounts(ctx).await,
        Command::AddAsset => wallet::add_asset(ctx, prompter).await,
        Command::GetAsset => wallet::get_asset(ctx, prompter).await,
        Command::GetAssets => wallet::get_assets(ctx, prompter).await,
        Command::GetBalance => wallet::get_balance(ctx, prompter).await,
        Command::GetSupportedAssets => wallet::get_supported_assets(ctx).await,
        Command::RefreshBalance => wallet::refresh_balance(ctx, prompter).await,
        Command::GetAddresses => wallet::get_addresses(ctx, prompter).await,
        Command::GetDevice => wallet::get_device(ctx, prompter).await,
        Command::GetLatestBackup => wallet::get_latest_backup(ctx).await,
        Command::GetNft => wallet::get_nft(ctx, prompter).await,
        Command::GetOwnedNfts => wallet::get_owned_nfts(ctx).await,
        Command::ListOwnedAssets => wallet::list_owned_assets(ctx).await,
        Command::ListOwnedCollections => wallet::list_owned_collections(ctx).await,
        Command::CreateWeb3Connection => wallet::create_web3_connection(ctx, prompter).await,
        Command::GetWeb3Connections => wallet::get_web3_connections(ctx).await,
        Command::RemoveWeb3Connection => wallet::remove_web3_connection(ctx, prompter).await,
        Command::SubmitWeb3Connection => wallet::submit_web3_connection(ctx, prompter).await,
        Command::CreateTransaction => wallet::create_transaction(ctx, prompter).await,
        Command::CreateAndSignTransaction => {
            wallet::create_and_sign_transaction(ctx, prompter).await
        }
        Command::CreateTransactionFromJson => {
            wallet::create_transaction_from_json(ctx, prompter).await
        }
        Command::GetLatestTransactions => wallet::get_latest_transactions(ctx).await,
        Command::CancelTransaction => wallet::cancel_transaction(ctx, prompter).await,
        Command::EstimateTransactionFee => wallet::estimate_transaction_fee(ctx, prompter).await,
        Command::GetTransactionById => wallet::get_transaction(ctx, prompter).await,
        Command::GetTransactions => wallet::get_transactions(ctx, prompter).await,

        Command::ApproveJoinWalletRequest => device::approve_join_wallet_request(ctx, prompter).await,
        Command::RequestJoinExistingWallet => device::request_join_existing_wallet(ctx).await,
        Command::StopJoinWallet => device::stop_join_wallet(ctx).await,
        Command::Takeover => device::takeover(ctx).await,
        Command::BackupKeys => device::backup_keys(ctx, prompter).await,
        Command::RecoverKeys => device::recover_keys(ctx, prompter).await,
        Command::GenerateMpcKeys => device::generate_mpc_keys(ctx, prompter).await,
        Command::DeriveAssetKey => device::derive_asset_key(ctx, prompter).await,
        Command::GetKeysStatus => device::get_keys_status(ctx).await,
        Command::StopMpcDeviceSetup => device::stop_mpc_device_setup(ctx).await,
        Command::SignTransaction => device::sign_transaction(ctx, prompter).await,
        Command::StopInProgressSignTransaction => {
            device::stop_in_progress_sign_transaction(ctx).await
        }
        Command::GetInProgressSigningTxId => device::get_in_progress_signing_tx_id(ctx).await,
        Command::ClearAllStorage => device::clear_all_storage(ctx).await,
        Command::Dispose => device::dispose(ctx).await,
        Command::GetPhysicalDeviceId => device::get_physical_device_id(ctx).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use std::collections::HashSet;

    fn session(wallet_ready: bool, device_ready: bool) -> SessionState {
        SessionState {
            wallet_ready,
            device_ready,
            ..SessionState::default()
        }
    }

    #[test]
    fn test_labels_are_unique() {
        let labels: HashSet<&str> = Command::ALL.iter().map(Command::label).collect();
        assert_eq!(labels.len(), Command::ALL.len());
        assert!(!labels.contains(EXIT_LABEL));
    }

    #[test]
    fn test_fresh_session_lists_only_base_commands() {
        let commands = list_available_commands(&session(false, false));
        assert_eq!(commands.len(), 6);
        assert!(commands.iter().all(|c| c.tier() == Tier::Base));
    }

    #[test]
    fn test_wallet_tier_appends_in_declared_order() {
        let base = list_available_commands(&session(false, false));
        let with_wallet = list_available_commands(&session(true, false));

        assert_eq!(&with_wallet[..base.len()], base.as_slice());
        let appended: Vec<Command> = with_wallet[base.len()..].to_vec();
        assert_eq!(appended, Command::in_tier(Tier::Wallet).collect::<Vec<_>>());
        assert_eq!(appended.first(), Some(&Command::AssignWallet));
        assert_eq!(appended.last(), Some(&Command::GetTransactions));
    }

    #[rstest]
    #[case(false, false, 6)]
    #[case(true, false, 6 + 28)]
    #[case(false, true, 6 + 16)]
    #[case(true, true, 6 + 28 + 16)]
    fn test_visible_command_counts(
        #[case] wallet_ready: bool,
        #[case] device_ready: bool,
        #[case] expected: usize,
    ) {
        assert_eq!(list_available_commands(&session(wallet_ready, device_ready)).len(), expected);
    }

    #[rstest]
    #[case("Get wallet summary", Tier::Base)]
    #[case("Get latest transactions", Tier::Wallet)]
    #[case("Generate MPC keys", Tier::Device)]
    fn test_label_tiers(#[case] label: &str, #[case] tier: Tier) {
        assert_eq!(Command::from_label(label).map(|c| c.tier()), Some(tier));
    }

    #[test]
    fn test_menu_headers_are_not_commands() {
        let entries = menu_entries(&session(true, false));
        assert_eq!(entries.last(), Some(&MenuEntry::Exit));
        assert!(entries.contains(&MenuEntry::Header("========== EW Commands ==========".to_string())));
        assert!(entries.contains(&MenuEntry::Header("--- NFTs ---".to_string())));
        assert!(!entries.contains(&MenuEntry::Header("========== Core Commands ==========".to_string())));

        let commands: Vec<Command> = entries
            .iter()
            .filter_map(|entry| match entry {
                MenuEntry::Command(command) => Some(*command),
                _ => None,
            })
            .collect();
        assert_eq!(commands, list_available_commands(&session(true, false)));
    }

    #[test]
    fn test_failure_from_error_uses_name() {
        let failure = CommandFailure::from(&ConsoleError::precondition("Core not initialized"));
        assert_eq!(failure.name, "PreconditionError");
        assert_eq!(failure.message, "Core not initialized");
    }
}
