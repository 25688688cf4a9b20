/*
[INPUT]:  Configuration, token cache, SDK transport and storage
[OUTPUT]: ConsoleContext shared by the shell and every command
[POS]:    Session layer - explicit process state (no globals)
[UPDATE]: When commands need new shared state
*/

use std::sync::Arc;

use ew_console_adapter::{
    ClaimsAdmin, CoreDevice, EmbeddedWallet, SdkTransport, TokenCache,
};
use tracing::info;

use crate::config::ConsoleConfig;
use crate::error::{ConsoleError, Result};
use crate::storage::{DeviceIdStore, WalletAliasRegistry};

/// Which command tiers are open, and the ids they are bound to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub wallet_ready: bool,
    pub device_ready: bool,
    pub active_wallet_id: Option<String>,
    pub active_device_id: Option<String>,
}

impl SessionState {
    pub fn clear_device(&mut self) {
        self.device_ready = false;
        self.active_device_id = None;
    }
}

/// Everything a command may touch, owned by the shell for its lifetime
pub struct ConsoleContext {
    pub config: ConsoleConfig,
    pub tokens: TokenCache,
    pub claims: Arc<dyn ClaimsAdmin>,
    pub aliases: WalletAliasRegistry,
    pub devices: DeviceIdStore,
    pub session: SessionState,
    /// Skip optional prompts (set by `--init`)
    pub auto: bool,
    transport: Arc<dyn SdkTransport>,
    wallet: EmbeddedWallet,
    core: Option<CoreDevice>,
}

impl ConsoleContext {
    pub fn new(
        config: ConsoleConfig,
        tokens: TokenCache,
        claims: Arc<dyn ClaimsAdmin>,
        transport: Arc<dyn SdkTransport>,
    ) -> Self {
        let aliases = WalletAliasRegistry::new(config.wallet_ids_path());
        let devices = DeviceIdStore::new(config.device_id_path());
        Self {
            wallet: EmbeddedWallet::new(transport.clone()),
            config,
            tokens,
            claims,
            aliases,
            devices,
            session: SessionState::default(),
            auto: false,
            transport,
            core: None,
        }
    }

    /// Embedded wallet facade, before or after initialization
    pub fn sdk(&self) -> &EmbeddedWallet {
        &self.wallet
    }

    /// Embedded wallet facade, once the wallet tier is open
    pub fn wallet(&self) -> Result<&EmbeddedWallet> {
        if self.session.wallet_ready {
            Ok(&self.wallet)
        } else {
            Err(ConsoleError::precondition("Embedded Wallet not initialized"))
        }
    }

    /// Device facade, once the device tier is open
    pub fn core(&self) -> Result<&CoreDevice> {
        match (&self.core, self.session.device_ready) {
            (Some(core), true) => Ok(core),
            _ => Err(ConsoleError::precondition("Core not initialized")),
        }
    }

    pub fn mark_wallet_ready(&mut self) {
        self.session.wallet_ready = true;
        info!(env = %self.config.env, "embedded wallet session initialized");
    }

    /// Bind the device tier to `device_id`
    pub fn attach_device(&mut self, device_id: &str) {
        self.core = Some(CoreDevice::new(self.transport.clone(), device_id));
        self.session.device_ready = true;
        self.session.active_device_id = Some(device_id.to_string());
        info!(device_id, "device session initialized");
    }

    /// Close the device tier
    pub fn detach_device(&mut self) {
        if let Some(core) = self.core.take() {
            info!(device_id = core.device_id(), "device session closed");
        }
        self.session.clear_device();
    }

    pub fn set_active_wallet(&mut self, wallet_id: Option<String>) {
        self.session.active_wallet_id = wallet_id;
    }
}

impl std::fmt::Debug for ConsoleContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleContext")
            .field("env", &self.config.env)
            .field("session", &self.session)
            .field("auto", &self.auto)
            .finish_non_exhaustive()
    }
}
