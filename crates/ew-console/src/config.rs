/*
[INPUT]:  YAML files under the config dir and EWC_* environment variables
[OUTPUT]: Parsed console configuration
[POS]:    Configuration layer - auth, bridge, storage and prompt defaults
[UPDATE]: When adding new configuration options
*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use ew_console_adapter::auth::identity_toolkit::{
    DEFAULT_CUSTOM_TOKEN_AUDIENCE, DEFAULT_IDENTITY_BASE_URL,
};
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "EWC";

/// Top-level configuration for the console
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsoleConfig {
    /// Environment label shown in the session header
    #[serde(default = "default_env")]
    pub env: String,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub defaults: PromptDefaults,
}

/// Identity provider settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Auth client id handed to the embedded wallet SDK
    #[serde(default)]
    pub client_id: String,
    /// Subject whose ID token authenticates SDK calls
    #[serde(default)]
    pub subject_uid: String,
    #[serde(default)]
    pub api_key: String,
    /// Service account JSON used to sign custom tokens
    #[serde(default)]
    pub service_account_path: Option<PathBuf>,
    #[serde(default = "default_identity_base_url")]
    pub identity_base_url: String,
    #[serde(default = "default_custom_token_audience")]
    pub custom_token_audience: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            subject_uid: String::new(),
            api_key: String::new(),
            service_account_path: None,
            identity_base_url: default_identity_base_url(),
            custom_token_audience: default_custom_token_audience(),
        }
    }
}

/// SDK bridge settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BridgeConfig {
    #[serde(default = "default_bridge_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Default answer for "Enable SDK logs?"
    #[serde(default)]
    pub sdk_logs: bool,
}

impl BridgeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            base_url: default_bridge_url(),
            timeout_secs: default_timeout_secs(),
            sdk_logs: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

/// Defaults offered by key backup/recovery prompts
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PromptDefaults {
    #[serde(default)]
    pub passphrase: Option<String>,
    #[serde(default)]
    pub passphrase_id: Option<String>,
}

fn default_env() -> String {
    "default".to_string()
}

fn default_identity_base_url() -> String {
    DEFAULT_IDENTITY_BASE_URL.to_string()
}

fn default_custom_token_audience() -> String {
    DEFAULT_CUSTOM_TOKEN_AUDIENCE.to_string()
}

fn default_bridge_url() -> String {
    "http://127.0.0.1:8787".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("./storage")
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            env: default_env(),
            auth: AuthConfig::default(),
            bridge: BridgeConfig::default(),
            storage: StorageConfig::default(),
            defaults: PromptDefaults::default(),
        }
    }
}

impl ConsoleConfig {
    /// Load `default.yaml`, then `<env>.yaml`, then `EWC_*` variables
    ///
    /// `default.yaml` is optional; a named environment file must exist.
    pub fn load(config_dir: &Path, env: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder()
            .add_source(File::from(config_dir.join("default.yaml")).required(false));

        if let Some(env) = env {
            let env_file = config_dir.join(format!("{env}.yaml"));
            builder = builder.add_source(File::from(env_file.as_path()).required(true));
            builder = builder.set_override("env", env)?;
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("load configuration from {}", config_dir.display()))?;

        config
            .try_deserialize()
            .context("parse console configuration")
    }

    /// Parse a single YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("parse console configuration")
    }

    pub fn wallet_ids_path(&self) -> PathBuf {
        self.storage.dir.join("WALLET_IDS.txt")
    }

    pub fn device_id_path(&self) -> PathBuf {
        self.storage.dir.join("LATEST_DEVICE_ID.txt")
    }
}
