/*
[INPUT]:  CLI arguments, YAML configuration, service account key
[OUTPUT]: Interactive embedded wallet console session
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags or startup wiring
*/

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use ew_console::{ConsoleConfig, ConsoleContext, Shell, TerminalPrompter};
use ew_console_adapter::{
    ClientConfig, HttpSdkBridge, IdentityToolkitConfig, IdentityToolkitProvider,
    ServiceAccountKey, TokenCache,
};

#[derive(Parser, Debug)]
#[command(name = "ew-console", version, about = "Interactive embedded wallet developer console")]
struct Cli {
    /// Initialize the embedded wallet and device without prompting
    #[arg(long)]
    init: bool,
    /// Environment file to layer over default.yaml
    #[arg(long, value_name = "ENV")]
    env: Option<String>,
    #[arg(long = "config-dir", value_name = "DIR", default_value = "config")]
    config_dir: PathBuf,
    /// Overrides storage.dir from the configuration
    #[arg(long = "storage-dir", value_name = "DIR")]
    storage_dir: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    log_level: String,
    /// Write logs to this file instead of stderr
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let _guard = init_tracing(&args.log_level, args.log_file.as_deref())?;

    let mut config = ConsoleConfig::load(&args.config_dir, args.env.as_deref())?;
    if let Some(dir) = args.storage_dir {
        config.storage.dir = dir;
    }
    info!(
        env = %config.env,
        bridge = %config.bridge.base_url,
        storage = %config.storage.dir.display(),
        "starting ew-console"
    );
    if config.auth.subject_uid.is_empty() {
        warn!("auth.subject_uid is empty; token exchange will fail until it is set");
    }

    let key_path = config
        .auth
        .service_account_path
        .clone()
        .context("auth.service_account_path is not configured")?;
    let key = ServiceAccountKey::from_file(&key_path)
        .with_context(|| format!("read service account key {}", key_path.display()))?;

    let mut identity = IdentityToolkitConfig::new(&config.auth.api_key, &config.auth.subject_uid);
    identity.base_url = config.auth.identity_base_url.clone();
    identity.custom_token_audience = config.auth.custom_token_audience.clone();
    let provider = Arc::new(
        IdentityToolkitProvider::new(key, identity).context("build identity provider")?,
    );

    let tokens = TokenCache::new(provider.clone());
    let client_config = ClientConfig {
        timeout: config.bridge.timeout(),
        ..ClientConfig::default()
    };
    let bridge = HttpSdkBridge::with_config(&config.bridge.base_url, client_config, tokens.clone())
        .context("build SDK bridge client")?;

    let ctx = ConsoleContext::new(config, tokens, provider, Arc::new(bridge));
    let mut shell = Shell::new(ctx, TerminalPrompter::new());
    shell.run(args.init).await.context("console session")?;

    info!("console session closed");
    Ok(())
}

fn init_tracing(log_level: &str, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_level).context("invalid log level")?,
    };

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|err| anyhow!(err))
            .context("initialize tracing subscriber")?;
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().context("log file path must name a file")?;
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(Some(guard))
}
