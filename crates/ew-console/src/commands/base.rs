/*
[INPUT]:  Console context and prompter
[OUTPUT]: Session setup, token refresh, claim administration and wallet summary
[POS]:    Command layer - base tier (always available)
[UPDATE]: When base tier commands change
*/

use ew_console_adapter::{
    AdapterError, CLEAR_CLAIMS, CoreDevice, EmbeddedWallet, Result as AdapterResult,
};
use futures_util::future::try_join_all;
use serde_json::{Value, json};
use tracing::{info, warn};
use uuid::Uuid;

use super::input::{self, offer_wallet_alias};
use crate::display::{self, AccountRow, KeyRow};
use crate::error::{ConsoleError, Result};
use crate::prompt::Prompter;
use crate::session::ConsoleContext;

/// Claim key the wallet id is written under
pub const WALLET_CLAIM_KEY: &str = "wallet_claim";

const CLAIM_SOURCES: [&str; 4] = ["RANDOM", "SAVED", "USER_INPUT", CLEAR_CLAIMS];

pub async fn wallet_summary(ctx: &mut ConsoleContext) -> Result<Value> {
    if !(ctx.session.wallet_ready && ctx.session.device_ready) {
        return Err(ConsoleError::precondition(
            "Must initialize both Embedded Wallet and Core NCW",
        ));
    }
    let wallet = ctx.wallet()?.clone();
    let core = ctx.core()?.clone();
    let needs_wallet = ctx.session.active_wallet_id.is_none();

    let (mut accounts, keys, assigned) = tokio::try_join!(
        fetch_account_rows(&wallet),
        fetch_key_rows(&wallet, &core),
        async {
            if needs_wallet {
                let (assigned, _) = wallet.assign_wallet().await?;
                Ok::<_, AdapterError>(Some(assigned.wallet_id))
            } else {
                Ok(None)
            }
        },
    )?;

    if let Some(wallet_id) = assigned {
        info!(wallet_id = %wallet_id, "wallet assigned for summary");
        ctx.set_active_wallet(Some(wallet_id));
    }

    display::print_wallet_summary(&mut accounts, &keys);
    Ok(json!({ "accounts": accounts, "keys": keys }))
}

async fn fetch_account_rows(wallet: &EmbeddedWallet) -> AdapterResult<Vec<AccountRow>> {
    let account_ids = wallet.account_ids().await?;
    let per_account = try_join_all(account_ids.into_iter().map(|account| async move {
        let assets = wallet.asset_ids(account).await?;
        try_join_all(assets.into_iter().map(|asset| async move {
            let balance = wallet.balance(account, &asset).await?;
            Ok::<_, AdapterError>(AccountRow {
                account_id: account,
                asset_id: asset,
                balance: balance.total,
                available: balance.available,
            })
        }))
        .await
    }))
    .await?;
    Ok(per_account.into_iter().flatten().collect())
}

async fn fetch_key_rows(wallet: &EmbeddedWallet, core: &CoreDevice) -> AdapterResult<Vec<KeyRow>> {
    let (status, backup) = tokio::try_join!(core.keys_status(), wallet.latest_backup())?;
    Ok(status
        .into_values()
        .map(|key| {
            let algorithm = key.algorithm.replacen("CMP_", "", 1);
            KeyRow {
                backup: backup.keys.iter().any(|k| k.algorithm == algorithm),
                key_id: key.key_id,
                status: key.key_status,
                algorithm,
            }
        })
        .collect())
}

pub async fn init_embedded_wallet(
    ctx: &mut ConsoleContext,
    prompter: &mut dyn Prompter,
) -> Result<Value> {
    if ctx.session.wallet_ready {
        display::info_line("EW already initialized");
        return Ok(json!({ "initialized": true }));
    }

    let sdk_logs = if ctx.auto {
        ctx.config.bridge.sdk_logs
    } else {
        prompter.confirm("Enable SDK logs?", ctx.config.bridge.sdk_logs)?
    };
    let response = ctx
        .sdk()
        .initialize(&ctx.config.env, &ctx.config.auth.client_id, sdk_logs)
        .await?;
    ctx.mark_wallet_ready();

    let with_device = ctx.auto || prompter.confirm("Initialize device?", true)?;
    let device = if with_device {
        Some(init_core(ctx, prompter).await?)
    } else {
        None
    };

    Ok(json!({ "initialized": true, "sdk": response, "device": device }))
}

pub async fn init_core(ctx: &mut ConsoleContext, prompter: &mut dyn Prompter) -> Result<Value> {
    ctx.wallet()?;

    let latest = ctx.devices.get_device_id().await?;
    let chosen = if ctx.auto {
        latest.clone()
    } else {
        let answer = prompter.input(
            "Enter device ID (leave blank to generate a random one)",
            latest.as_deref(),
        )?;
        Some(answer.trim().to_string()).filter(|id| !id.is_empty())
    };
    let device_id = chosen.unwrap_or_else(|| Uuid::new_v4().to_string());

    if latest.as_deref() != Some(device_id.as_str()) {
        ctx.devices.set_device_id(&device_id).await?;
    }

    if ctx.session.device_ready && ctx.session.active_device_id.as_deref() == Some(device_id.as_str()) {
        display::info_line("Core already initialized");
        return Ok(json!({ "deviceId": device_id }));
    }

    let response = ctx.wallet()?.initialize_core(&device_id).await?;
    ctx.attach_device(&device_id);
    Ok(json!({ "deviceId": device_id, "core": response }))
}

pub async fn refresh_idp_token(ctx: &mut ConsoleContext) -> Result<Value> {
    let token = ctx.tokens.get_token(true).await?;
    let record = ctx.tokens.snapshot();
    Ok(json!({
        "token": token,
        "issuedAt": record.as_ref().map(|r| r.issued_at().to_rfc3339()),
        "expiresAt": record.as_ref().map(|r| r.expires_at().to_rfc3339()),
    }))
}

fn ask_uid(ctx: &ConsoleContext, prompter: &mut dyn Prompter) -> Result<String> {
    let subject = ctx.config.auth.subject_uid.as_str();
    let default = Some(subject).filter(|uid| !uid.is_empty());
    let uid = prompter.input("Enter the user ID:", default)?;
    let uid = uid.trim();
    if uid.is_empty() {
        return Err(ConsoleError::InvalidInput("user ID is required".to_string()));
    }
    Ok(uid.to_string())
}

pub async fn set_custom_principal_claim(
    ctx: &mut ConsoleContext,
    prompter: &mut dyn Prompter,
) -> Result<Value> {
    let uid = ask_uid(ctx, prompter)?;
    let sources: Vec<String> = CLAIM_SOURCES.iter().map(|s| s.to_string()).collect();

    let claim_value = match prompter.select("Select the claim value:", &sources, 0)? {
        0 => Uuid::new_v4().to_string(),
        1 => {
            let aliases = ctx.aliases.list_aliases().await?;
            if aliases.is_empty() {
                display::notice("No saved wallet IDs found.");
                return Ok(Value::Null);
            }
            let items: Vec<String> = aliases
                .iter()
                .map(|alias| format!("{}: {}", alias.name, alias.id))
                .collect();
            let index = prompter.select("Select the wallet ID:", &items, 0)?;
            aliases
                .get(index)
                .map(|alias| alias.id.clone())
                .ok_or_else(|| ConsoleError::InvalidInput(format!("no saved wallet at index {index}")))?
        }
        2 => {
            let value = input::ask_required(prompter, "the claim value:")?;
            offer_wallet_alias(ctx, prompter, &value).await?;
            value
        }
        _ => CLEAR_CLAIMS.to_string(),
    };

    let claims = ctx
        .claims
        .set_custom_claim(&uid, WALLET_CLAIM_KEY, &claim_value)
        .await?;
    ctx.tokens.get_token(true).await?;

    let cleared = claim_value == CLEAR_CLAIMS;
    ctx.set_active_wallet(if cleared { None } else { Some(claim_value) });

    if ctx.session.device_ready {
        if let Ok(core) = ctx.core() {
            if let Err(err) = core.dispose().await {
                warn!(error = %err, "dispose after claim change failed");
            }
        }
        ctx.detach_device();
    }

    Ok(json!({ "uid": uid, "claims": claims }))
}

pub async fn get_custom_principal_claim(
    ctx: &mut ConsoleContext,
    prompter: &mut dyn Prompter,
) -> Result<Value> {
    let uid = ask_uid(ctx, prompter)?;
    Ok(ctx.claims.get_custom_claims(&uid).await?)
}
