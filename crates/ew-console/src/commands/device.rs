/*
[INPUT]:  Console context and prompter, device tier open
[OUTPUT]: Raw device (core) responses
[POS]:    Command layer - device tier
[UPDATE]: When device commands change
*/

use serde_json::Value;
use tracing::info;

use super::input;
use crate::display;
use crate::error::{ConsoleError, Result};
use crate::prompt::Prompter;
use crate::session::ConsoleContext;

/// Algorithms offered when generating keys; the first is preselected
pub const MPC_ALGORITHMS: [&str; 2] = ["MPC_ECDSA_SECP256K1", "MPC_EDDSA_ED25519"];

/// `MPC_ECDSA_SECP256K1` -> `MPC_CMP_ECDSA_SECP256K1`
pub fn to_cmp_algorithm(algorithm: &str) -> String {
    algorithm.replacen("MPC_", "MPC_CMP_", 1)
}

// ### Join wallet

pub async fn approve_join_wallet_request(
    ctx: &mut ConsoleContext,
    prompter: &mut dyn Prompter,
) -> Result<Value> {
    let request_id = input::ask_required(prompter, "request ID")?;
    Ok(ctx.core()?.approve_join_wallet_request(&request_id).await?)
}

pub async fn request_join_existing_wallet(ctx: &mut ConsoleContext) -> Result<Value> {
    let response = ctx.core()?.request_join_existing_wallet().await?;
    if let Some(request_id) = response.get("requestId").and_then(Value::as_str) {
        display::info_line(&format!("Request ID: {request_id}"));
    }
    Ok(response)
}

pub async fn stop_join_wallet(ctx: &mut ConsoleContext) -> Result<Value> {
    Ok(ctx.core()?.stop_join_wallet().await?)
}

pub async fn takeover(ctx: &mut ConsoleContext) -> Result<Value> {
    Ok(ctx.core()?.takeover().await?)
}

// ### Key management

fn ask_passphrase(ctx: &ConsoleContext, prompter: &mut dyn Prompter) -> Result<String> {
    let passphrase = input::ask(prompter, "passphrase", ctx.config.defaults.passphrase.as_deref())?;
    if passphrase.is_empty() {
        return Err(ConsoleError::InvalidInput("passphrase is required".to_string()));
    }
    Ok(passphrase)
}

pub async fn backup_keys(ctx: &mut ConsoleContext, prompter: &mut dyn Prompter) -> Result<Value> {
    let passphrase = ask_passphrase(ctx, prompter)?;
    let passphrase_id = input::ask(
        prompter,
        "passphrase ID (uuid)",
        ctx.config.defaults.passphrase_id.as_deref(),
    )?;
    Ok(ctx
        .core()?
        .backup_keys(&passphrase, passphrase_id.trim())
        .await?)
}

pub async fn recover_keys(ctx: &mut ConsoleContext, prompter: &mut dyn Prompter) -> Result<Value> {
    let passphrase = ask_passphrase(ctx, prompter)?;
    Ok(ctx.core()?.recover_keys(&passphrase).await?)
}

pub async fn generate_mpc_keys(
    ctx: &mut ConsoleContext,
    prompter: &mut dyn Prompter,
) -> Result<Value> {
    let items: Vec<String> = MPC_ALGORITHMS.iter().map(|a| a.to_string()).collect();
    let defaults = [true, false];
    let picks = prompter.multi_select("Select algorithms", &items, &defaults)?;

    let mut algorithms: Vec<String> = picks
        .into_iter()
        .filter_map(|index| items.get(index))
        .map(|algorithm| to_cmp_algorithm(algorithm))
        .collect();
    algorithms.dedup();
    if algorithms.is_empty() {
        return Err(ConsoleError::InvalidInput(
            "select at least one algorithm".to_string(),
        ));
    }

    info!(?algorithms, "generating MPC keys");
    Ok(ctx.core()?.generate_mpc_keys(&algorithms).await?)
}

pub async fn derive_asset_key(
    ctx: &mut ConsoleContext,
    prompter: &mut dyn Prompter,
) -> Result<Value> {
    let extended_private_key = input::ask_required(prompter, "extended private key")?;
    let coin_type = input::ask_number(prompter, "coin type", None)?;
    let account = input::ask_number(prompter, "account", Some("0"))?;
    let change = input::ask_number(prompter, "change", Some("0"))?;
    let index = input::ask_number(prompter, "index", Some("0"))?;
    Ok(ctx
        .core()?
        .derive_asset_key(&extended_private_key, coin_type, account, change, index)
        .await?)
}

pub async fn get_keys_status(ctx: &mut ConsoleContext) -> Result<Value> {
    Ok(ctx.core()?.get_keys_status().await?)
}

pub async fn stop_mpc_device_setup(ctx: &mut ConsoleContext) -> Result<Value> {
    Ok(ctx.core()?.stop_mpc_device_setup().await?)
}

// ### Transaction management

pub async fn sign_transaction(ctx: &mut ConsoleContext, prompter: &mut dyn Prompter) -> Result<Value> {
    let tx_id = input::ask_required(prompter, "transaction ID")?;
    Ok(ctx.core()?.sign_transaction(&tx_id).await?)
}

pub async fn stop_in_progress_sign_transaction(ctx: &mut ConsoleContext) -> Result<Value> {
    Ok(ctx.core()?.stop_in_progress_sign_transaction().await?)
}

pub async fn get_in_progress_signing_tx_id(ctx: &mut ConsoleContext) -> Result<Value> {
    Ok(ctx.core()?.get_in_progress_signing_tx_id().await?)
}

// ### General

pub async fn clear_all_storage(ctx: &mut ConsoleContext) -> Result<Value> {
    Ok(ctx.core()?.clear_all_storage().await?)
}

pub async fn dispose(ctx: &mut ConsoleContext) -> Result<Value> {
    let response = ctx.core()?.dispose().await?;
    ctx.detach_device();
    Ok(response)
}

pub async fn get_physical_device_id(ctx: &mut ConsoleContext) -> Result<Value> {
    Ok(ctx.core()?.get_physical_device_id().await?)
}
