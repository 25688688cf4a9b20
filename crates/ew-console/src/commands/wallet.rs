/*
[INPUT]:  Console context and prompter, wallet tier open
[OUTPUT]: Raw embedded wallet responses (plus a projected latest-transactions list)
[POS]:    Command layer - embedded wallet tier
[UPDATE]: When embedded wallet commands change
*/

use chrono::{DateTime, Local, Utc};
use ew_console_adapter::{TransactionFilter, TransactionRequest};
use serde_json::{Value, json};
use tracing::info;

use super::input::{self, account_and_asset};
use crate::display;
use crate::error::{ConsoleError, Result};
use crate::prompt::Prompter;
use crate::session::ConsoleContext;

const LATEST_LIMIT: u32 = 2;

// ### Wallet management

pub async fn assign_wallet(ctx: &mut ConsoleContext) -> Result<Value> {
    let (assigned, raw) = ctx.wallet()?.assign_wallet().await?;
    info!(wallet_id = %assigned.wallet_id, "wallet assigned");
    ctx.set_active_wallet(Some(assigned.wallet_id));
    Ok(raw)
}

pub async fn create_account(ctx: &mut ConsoleContext) -> Result<Value> {
    Ok(ctx.wallet()?.create_account().await?)
}

pub async fn get_accounts(ctx: &mut ConsoleContext) -> Result<Value> {
    Ok(ctx.wallet()?.get_accounts().await?)
}

pub async fn add_asset(ctx: &mut ConsoleContext, prompter: &mut dyn Prompter) -> Result<Value> {
    let account = input::account_id(prompter)?;
    let asset = input::asset_id(prompter)?;
    Ok(ctx.wallet()?.add_asset(account, &asset).await?)
}

pub async fn get_asset(ctx: &mut ConsoleContext, prompter: &mut dyn Prompter) -> Result<Value> {
    let (account, asset) = account_and_asset(ctx, prompter).await?;
    Ok(ctx.wallet()?.get_asset(account, &asset).await?)
}

pub async fn get_assets(ctx: &mut ConsoleContext, prompter: &mut dyn Prompter) -> Result<Value> {
    let account = input::account_id(prompter)?;
    Ok(ctx.wallet()?.get_assets(account).await?)
}

pub async fn get_balance(ctx: &mut ConsoleContext, prompter: &mut dyn Prompter) -> Result<Value> {
    let (account, asset) = account_and_asset(ctx, prompter).await?;
    Ok(ctx.wallet()?.get_balance(account, &asset).await?)
}

pub async fn get_supported_assets(ctx: &mut ConsoleContext) -> Result<Value> {
    Ok(ctx.wallet()?.get_supported_assets().await?)
}

pub async fn refresh_balance(ctx: &mut ConsoleContext, prompter: &mut dyn Prompter) -> Result<Value> {
    let (account, asset) = account_and_asset(ctx, prompter).await?;
    Ok(ctx.wallet()?.refresh_balance(account, &asset).await?)
}

pub async fn get_addresses(ctx: &mut ConsoleContext, prompter: &mut dyn Prompter) -> Result<Value> {
    let (account, asset) = account_and_asset(ctx, prompter).await?;
    Ok(ctx.wallet()?.get_addresses(account, &asset).await?)
}

pub async fn get_device(ctx: &mut ConsoleContext, prompter: &mut dyn Prompter) -> Result<Value> {
    let stored = ctx.devices.get_device_id().await?;
    let default = ctx.session.active_device_id.clone().or(stored);
    let device_id = input::ask(prompter, "device ID", default.as_deref())?;
    Ok(ctx.wallet()?.get_device(device_id.trim()).await?)
}

pub async fn get_latest_backup(ctx: &mut ConsoleContext) -> Result<Value> {
    Ok(ctx.wallet()?.get_latest_backup().await?)
}

// ### NFTs

pub async fn get_nft(ctx: &mut ConsoleContext, prompter: &mut dyn Prompter) -> Result<Value> {
    let id = input::ask_required(prompter, "NFT ID")?;
    Ok(ctx.wallet()?.get_nft(&id).await?)
}

pub async fn get_owned_nfts(ctx: &mut ConsoleContext) -> Result<Value> {
    Ok(ctx.wallet()?.get_owned_nfts().await?)
}

pub async fn list_owned_assets(ctx: &mut ConsoleContext) -> Result<Value> {
    Ok(ctx.wallet()?.list_owned_assets().await?)
}

pub async fn list_owned_collections(ctx: &mut ConsoleContext) -> Result<Value> {
    Ok(ctx.wallet()?.list_owned_collections().await?)
}

// ### Web3 connections

pub async fn create_web3_connection(
    ctx: &mut ConsoleContext,
    prompter: &mut dyn Prompter,
) -> Result<Value> {
    let account = input::account_id(prompter)?;
    let uri = input::ask_required(prompter, "uri")?;
    Ok(ctx.wallet()?.create_web3_connection(account, &uri).await?)
}

pub async fn get_web3_connections(ctx: &mut ConsoleContext) -> Result<Value> {
    Ok(ctx.wallet()?.get_web3_connections().await?)
}

pub async fn remove_web3_connection(
    ctx: &mut ConsoleContext,
    prompter: &mut dyn Prompter,
) -> Result<Value> {
    let connection_id = input::ask_required(prompter, "connectionId")?;
    Ok(ctx.wallet()?.remove_web3_connection(&connection_id).await?)
}

pub async fn submit_web3_connection(
    ctx: &mut ConsoleContext,
    prompter: &mut dyn Prompter,
) -> Result<Value> {
    let connection_id = input::ask_required(prompter, "connectionId")?;
    let approve = prompter.confirm("Approve connection?", true)?;
    Ok(ctx
        .wallet()?
        .submit_web3_connection(&connection_id, approve)
        .await?)
}

// ### Transactions

async fn transaction_request(
    ctx: &ConsoleContext,
    prompter: &mut dyn Prompter,
) -> Result<TransactionRequest> {
    let (account, asset) = account_and_asset(ctx, prompter).await?;
    let amount = input::ask_required(prompter, "amount")?;
    let destination = input::destination(ctx, prompter)?;
    Ok(TransactionRequest::new(account, asset, amount, destination))
}

pub async fn create_transaction(
    ctx: &mut ConsoleContext,
    prompter: &mut dyn Prompter,
) -> Result<Value> {
    let request = transaction_request(ctx, prompter).await?;
    Ok(ctx.wallet()?.create_transaction(&request).await?)
}

pub async fn create_and_sign_transaction(
    ctx: &mut ConsoleContext,
    prompter: &mut dyn Prompter,
) -> Result<Value> {
    ctx.core()?;
    let request = transaction_request(ctx, prompter).await?;
    let created = ctx.wallet()?.create_transaction(&request).await?;
    let tx_id = created
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| ConsoleError::InvalidInput("created transaction has no id".to_string()))?
        .to_string();
    info!(tx_id = %tx_id, "transaction created, signing");
    let signed = ctx.core()?.sign_transaction(&tx_id).await?;
    Ok(json!({ "transaction": created, "signature": signed }))
}

fn transaction_template() -> String {
    let template = json!({
        "assetId": "BTC",
        "source": { "id": "0" },
        "destination": { "type": "VAULT_ACCOUNT", "id": "0" },
        "amount": "1",
    });
    serde_json::to_string_pretty(&template).unwrap_or_else(|_| template.to_string())
}

pub async fn create_transaction_from_json(
    ctx: &mut ConsoleContext,
    prompter: &mut dyn Prompter,
) -> Result<Value> {
    let mut draft = transaction_template();
    let request = loop {
        let text = prompter.edit("Enter transaction JSON", &draft)?;
        match serde_json::from_str::<Value>(&text) {
            Ok(request) => break request,
            Err(_) => {
                display::notice("Invalid JSON. Please try again");
                draft = text;
            }
        }
    };
    Ok(ctx.wallet()?.create_transaction_raw(request).await?)
}

pub async fn get_latest_transactions(ctx: &mut ConsoleContext) -> Result<Value> {
    let wallet = ctx.wallet()?;
    let incoming_filter = TransactionFilter::incoming().latest(LATEST_LIMIT);
    let outgoing_filter = TransactionFilter::outgoing().latest(LATEST_LIMIT);
    let (incoming, outgoing) = tokio::try_join!(
        wallet.get_transactions(&incoming_filter),
        wallet.get_transactions(&outgoing_filter),
    )?;
    Ok(Value::Array(merge_latest(incoming, outgoing)))
}

fn page_data(page: Value) -> Vec<Value> {
    match page {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        Value::Array(items) => items,
        _ => Vec::new(),
    }
}

fn last_updated(tx: &Value) -> Option<i64> {
    let field = tx.get("lastUpdated")?;
    field.as_i64().or_else(|| field.as_f64().map(|ms| ms as i64))
}

/// Newest first, projected to the columns worth reading at a glance
fn merge_latest(incoming: Value, outgoing: Value) -> Vec<Value> {
    let mut txs: Vec<Value> = page_data(incoming)
        .into_iter()
        .chain(page_data(outgoing))
        .collect();
    txs.sort_by(|a, b| last_updated(b).cmp(&last_updated(a)));
    txs.iter().map(project_transaction).collect()
}

fn project_transaction(tx: &Value) -> Value {
    let field = |key: &str| tx.get(key).cloned().unwrap_or(Value::Null);
    let amount = match tx.get("amount") {
        Some(amount) if !amount.is_null() => amount.clone(),
        _ => field("amountInfo"),
    };
    let last_updated = last_updated(tx)
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string());

    json!({
        "id": field("id"),
        "operation": field("operation"),
        "asset": field("assetId"),
        "amount": amount,
        "status": field("status"),
        "source": field("source"),
        "destination": field("destination"),
        "lastUpdated": last_updated,
    })
}

pub async fn cancel_transaction(
    ctx: &mut ConsoleContext,
    prompter: &mut dyn Prompter,
) -> Result<Value> {
    let tx_id = input::ask_required(prompter, "txId")?;
    Ok(ctx.wallet()?.cancel_transaction(&tx_id).await?)
}

pub async fn estimate_transaction_fee(
    ctx: &mut ConsoleContext,
    prompter: &mut dyn Prompter,
) -> Result<Value> {
    let request = transaction_request(ctx, prompter).await?;
    Ok(ctx.wallet()?.estimate_transaction_fee(&request).await?)
}

pub async fn get_transaction(ctx: &mut ConsoleContext, prompter: &mut dyn Prompter) -> Result<Value> {
    let tx_id = input::ask_required(prompter, "txId")?;
    Ok(ctx.wallet()?.get_transaction(&tx_id).await?)
}

pub async fn get_transactions(
    ctx: &mut ConsoleContext,
    prompter: &mut dyn Prompter,
) -> Result<Value> {
    let directions = vec!["incoming".to_string(), "outgoing".to_string()];
    let filter = match prompter.select("Select direction", &directions, 0)? {
        0 => TransactionFilter::incoming(),
        _ => TransactionFilter::outgoing(),
    };
    Ok(ctx.wallet()?.get_transactions(&filter).await?)
}
