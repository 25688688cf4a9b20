/*
[INPUT]:  Prompter plus the current session
[OUTPUT]: Validated command arguments (account/asset, destination, wallet names)
[POS]:    Command layer - shared prompt sequences
[UPDATE]: When several commands need the same prompt sequence
*/

use ew_console_adapter::{Destination, OneTimeAddress};
use tracing::debug;

use crate::display;
use crate::error::{ConsoleError, Result};
use crate::prompt::Prompter;
use crate::session::ConsoleContext;
use crate::storage::sanitize_alias_name;

const DEFAULT_ASSET_ID: &str = "XRP_TEST";

/// Free text prompt labelled `Enter {name}`
pub fn ask(prompter: &mut dyn Prompter, name: &str, default: Option<&str>) -> Result<String> {
    prompter.input(&format!("Enter {name}"), default)
}

/// Like [`ask`], but re-prompts until the answer is not blank
pub fn ask_required(prompter: &mut dyn Prompter, name: &str) -> Result<String> {
    loop {
        let value = ask(prompter, name, None)?;
        let value = value.trim();
        if !value.is_empty() {
            return Ok(value.to_string());
        }
        display::notice(&format!("{name} is required."));
    }
}

/// Numeric prompt, re-asked until the answer parses
pub fn ask_number(prompter: &mut dyn Prompter, name: &str, default: Option<&str>) -> Result<u32> {
    loop {
        let raw = ask(prompter, name, default)?;
        match raw.trim().parse::<u32>() {
            Ok(value) => return Ok(value),
            Err(_) => display::notice(&format!("'{}' is not a valid {name}.", raw.trim())),
        }
    }
}

pub fn account_id(prompter: &mut dyn Prompter) -> Result<u32> {
    ask_number(prompter, "account ID", Some("0"))
}

pub fn asset_id(prompter: &mut dyn Prompter) -> Result<String> {
    ask(prompter, "asset ID", Some(DEFAULT_ASSET_ID))
}

/// Account id, then an asset picked from that account's assets
///
/// Falls back to free input when the assets cannot be listed.
pub async fn account_and_asset(
    ctx: &ConsoleContext,
    prompter: &mut dyn Prompter,
) -> Result<(u32, String)> {
    let account = account_id(prompter)?;
    let assets = match ctx.wallet()?.asset_ids(account).await {
        Ok(assets) if !assets.is_empty() => Some(assets),
        Ok(_) => None,
        Err(err) => {
            debug!(account, error = %err, "asset listing failed, falling back to free input");
            None
        }
    };

    let asset = match assets {
        Some(assets) => {
            let index = prompter.select("Enter assetId", &assets, 0)?;
            assets
                .get(index)
                .cloned()
                .ok_or_else(|| ConsoleError::InvalidInput(format!("no asset at index {index}")))?
        }
        None => asset_id(prompter)?,
    };
    Ok((account, asset))
}

const DESTINATION_TYPES: [&str; 3] = ["VAULT_ACCOUNT", "ONE_TIME_ADDRESS", "END_USER_WALLET"];

/// Transfer destination, by type
pub fn destination(ctx: &ConsoleContext, prompter: &mut dyn Prompter) -> Result<Destination> {
    let types: Vec<String> = DESTINATION_TYPES.iter().map(|t| t.to_string()).collect();
    let destination = match prompter.select("Select destination type", &types, 0)? {
        1 => Destination::OneTimeAddress {
            one_time_address: OneTimeAddress {
                address: ask_required(prompter, "Destination Address")?,
            },
        },
        2 => Destination::EndUserWallet {
            wallet_id: ask(
                prompter,
                "Destination Wallet ID",
                ctx.session.active_wallet_id.as_deref(),
            )?,
            id: ask_number(prompter, "Destination Account ID", Some("0"))?.to_string(),
        },
        _ => Destination::VaultAccount {
            id: ask(prompter, "Vault Account ID", Some("0"))?,
        },
    };
    Ok(destination)
}

/// Offer to save `wallet_id` under a name, unless it already has one
///
/// Loops on the name until it is non-empty and unused. Returns the saved name.
pub async fn offer_wallet_alias(
    ctx: &ConsoleContext,
    prompter: &mut dyn Prompter,
    wallet_id: &str,
) -> Result<Option<String>> {
    if wallet_id.trim().is_empty() || ctx.aliases.is_aliased(wallet_id).await? {
        return Ok(None);
    }
    if !prompter.confirm("Save this wallet ID?", true)? {
        return Ok(None);
    }

    loop {
        let raw = prompter.input("Enter the wallet name:", None)?;
        let name = sanitize_alias_name(&raw);
        match ctx.aliases.add_alias(&name, wallet_id).await {
            Ok(alias) => return Ok(Some(alias.name)),
            Err(ConsoleError::AliasExists(_)) => {
                display::notice("Wallet name already exists. Please enter a different name.");
            }
            Err(ConsoleError::InvalidInput(_)) => {
                display::notice("Wallet name cannot be empty.");
            }
            Err(err) => return Err(err),
        }
    }
}
