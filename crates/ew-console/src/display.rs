/*
[INPUT]:  Session state, command outcomes and wallet summary rows
[OUTPUT]: Styled terminal output
[POS]:    Presentation layer - session header, result panels, summary tables
[UPDATE]: When changing what the console prints
*/

use console::style;
use serde::Serialize;
use serde_json::Value;

use crate::commands::CommandOutcome;
use crate::session::SessionState;

const PANEL_WIDTH: usize = 80;

/// One balance row of the wallet summary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRow {
    pub account_id: u32,
    pub asset_id: String,
    pub balance: String,
    pub available: String,
}

/// One key row of the wallet summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRow {
    pub key_id: String,
    pub status: String,
    pub backup: bool,
    pub algorithm: String,
}

/// Session header shown above the menu
pub fn session_header(env: &str, session: &SessionState) -> String {
    let line = format!("{}{}", style("==").yellow(), style("==").blue()).repeat(13);
    let wallet = if session.wallet_ready {
        format!(
            "✅\n Wallet ID: {}",
            session.active_wallet_id.as_deref().unwrap_or("___")
        )
    } else {
        "❌".to_string()
    };
    let device = if session.device_ready {
        format!(
            "✅\n Device ID: {}",
            session.active_device_id.as_deref().unwrap_or("___")
        )
    } else {
        "❌".to_string()
    };

    format!(
        "\n{line}\n{}{}\n{}\n{}\n{line}",
        " ".repeat(12),
        style(format!("Session details ({env})")).italic().on_blue(),
        style(format!("Init EW:   {wallet}")).bold().yellow(),
        style(format!("Init Core: {device}")).bold().yellow(),
    )
}

/// Render a command outcome as a success or failure panel
pub fn outcome_panel(outcome: &CommandOutcome) -> String {
    let line = "=".repeat(PANEL_WIDTH);
    let (title, body) = match outcome {
        CommandOutcome::Success(value) => ("Command executed successfully", pretty(value)),
        CommandOutcome::Failure(failure) => (
            "Command failed",
            pretty(&serde_json::json!({
                "name": failure.name,
                "message": failure.message,
            })),
        ),
    };
    let text = format!("\n{title}\n{line}\n{body}\n{line}\n");
    if outcome.is_success() {
        style(text).green().to_string()
    } else {
        style(text).red().to_string()
    }
}

pub fn print_outcome(outcome: &CommandOutcome) {
    println!("{}", outcome_panel(outcome));
}

pub fn notice(message: &str) {
    println!("{}", style(message).yellow());
}

pub fn info_line(message: &str) {
    println!("{}", style(message).cyan());
}

/// Print the account and key tables, accounts sorted by balance descending
pub fn print_wallet_summary(accounts: &mut [AccountRow], keys: &[KeyRow]) {
    sort_by_balance(accounts);

    println!("{}", style("📊 Account Data:").bold().cyan());
    let rows: Vec<Vec<String>> = accounts
        .iter()
        .map(|row| {
            vec![
                row.account_id.to_string(),
                row.asset_id.clone(),
                row.balance.clone(),
                row.available.clone(),
            ]
        })
        .collect();
    println!("{}", table(&["accountId", "assetId", "balance", "available"], &rows));

    println!("{}", style("🔑 Keys State:").bold().cyan());
    let rows: Vec<Vec<String>> = keys
        .iter()
        .map(|row| {
            vec![
                row.key_id.clone(),
                row.status.clone(),
                row.backup.to_string(),
                row.algorithm.clone(),
            ]
        })
        .collect();
    println!("{}", table(&["keyId", "status", "backup", "algorithm"], &rows));
}

pub fn sort_by_balance(accounts: &mut [AccountRow]) {
    accounts.sort_by(|a, b| balance_value(&b.balance).total_cmp(&balance_value(&a.balance)));
}

fn balance_value(balance: &str) -> f64 {
    balance.parse().unwrap_or(f64::MIN)
}

fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: Vec<&str>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths.iter().copied())
            .map(|(cell, width)| format!(" {cell:<width$} "))
            .collect();
        format!("│{}│", padded.join("│"))
    };

    let mut out = vec![render(headers.to_vec())];
    out.push(format!(
        "├{}┤",
        widths
            .iter()
            .map(|w| "─".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("┼")
    ));
    for row in rows {
        out.push(render(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
