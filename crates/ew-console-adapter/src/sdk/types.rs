/*
[INPUT]:  SDK bridge JSON payloads
[OUTPUT]: The few typed views the console needs (pages, balances, keys, requests)
[POS]:    SDK layer - request/response types
[UPDATE]: When the console starts relying on new SDK fields
*/

use std::collections::BTreeMap;

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::{AdapterError, Result};

/// Decode a typed view out of a raw SDK response
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| AdapterError::InvalidResponse(format!("unexpected SDK payload: {e}")))
}

/// Paginated SDK response
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRef {
    pub account_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedWallet {
    pub wallet_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Balance {
    #[serde(default, deserialize_with = "string_or_number")]
    pub total: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub available: String,
}

impl Balance {
    /// Numeric total used for ordering; unparsable totals sort last
    pub fn total_value(&self) -> f64 {
        self.total.parse().unwrap_or(f64::MIN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackupKey {
    pub algorithm: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LatestBackup {
    #[serde(default)]
    pub keys: Vec<BackupKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyStatus {
    pub key_id: String,
    pub key_status: String,
    pub algorithm: String,
}

/// Keys status keyed by algorithm
pub type KeysStatus = BTreeMap<String, KeyStatus>;

/// Filter for transaction listings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incoming: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outgoing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl TransactionFilter {
    pub fn incoming() -> Self {
        Self {
            incoming: Some(true),
            ..Self::default()
        }
    }

    pub fn outgoing() -> Self {
        Self {
            outgoing: Some(true),
            ..Self::default()
        }
    }

    /// Newest first by `lastUpdated`, capped at `limit`
    pub fn latest(mut self, limit: u32) -> Self {
        self.order_by = Some("lastUpdated".to_string());
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OneTimeAddress {
    pub address: String,
}

/// Transfer destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Destination {
    VaultAccount {
        id: String,
    },
    OneTimeAddress {
        #[serde(rename = "oneTimeAddress")]
        one_time_address: OneTimeAddress,
    },
    EndUserWallet {
        #[serde(rename = "walletId")]
        wallet_id: String,
        id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRef {
    pub id: String,
}

/// Transfer request used for creation and fee estimation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub asset_id: String,
    pub source: SourceRef,
    pub destination: Destination,
    pub amount: String,
}

impl TransactionRequest {
    pub fn new(account_id: u32, asset_id: String, amount: String, destination: Destination) -> Self {
        Self {
            asset_id,
            source: SourceRef {
                id: account_id.to_string(),
            },
            destination,
            amount,
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
