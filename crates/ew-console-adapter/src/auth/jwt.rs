/*
[INPUT]:  Bearer ID tokens (JWT) issued by the identity provider
[OUTPUT]: Token records with issued-at/expiry timestamps and freshness checks
[POS]:    Auth layer - token lifecycle data
[UPDATE]: When changing claim decoding or the early-refresh margin
*/

use base64::{
    Engine as _,
    engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD},
};
use chrono::{DateTime, Duration, Utc};

use crate::http::{AdapterError, Result};

/// Refresh once fewer than 1/EARLY_REFRESH_DIVISOR of the lifespan remains.
const EARLY_REFRESH_DIVISOR: i64 = 10;

/// Cached bearer credential
#[derive(Clone, PartialEq, Eq)]
pub struct TokenRecord {
    token: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Build a record, rejecting `expires_at <= issued_at`
    pub fn new(token: String, issued_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Result<Self> {
        if expires_at <= issued_at {
            return Err(AdapterError::auth_exchange(format!(
                "token expires at {expires_at} which is not after its issue time {issued_at}"
            )));
        }
        Ok(Self {
            token,
            issued_at,
            expires_at,
        })
    }

    /// Build a record from a JWT by decoding its `iat`/`exp` claims
    pub fn from_jwt(token: String) -> Result<Self> {
        let (issued_at, expires_at) = decode_token_times(&token)?;
        Self::new(token, issued_at, expires_at)
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn lifespan(&self) -> Duration {
        self.expires_at - self.issued_at
    }

    pub fn time_remaining(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at - now
    }

    /// True once fewer than 10% of the token's lifespan remains (or it has expired)
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        let remaining = self.time_remaining(now).num_milliseconds();
        let lifespan = self.lifespan().num_milliseconds();
        remaining.saturating_mul(EARLY_REFRESH_DIVISOR) < lifespan
    }
}

// The token itself never reaches logs.
impl std::fmt::Debug for TokenRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRecord")
            .field("token", &"<redacted>")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Decode the `iat` and `exp` claims of a JWT without verifying its signature
pub fn decode_token_times(jwt: &str) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let payload = decode_payload(jwt)?;
    let issued_at = numeric_claim(&payload, "iat")?;
    let expires_at = numeric_claim(&payload, "exp")?;
    Ok((issued_at, expires_at))
}

fn decode_payload(jwt: &str) -> Result<serde_json::Value> {
    let payload_b64 = jwt
        .trim()
        .split('.')
        .nth(1)
        .ok_or_else(|| AdapterError::auth_exchange("ID token is not a valid JWT"))?;

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .or_else(|_| URL_SAFE.decode(payload_b64))
        .map_err(|e| AdapterError::auth_exchange(format!("Invalid ID token payload base64: {e}")))?;

    serde_json::from_slice(&payload_bytes)
        .map_err(|e| AdapterError::auth_exchange(format!("Invalid ID token payload JSON: {e}")))
}

fn numeric_claim(payload: &serde_json::Value, claim: &str) -> Result<DateTime<Utc>> {
    let value = payload.get(claim).ok_or_else(|| {
        AdapterError::auth_exchange(format!("ID token missing '{claim}' claim"))
    })?;
    let seconds = value
        .as_i64()
        .or_else(|| value.as_f64().map(|secs| secs as i64))
        .ok_or_else(|| {
            AdapterError::auth_exchange(format!("ID token claim '{claim}' is not numeric"))
        })?;
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
        AdapterError::auth_exchange(format!("ID token claim '{claim}' is out of range"))
    })
}
