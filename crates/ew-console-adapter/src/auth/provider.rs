/*
[INPUT]:  Subject credentials held by an identity provider implementation
[OUTPUT]: Freshly issued bearer ID tokens
[POS]:    Auth layer - identity provider abstraction
[UPDATE]: When adding new identity providers or changing the exchange contract
*/

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::http::{AdapterError, Result};

/// Trait for exchanging configured credentials for a bearer ID token
///
/// Implementations return the raw JWT; the token cache decodes its
/// `iat`/`exp` claims. Failures should surface as `AdapterError::AuthExchange`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn exchange(&self) -> Result<String>;
}

/// Scripted identity provider for testing
#[derive(Debug, Default)]
pub struct MockIdentityProvider {
    responses: Mutex<VecDeque<std::result::Result<String, String>>>,
    calls: AtomicUsize,
    delay: Option<Duration>,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every exchange, to hold a refresh in flight
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a successful exchange
    pub fn push_token(&self, token: impl Into<String>) {
        self.lock().push_back(Ok(token.into()));
    }

    /// Queue a rejected exchange
    pub fn push_failure(&self, message: impl Into<String>) {
        self.lock().push_back(Err(message.into()));
    }

    /// Number of exchanges performed so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<std::result::Result<String, String>>> {
        self.responses.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn exchange(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.lock().pop_front() {
            Some(Ok(token)) => Ok(token),
            Some(Err(message)) => Err(AdapterError::auth_exchange(message)),
            None => Err(AdapterError::auth_exchange("no scripted token left")),
        }
    }
}

/// Build an unsigned JWT carrying `iat`/`exp`, for tests and fixtures
pub fn unsigned_jwt(subject: &str, issued_at: i64, expires_at: i64) -> String {
    let header = serde_json::json!({"alg": "none", "typ": "JWT"});
    let payload = serde_json::json!({
        "sub": subject,
        "iat": issued_at,
        "exp": expires_at,
    });
    let header_b64 = URL_SAFE_NO_PAD.encode(header.to_string());
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header_b64}.{payload_b64}.unsigned")
}
