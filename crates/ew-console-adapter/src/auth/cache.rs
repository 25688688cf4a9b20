/*
[INPUT]:  Identity provider exchanges and the current time
[OUTPUT]: A bearer token that is never expired or within 10% of expiry
[POS]:    Auth layer - token freshness cache with single-flight refresh
[UPDATE]: When changing the refresh policy or the coalescing rules
*/

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{Clock, IdentityProvider, SystemClock, TokenRecord};
use crate::http::Result;

/// Process-wide bearer token cache
///
/// Cloning shares the same cached record and refresh gate.
#[derive(Clone)]
pub struct TokenCache {
    record: Arc<RwLock<Option<TokenRecord>>>,
    // Holds the start id of the last successful refresh.
    refresh_gate: Arc<Mutex<u64>>,
    refresh_started: Arc<AtomicU64>,
    provider: Arc<dyn IdentityProvider>,
    clock: Arc<dyn Clock>,
}

impl TokenCache {
    /// Create an empty cache backed by the system clock
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self::with_clock(provider, Arc::new(SystemClock))
    }

    /// Create an empty cache with an explicit time source
    pub fn with_clock(provider: Arc<dyn IdentityProvider>, clock: Arc<dyn Clock>) -> Self {
        Self {
            record: Arc::new(RwLock::new(None)),
            refresh_gate: Arc::new(Mutex::new(0)),
            refresh_started: Arc::new(AtomicU64::new(0)),
            provider,
            clock,
        }
    }

    /// Return a usable token, exchanging for a new one when required
    ///
    /// A refresh happens when the cache is empty, when fewer than 10% of
    /// the cached token's lifespan remains, or when `force_refresh` is set.
    /// Concurrent callers share one in-flight refresh. A failed exchange
    /// leaves the previously cached record untouched.
    pub async fn get_token(&self, force_refresh: bool) -> Result<String> {
        if !force_refresh {
            if let Some(token) = self.fresh_token() {
                return Ok(token);
            }
        }

        let started_before_wait = self.refresh_started.load(Ordering::SeqCst);
        let mut last_success = self.refresh_gate.lock().await;

        if force_refresh {
            // A refresh that began after this call was made already satisfies it.
            if *last_success > started_before_wait {
                if let Some(record) = self.snapshot() {
                    debug!("forced refresh coalesced into a newer completed refresh");
                    return Ok(record.token().to_string());
                }
            }
        } else if let Some(token) = self.fresh_token() {
            debug!("token refreshed by a concurrent caller");
            return Ok(token);
        }

        let refresh_id = self.refresh_started.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(refresh_id, force_refresh, "exchanging credentials for a new token");

        let record = match self.exchange().await {
            Ok(record) => record,
            Err(err) => {
                warn!(error = %err, "token refresh failed; keeping previous token");
                return Err(err);
            }
        };

        info!(
            issued_at = %record.issued_at(),
            expires_at = %record.expires_at(),
            "bearer token refreshed"
        );
        let token = record.token().to_string();
        *self.record.write().unwrap_or_else(PoisonError::into_inner) = Some(record);
        *last_success = refresh_id;

        Ok(token)
    }

    /// Current record, if any, regardless of freshness
    pub fn snapshot(&self) -> Option<TokenRecord> {
        self.record
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop the cached record so the next call exchanges
    pub fn clear(&self) {
        *self.record.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn fresh_token(&self) -> Option<String> {
        let now = self.clock.now();
        let guard = self.record.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .filter(|record| !record.needs_refresh(now))
            .map(|record| record.token().to_string())
    }

    async fn exchange(&self) -> Result<TokenRecord> {
        let token = self.provider.exchange().await?;
        TokenRecord::from_jwt(token)
    }
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("record", &self.snapshot())
            .field("clock", &self.clock)
            .finish()
    }
}
