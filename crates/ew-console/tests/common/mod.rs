/*
[INPUT]:  Test configuration and mock SDK/identity requirements
[OUTPUT]: Console contexts wired to in-memory mocks and a temp storage dir
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for ew-console tests

use std::sync::Arc;

use chrono::Utc;
use ew_console::{ConsoleConfig, ConsoleContext};
use ew_console_adapter::auth::unsigned_jwt;
use ew_console_adapter::{MockClaimsAdmin, MockIdentityProvider, MockTransport, TokenCache};
use tempfile::TempDir;

pub const SUBJECT_UID: &str = "uid-1";

/// Mocks behind a test context; keeps the storage dir alive
#[allow(dead_code)]
pub struct Mocks {
    pub transport: Arc<MockTransport>,
    pub claims: Arc<MockClaimsAdmin>,
    pub identity: Arc<MockIdentityProvider>,
    pub dir: TempDir,
}

pub fn test_config(dir: &TempDir) -> ConsoleConfig {
    let mut config = ConsoleConfig::default();
    config.env = "sandbox".to_string();
    config.auth.client_id = "client-1".to_string();
    config.auth.subject_uid = SUBJECT_UID.to_string();
    config.storage.dir = dir.path().join("storage");
    config.defaults.passphrase = Some("hunter2".to_string());
    config.defaults.passphrase_id = Some("4f2c7b8e-0000-4000-8000-000000000001".to_string());
    config
}

/// Fresh session, nothing initialized
pub fn context() -> (ConsoleContext, Mocks) {
    let dir = tempfile::tempdir().expect("tempdir");
    let transport = Arc::new(MockTransport::new());
    let claims = Arc::new(MockClaimsAdmin::new());
    let identity = Arc::new(MockIdentityProvider::new());
    let now = Utc::now().timestamp();
    for _ in 0..4 {
        identity.push_token(unsigned_jwt(SUBJECT_UID, now, now + 3600));
    }

    let ctx = ConsoleContext::new(
        test_config(&dir),
        TokenCache::new(identity.clone()),
        claims.clone(),
        transport.clone(),
    );
    (
        ctx,
        Mocks {
            transport,
            claims,
            identity,
            dir,
        },
    )
}

/// Session with the wallet tier open
#[allow(dead_code)]
pub fn wallet_context() -> (ConsoleContext, Mocks) {
    let (mut ctx, mocks) = context();
    ctx.mark_wallet_ready();
    (ctx, mocks)
}

/// Session with both tiers open on `device-1`
#[allow(dead_code)]
pub fn device_context() -> (ConsoleContext, Mocks) {
    let (mut ctx, mocks) = wallet_context();
    ctx.attach_device("device-1");
    (ctx, mocks)
}
