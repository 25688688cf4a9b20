/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for ew-console-adapter tests

use std::sync::Arc;

use chrono::Utc;
use ew_console_adapter::auth::unsigned_jwt;
use ew_console_adapter::{
    IdentityToolkitConfig, IdentityToolkitProvider, MockIdentityProvider, ServiceAccountKey,
    TokenCache,
};
use wiremock::MockServer;

pub const SERVICE_ACCOUNT_JSON: &str = include_str!("../fixtures/service-account.json");
#[allow(dead_code)]
pub const PROJECT_ID: &str = "ew-console-test";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// ID token valid for an hour from now
pub fn fresh_id_token(subject: &str) -> String {
    let now = Utc::now().timestamp();
    unsigned_jwt(subject, now, now + 3600)
}

/// Identity toolkit provider whose endpoints all point at `server`
#[allow(dead_code)]
pub fn provider_for(server: &MockServer, uid: &str) -> IdentityToolkitProvider {
    let mut key = ServiceAccountKey::from_json(SERVICE_ACCOUNT_JSON).expect("fixture key");
    key.token_uri = Some(format!("{}/token", server.uri()));

    let mut config = IdentityToolkitConfig::new("test-api-key", uid);
    config.base_url = server.uri();
    IdentityToolkitProvider::new(key, config).expect("provider")
}

/// Token cache that hands out one fresh scripted token
#[allow(dead_code)]
pub fn scripted_token_cache(subject: &str) -> (TokenCache, Arc<MockIdentityProvider>) {
    let provider = Arc::new(MockIdentityProvider::new());
    provider.push_token(fresh_id_token(subject));
    (TokenCache::new(provider.clone()), provider)
}
