/*
[INPUT]:  Mock SDK bridge responses
[OUTPUT]: Test results for authenticated bridge calls and error mapping
[POS]:    Integration tests - SDK bridge transport
[UPDATE]: When the bridge protocol changes
*/

mod common;

use std::sync::Arc;

use common::{scripted_token_cache, setup_mock_server};
use ew_console_adapter::{AdapterError, CoreDevice, EmbeddedWallet, HttpSdkBridge, SdkTransport};
use serde_json::json;
use tokio_test::assert_ok;
use wiremock::matchers::{body_json, header_exists, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_bridge_sends_bearer_token_and_params() {
    let server = setup_mock_server().await;
    let (tokens, _) = scripted_token_cache("uid-1");
    let token = assert_ok!(tokens.get_token(false).await);

    Mock::given(method("POST"))
        .and(path("/v1/ew/getBalance"))
        .and(wiremock::matchers::header(
            "authorization",
            format!("Bearer {token}").as_str(),
        ))
        .and(body_json(json!({"accountId": 0, "assetId": "BTC_TEST"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"total": "0.5", "available": "0.5"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let bridge: Arc<dyn SdkTransport> = Arc::new(assert_ok!(HttpSdkBridge::new(&server.uri(), tokens)));
    let wallet = EmbeddedWallet::new(bridge);
    let balance = assert_ok!(wallet.balance(0, "BTC_TEST").await);
    assert_eq!(balance.total, "0.5");
}

#[tokio::test]
async fn test_bridge_reuses_cached_token_across_calls() {
    let server = setup_mock_server().await;
    let (tokens, provider) = scripted_token_cache("uid-1");

    Mock::given(method("POST"))
        .and(path("/v1/core/getKeysStatus"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(2)
        .mount(&server)
        .await;

    let bridge = Arc::new(assert_ok!(HttpSdkBridge::new(&server.uri(), tokens)));
    let core = CoreDevice::new(bridge, "device-1");
    assert_ok!(core.get_keys_status().await);
    assert_ok!(core.get_keys_status().await);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_bridge_maps_named_sdk_errors() {
    let server = setup_mock_server().await;
    let (tokens, _) = scripted_token_cache("uid-1");

    Mock::given(method("POST"))
        .and(path("/v1/core/signTransaction"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": {"name": "SigningInProgress", "message": "another signing is running"}
        })))
        .mount(&server)
        .await;

    let bridge = Arc::new(assert_ok!(HttpSdkBridge::new(&server.uri(), tokens)));
    let core = CoreDevice::new(bridge, "device-1");
    match core.sign_transaction("tx-1").await {
        Err(AdapterError::Sdk { name, message }) => {
            assert_eq!(name, "SigningInProgress");
            assert_eq!(message, "another signing is running");
        }
        other => panic!("expected sdk error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_bridge_surfaces_auth_failure_without_calling_sdk() {
    let server = setup_mock_server().await;
    let provider = Arc::new(ew_console_adapter::MockIdentityProvider::new());
    provider.push_failure("Error: USER_DISABLED");
    let tokens = ew_console_adapter::TokenCache::new(provider);

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let bridge = Arc::new(assert_ok!(HttpSdkBridge::new(&server.uri(), tokens)));
    let wallet = EmbeddedWallet::new(bridge);
    let err = wallet.get_accounts().await.unwrap_err();
    assert_eq!(err.name(), "AuthExchangeError");
    assert!(err.to_string().contains("USER_DISABLED"));
}
