/*
[INPUT]:  Console contexts over mock SDK transport and claims store
[OUTPUT]: Command dispatch verification
[POS]:    Integration tests - command layer
[UPDATE]: When command flows or tier gating change
*/

mod common;

use common::{SUBJECT_UID, context, device_context, wallet_context};
use ew_console::commands::CommandFailure;
use ew_console::{Answer, Command, CommandOutcome, ScriptedPrompter, dispatch};
use ew_console_adapter::SdkNamespace;
use serde_json::{Value, json};
use tokio_test::assert_ok;
use uuid::Uuid;

fn success(outcome: CommandOutcome) -> Value {
    match outcome {
        CommandOutcome::Success(value) => value,
        CommandOutcome::Failure(failure) => panic!("command failed: {failure:?}"),
    }
}

fn failure(outcome: CommandOutcome) -> CommandFailure {
    match outcome {
        CommandOutcome::Failure(failure) => failure,
        CommandOutcome::Success(value) => panic!("command succeeded: {value}"),
    }
}

#[tokio::test]
async fn test_wallet_command_before_init_fails_without_sdk_call() {
    let (mut ctx, mocks) = context();
    let mut prompter = ScriptedPrompter::default();

    let failure = failure(dispatch(&mut ctx, &mut prompter, Command::GetAccounts).await);

    assert_eq!(failure.name, "PreconditionError");
    assert_eq!(failure.message, "Embedded Wallet not initialized");
    assert!(mocks.transport.calls().is_empty());
}

#[tokio::test]
async fn test_device_command_before_init_fails() {
    let (mut ctx, mocks) = wallet_context();
    let mut prompter = ScriptedPrompter::default();

    let failure = failure(dispatch(&mut ctx, &mut prompter, Command::GetKeysStatus).await);

    assert_eq!(failure.message, "Core not initialized");
    assert!(mocks.transport.calls().is_empty());
}

#[tokio::test]
async fn test_sdk_error_keeps_its_name() {
    let (mut ctx, mocks) = wallet_context();
    mocks
        .transport
        .fail(SdkNamespace::EmbeddedWallet, "getAccounts", "NotAssigned", "no wallet");
    let mut prompter = ScriptedPrompter::default();

    let failure = failure(dispatch(&mut ctx, &mut prompter, Command::GetAccounts).await);

    assert_eq!(failure.name, "NotAssigned");
    assert_eq!(failure.message, "NotAssigned: no wallet");
}

#[tokio::test]
async fn test_interactive_init_generates_and_persists_device_id() {
    let (mut ctx, mocks) = context();
    mocks.transport.on(SdkNamespace::EmbeddedWallet, "initialize", json!({}));
    mocks.transport.on(SdkNamespace::EmbeddedWallet, "initializeCore", json!({}));
    let mut prompter = ScriptedPrompter::new([
        Answer::Confirm(true),
        Answer::Confirm(true),
        Answer::Text(String::new()),
    ]);

    success(dispatch(&mut ctx, &mut prompter, Command::InitEmbeddedWallet).await);

    assert!(ctx.session.wallet_ready);
    assert!(ctx.session.device_ready);
    let device_id = ctx.session.active_device_id.clone().expect("device id");
    assert_ok!(Uuid::parse_str(&device_id));
    assert_eq!(assert_ok!(ctx.devices.get_device_id().await), Some(device_id.clone()));

    let init = &mocks.transport.calls_to("initialize")[0];
    assert_eq!(
        init.params,
        json!({"env": "sandbox", "authClientId": "client-1", "sdkLogs": true})
    );
    let core = &mocks.transport.calls_to("initializeCore")[0];
    assert_eq!(core.params, json!({"deviceId": device_id}));
}

#[tokio::test]
async fn test_init_declining_device_keeps_core_tier_closed() {
    let (mut ctx, mocks) = context();
    mocks.transport.on(SdkNamespace::EmbeddedWallet, "initialize", json!({}));
    let mut prompter = ScriptedPrompter::new([Answer::Confirm(false), Answer::Confirm(false)]);

    success(dispatch(&mut ctx, &mut prompter, Command::InitEmbeddedWallet).await);

    assert!(ctx.session.wallet_ready);
    assert!(!ctx.session.device_ready);
    assert!(mocks.transport.calls_to("initializeCore").is_empty());
}

#[tokio::test]
async fn test_second_init_is_a_no_op() {
    let (mut ctx, mocks) = wallet_context();
    let mut prompter = ScriptedPrompter::default();

    let value = success(dispatch(&mut ctx, &mut prompter, Command::InitEmbeddedWallet).await);

    assert_eq!(value["initialized"], true);
    assert!(mocks.transport.calls().is_empty());
    assert!(prompter.prompts().is_empty());
}

#[tokio::test]
async fn test_auto_init_skips_prompts() {
    let (mut ctx, mocks) = context();
    mocks.transport.on(SdkNamespace::EmbeddedWallet, "initialize", json!({}));
    mocks.transport.on(SdkNamespace::EmbeddedWallet, "initializeCore", json!({}));
    ctx.auto = true;
    let mut prompter = ScriptedPrompter::default();

    success(dispatch(&mut ctx, &mut prompter, Command::InitEmbeddedWallet).await);

    assert!(prompter.prompts().is_empty());
    assert!(ctx.session.device_ready);
    assert_eq!(mocks.transport.calls_to("initialize")[0].params["sdkLogs"], false);
}

#[tokio::test]
async fn test_init_core_defaults_to_stored_device_id() {
    let (mut ctx, mocks) = wallet_context();
    mocks.transport.on(SdkNamespace::EmbeddedWallet, "initializeCore", json!({}));
    assert_ok!(ctx.devices.set_device_id("device-stored").await);
    let mut prompter = ScriptedPrompter::new([Answer::Default]);

    let value = success(dispatch(&mut ctx, &mut prompter, Command::InitCore).await);

    assert_eq!(value["deviceId"], "device-stored");
    assert_eq!(ctx.session.active_device_id.as_deref(), Some("device-stored"));
    assert_eq!(
        prompter.prompts(),
        ["Enter device ID (leave blank to generate a random one)"]
    );
}

#[tokio::test]
async fn test_init_core_persists_a_changed_device_id() {
    let (mut ctx, mocks) = wallet_context();
    mocks.transport.on(SdkNamespace::EmbeddedWallet, "initializeCore", json!({}));
    assert_ok!(ctx.devices.set_device_id("device-old").await);
    let mut prompter = ScriptedPrompter::new([Answer::Text("device-new".to_string())]);

    success(dispatch(&mut ctx, &mut prompter, Command::InitCore).await);

    assert_eq!(
        assert_ok!(ctx.devices.get_device_id().await).as_deref(),
        Some("device-new")
    );
}

#[tokio::test]
async fn test_user_input_claim_saves_alias_and_resets_device() {
    let (mut ctx, mocks) = device_context();
    mocks.transport.on(SdkNamespace::Core, "dispose", Value::Null);
    let mut prompter = ScriptedPrompter::new([
        Answer::Default,
        Answer::Choose("USER_INPUT".to_string()),
        Answer::Text("wallet-42".to_string()),
        Answer::Confirm(true),
        Answer::Text("main".to_string()),
    ]);

    let value = success(dispatch(&mut ctx, &mut prompter, Command::SetCustomPrincipalClaim).await);

    assert_eq!(value["claims"], json!({"wallet_claim": "wallet-42"}));
    assert_eq!(
        mocks.claims.claims_of(SUBJECT_UID),
        Some(json!({"wallet_claim": "wallet-42"}))
    );
    assert_eq!(mocks.identity.calls(), 1);
    assert_eq!(ctx.session.active_wallet_id.as_deref(), Some("wallet-42"));
    assert!(!ctx.session.device_ready);
    assert_eq!(mocks.transport.calls_to("dispose").len(), 1);

    let alias = assert_ok!(ctx.aliases.find_by_name("main").await).expect("alias saved");
    assert_eq!(alias.id, "wallet-42");
}

#[tokio::test]
async fn test_saved_claim_with_empty_registry_writes_nothing() {
    let (mut ctx, mocks) = context();
    let mut prompter = ScriptedPrompter::new([Answer::Default, Answer::Choose("SAVED".to_string())]);

    let value = success(dispatch(&mut ctx, &mut prompter, Command::SetCustomPrincipalClaim).await);

    assert_eq!(value, Value::Null);
    assert_eq!(mocks.claims.claims_of(SUBJECT_UID), None);
    assert_eq!(mocks.identity.calls(), 0);
}

#[tokio::test]
async fn test_saved_claim_uses_selected_alias() {
    let (mut ctx, mocks) = context();
    assert_ok!(ctx.aliases.add_alias("main", "wallet-1").await);
    assert_ok!(ctx.aliases.add_alias("spare", "wallet-2").await);
    let mut prompter = ScriptedPrompter::new([
        Answer::Text("uid-other".to_string()),
        Answer::Choose("SAVED".to_string()),
        Answer::Choose("spare: wallet-2".to_string()),
    ]);

    success(dispatch(&mut ctx, &mut prompter, Command::SetCustomPrincipalClaim).await);

    assert_eq!(
        mocks.claims.claims_of("uid-other"),
        Some(json!({"wallet_claim": "wallet-2"}))
    );
    assert_eq!(ctx.session.active_wallet_id.as_deref(), Some("wallet-2"));
}

#[tokio::test]
async fn test_clear_claim_drops_active_wallet() {
    let (mut ctx, mocks) = context();
    ctx.set_active_wallet(Some("wallet-1".to_string()));
    let mut prompter = ScriptedPrompter::new([Answer::Default, Answer::Choose("CLEAR".to_string())]);

    let value = success(dispatch(&mut ctx, &mut prompter, Command::SetCustomPrincipalClaim).await);

    assert_eq!(value["claims"], json!({}));
    assert_eq!(mocks.claims.claims_of(SUBJECT_UID), Some(json!({})));
    assert_eq!(ctx.session.active_wallet_id, None);
}

#[tokio::test]
async fn test_wallet_summary_needs_both_tiers() {
    let (mut ctx, _mocks) = wallet_context();
    let mut prompter = ScriptedPrompter::default();

    let failure = failure(dispatch(&mut ctx, &mut prompter, Command::WalletSummary).await);

    assert_eq!(failure.message, "Must initialize both Embedded Wallet and Core NCW");
}

#[tokio::test]
async fn test_wallet_summary_collects_balances_and_keys() {
    let (mut ctx, mocks) = device_context();
    let transport = &mocks.transport;
    transport.on(SdkNamespace::EmbeddedWallet, "getAccounts", json!({"data": [{"accountId": 0}]}));
    transport.on(
        SdkNamespace::EmbeddedWallet,
        "getAssets",
        json!({"data": [{"id": "BTC_TEST"}, {"id": "ETH_TEST"}]}),
    );
    transport.on_with(SdkNamespace::EmbeddedWallet, "getBalance", |params| {
        let total = if params["assetId"] == "ETH_TEST" { "5" } else { "0.5" };
        Ok(json!({"total": total, "available": total}))
    });
    transport.on(
        SdkNamespace::Core,
        "getKeysStatus",
        json!({"MPC_CMP_ECDSA_SECP256K1": {
            "keyId": "k-1",
            "keyStatus": "READY",
            "algorithm": "MPC_CMP_ECDSA_SECP256K1"
        }}),
    );
    transport.on(
        SdkNamespace::EmbeddedWallet,
        "getLatestBackup",
        json!({"keys": [{"algorithm": "MPC_ECDSA_SECP256K1"}]}),
    );
    transport.on(SdkNamespace::EmbeddedWallet, "assignWallet", json!({"walletId": "wallet-7"}));
    let mut prompter = ScriptedPrompter::default();

    let value = success(dispatch(&mut ctx, &mut prompter, Command::WalletSummary).await);

    assert_eq!(value["accounts"][0]["assetId"], "ETH_TEST");
    assert_eq!(value["accounts"][1]["assetId"], "BTC_TEST");
    assert_eq!(
        value["keys"],
        json!([{"keyId": "k-1", "status": "READY", "backup": true, "algorithm": "MPC_ECDSA_SECP256K1"}])
    );
    assert_eq!(ctx.session.active_wallet_id.as_deref(), Some("wallet-7"));
}

#[tokio::test]
async fn test_balance_picks_asset_from_account() {
    let (mut ctx, mocks) = wallet_context();
    mocks.transport.on(
        SdkNamespace::EmbeddedWallet,
        "getAssets",
        json!({"data": [{"id": "BTC_TEST"}, {"id": "XRP_TEST"}]}),
    );
    mocks.transport.on(SdkNamespace::EmbeddedWallet, "getBalance", json!({"total": "1"}));
    let mut prompter = ScriptedPrompter::new([
        Answer::Text("abc".to_string()),
        Answer::Text("2".to_string()),
        Answer::Choose("XRP_TEST".to_string()),
    ]);

    success(dispatch(&mut ctx, &mut prompter, Command::GetBalance).await);

    let call = &mocks.transport.calls_to("getBalance")[0];
    assert_eq!(call.params, json!({"accountId": 2, "assetId": "XRP_TEST"}));
}

#[tokio::test]
async fn test_transaction_to_end_user_wallet() {
    let (mut ctx, mocks) = wallet_context();
    ctx.set_active_wallet(Some("wallet-1".to_string()));
    mocks.transport.fail(SdkNamespace::EmbeddedWallet, "getAssets", "Unavailable", "down");
    mocks.transport.on(SdkNamespace::EmbeddedWallet, "createTransaction", json!({"id": "tx-1"}));
    let mut prompter = ScriptedPrompter::new([
        Answer::Default,
        Answer::Text("BTC_TEST".to_string()),
        Answer::Text("0.1".to_string()),
        Answer::Choose("END_USER_WALLET".to_string()),
        Answer::Default,
        Answer::Default,
    ]);

    success(dispatch(&mut ctx, &mut prompter, Command::CreateTransaction).await);

    let call = &mocks.transport.calls_to("createTransaction")[0];
    assert_eq!(
        call.params,
        json!({
            "assetId": "BTC_TEST",
            "source": {"id": "0"},
            "destination": {"type": "END_USER_WALLET", "walletId": "wallet-1", "id": "0"},
            "amount": "0.1"
        })
    );
}

#[tokio::test]
async fn test_create_and_sign_needs_device() {
    let (mut ctx, mocks) = wallet_context();
    let mut prompter = ScriptedPrompter::default();

    let failure = failure(dispatch(&mut ctx, &mut prompter, Command::CreateAndSignTransaction).await);

    assert_eq!(failure.message, "Core not initialized");
    assert!(mocks.transport.calls().is_empty());
}

#[tokio::test]
async fn test_create_and_sign_signs_created_id() {
    let (mut ctx, mocks) = device_context();
    mocks.transport.fail(SdkNamespace::EmbeddedWallet, "getAssets", "Unavailable", "down");
    mocks.transport.on(SdkNamespace::EmbeddedWallet, "createTransaction", json!({"id": "tx-9"}));
    mocks.transport.on(SdkNamespace::Core, "signTransaction", json!({"txId": "tx-9"}));
    let mut prompter = ScriptedPrompter::new([
        Answer::Default,
        Answer::Default,
        Answer::Text("1".to_string()),
        Answer::Default,
        Answer::Default,
    ]);

    success(dispatch(&mut ctx, &mut prompter, Command::CreateAndSignTransaction).await);

    let sign = &mocks.transport.calls_to("signTransaction")[0];
    assert_eq!(sign.params, json!({"txId": "tx-9", "deviceId": "device-1"}));
}

#[tokio::test]
async fn test_json_transaction_reopens_editor_on_invalid_json() {
    let (mut ctx, mocks) = wallet_context();
    mocks.transport.on(SdkNamespace::EmbeddedWallet, "createTransaction", json!({"id": "tx-2"}));
    let request = json!({"assetId": "ETH_TEST", "source": {"id": "1"}, "amount": "2"});
    let mut prompter = ScriptedPrompter::new([
        Answer::Text("{ not json".to_string()),
        Answer::Text(request.to_string()),
    ]);

    success(dispatch(&mut ctx, &mut prompter, Command::CreateTransactionFromJson).await);

    assert_eq!(prompter.prompts().len(), 2);
    assert_eq!(mocks.transport.calls_to("createTransaction")[0].params, request);
}

#[tokio::test]
async fn test_latest_transactions_queries_both_directions() {
    let (mut ctx, mocks) = wallet_context();
    mocks.transport.on_with(SdkNamespace::EmbeddedWallet, "getTransactions", |params| {
        if params.get("incoming").is_some() {
            Ok(json!({"data": [{"id": "in", "lastUpdated": 1_700_000_000_000i64}]}))
        } else {
            Ok(json!({"data": [{"id": "out", "lastUpdated": 1_700_000_500_000i64}]}))
        }
    });
    let mut prompter = ScriptedPrompter::default();

    let value = success(dispatch(&mut ctx, &mut prompter, Command::GetLatestTransactions).await);

    assert_eq!(value[0]["id"], "out");
    assert_eq!(value[1]["id"], "in");
    let calls = mocks.transport.calls_to("getTransactions");
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| c.params["limit"] == 2 && c.params["orderBy"] == "lastUpdated"));
}

#[tokio::test]
async fn test_generate_keys_maps_to_cmp_algorithms() {
    let (mut ctx, mocks) = device_context();
    mocks.transport.on(SdkNamespace::Core, "generateMPCKeys", json!({}));
    let mut prompter = ScriptedPrompter::new([Answer::Default]);

    success(dispatch(&mut ctx, &mut prompter, Command::GenerateMpcKeys).await);

    let call = &mocks.transport.calls_to("generateMPCKeys")[0];
    assert_eq!(
        call.params,
        json!({"algorithms": ["MPC_CMP_ECDSA_SECP256K1"], "deviceId": "device-1"})
    );
}

#[tokio::test]
async fn test_backup_uses_configured_passphrase_defaults() {
    let (mut ctx, mocks) = device_context();
    mocks.transport.on(SdkNamespace::Core, "backupKeys", json!({}));
    let mut prompter = ScriptedPrompter::new([Answer::Default, Answer::Default]);

    success(dispatch(&mut ctx, &mut prompter, Command::BackupKeys).await);

    let call = &mocks.transport.calls_to("backupKeys")[0];
    assert_eq!(call.params["passphrase"], "hunter2");
    assert_eq!(call.params["passphraseId"], "4f2c7b8e-0000-4000-8000-000000000001");
}

#[tokio::test]
async fn test_dispose_closes_device_tier() {
    let (mut ctx, mocks) = device_context();
    mocks.transport.on(SdkNamespace::Core, "dispose", Value::Null);
    let mut prompter = ScriptedPrompter::default();

    success(dispatch(&mut ctx, &mut prompter, Command::Dispose).await);
    assert!(!ctx.session.device_ready);
    assert_eq!(ctx.session.active_device_id, None);

    let failure = failure(dispatch(&mut ctx, &mut prompter, Command::GetKeysStatus).await);
    assert_eq!(failure.message, "Core not initialized");
}

#[tokio::test]
async fn test_refresh_token_forces_exchange() {
    let (mut ctx, mocks) = context();
    let mut prompter = ScriptedPrompter::default();

    assert_ok!(ctx.tokens.get_token(false).await);
    let value = success(dispatch(&mut ctx, &mut prompter, Command::RefreshIdpToken).await);

    assert_eq!(mocks.identity.calls(), 2);
    assert!(value["expiresAt"].is_string());
}

#[tokio::test]
async fn test_cancelled_prompt_becomes_failure() {
    let (mut ctx, _mocks) = wallet_context();
    let mut prompter = ScriptedPrompter::new([Answer::Cancel]);

    let failure = failure(dispatch(&mut ctx, &mut prompter, Command::GetTransactionById).await);

    assert_eq!(failure.name, "PromptCancelledError");
}
