/*
[INPUT]:  Device id and typed arguments collected by console commands
[OUTPUT]: Raw MPC device ("core") SDK responses
[POS]:    SDK layer - device facade (namespace "core")
[UPDATE]: When the MPC device SDK surface changes
*/

use std::sync::Arc;

use serde_json::{Value, json};

use super::types::{KeysStatus, decode};
use super::{SdkNamespace, SdkTransport};
use crate::http::Result;

/// MPC device operations bound to one device id
#[derive(Clone)]
pub struct CoreDevice {
    transport: Arc<dyn SdkTransport>,
    device_id: String,
}

impl CoreDevice {
    pub fn new(transport: Arc<dyn SdkTransport>, device_id: impl Into<String>) -> Self {
        Self {
            transport,
            device_id: device_id.into(),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    async fn call(&self, method: &str, mut params: Value) -> Result<Value> {
        match params {
            Value::Object(ref mut map) => {
                map.insert("deviceId".to_string(), Value::String(self.device_id.clone()));
            }
            _ => params = json!({ "deviceId": self.device_id }),
        }
        self.transport.call(SdkNamespace::Core, method, params).await
    }

    pub async fn dispose(&self) -> Result<Value> {
        self.call("dispose", Value::Null).await
    }

    pub async fn clear_all_storage(&self) -> Result<Value> {
        self.call("clearAllStorage", Value::Null).await
    }

    // ### Key management

    pub async fn generate_mpc_keys(&self, algorithms: &[String]) -> Result<Value> {
        self.call("generateMPCKeys", json!({ "algorithms": algorithms }))
            .await
    }

    pub async fn stop_mpc_device_setup(&self) -> Result<Value> {
        self.call("stopMpcDeviceSetup", Value::Null).await
    }

    pub async fn backup_keys(&self, passphrase: &str, passphrase_id: &str) -> Result<Value> {
        self.call(
            "backupKeys",
            json!({ "passphrase": passphrase, "passphraseId": passphrase_id }),
        )
        .await
    }

    pub async fn recover_keys(&self, passphrase: &str) -> Result<Value> {
        self.call("recoverKeys", json!({ "passphrase": passphrase }))
            .await
    }

    pub async fn derive_asset_key(
        &self,
        extended_private_key: &str,
        coin_type: u32,
        account: u32,
        change: u32,
        index: u32,
    ) -> Result<Value> {
        self.call(
            "deriveAssetKey",
            json!({
                "extendedPrivateKey": extended_private_key,
                "coinType": coin_type,
                "account": account,
                "change": change,
                "index": index,
            }),
        )
        .await
    }

    pub async fn get_keys_status(&self) -> Result<Value> {
        self.call("getKeysStatus", Value::Null).await
    }

    pub async fn keys_status(&self) -> Result<KeysStatus> {
        decode(self.get_keys_status().await?)
    }

    // ### Transactions

    pub async fn sign_transaction(&self, tx_id: &str) -> Result<Value> {
        self.call("signTransaction", json!({ "txId": tx_id })).await
    }

    pub async fn stop_in_progress_sign_transaction(&self) -> Result<Value> {
        self.call("stopInProgressSignTransaction", Value::Null).await
    }

    pub async fn get_in_progress_signing_tx_id(&self) -> Result<Value> {
        self.call("getInProgressSigningTxId", Value::Null).await
    }

    // ### Join wallet

    pub async fn request_join_existing_wallet(&self) -> Result<Value> {
        self.call("requestJoinExistingWallet", Value::Null).await
    }

    pub async fn approve_join_wallet_request(&self, request_id: &str) -> Result<Value> {
        self.call(
            "approveJoinWalletRequest",
            json!({ "requestId": request_id }),
        )
        .await
    }

    pub async fn stop_join_wallet(&self) -> Result<Value> {
        self.call("stopJoinWallet", Value::Null).await
    }

    pub async fn takeover(&self) -> Result<Value> {
        self.call("takeover", Value::Null).await
    }

    pub async fn get_physical_device_id(&self) -> Result<Value> {
        self.call("getPhysicalDeviceId", Value::Null).await
    }
}

impl std::fmt::Debug for CoreDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreDevice")
            .field("device_id", &self.device_id)
            .finish_non_exhaustive()
    }
}
