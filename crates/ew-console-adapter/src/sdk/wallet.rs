/*
[INPUT]:  Typed arguments collected by console commands
[OUTPUT]: Raw embedded-wallet SDK responses
[POS]:    SDK layer - embedded wallet facade (namespace "ew")
[UPDATE]: When the embedded wallet SDK surface changes
*/

use std::sync::Arc;

use serde_json::{Value, json};

use super::types::{
    AccountRef, AssetRef, AssignedWallet, Balance, LatestBackup, Page, TransactionFilter,
    TransactionRequest, decode,
};
use super::{SdkNamespace, SdkTransport};
use crate::http::Result;

/// Embedded wallet operations, forwarded unchanged to the SDK
#[derive(Clone)]
pub struct EmbeddedWallet {
    transport: Arc<dyn SdkTransport>,
}

impl EmbeddedWallet {
    pub fn new(transport: Arc<dyn SdkTransport>) -> Self {
        Self { transport }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        self.transport
            .call(SdkNamespace::EmbeddedWallet, method, params)
            .await
    }

    pub async fn initialize(&self, env: &str, auth_client_id: &str, sdk_logs: bool) -> Result<Value> {
        self.call(
            "initialize",
            json!({ "env": env, "authClientId": auth_client_id, "sdkLogs": sdk_logs }),
        )
        .await
    }

    pub async fn initialize_core(&self, device_id: &str) -> Result<Value> {
        self.call("initializeCore", json!({ "deviceId": device_id })).await
    }

    // ### Wallet management

    pub async fn assign_wallet(&self) -> Result<(AssignedWallet, Value)> {
        let raw = self.call("assignWallet", Value::Null).await?;
        let assigned = decode(raw.clone())?;
        Ok((assigned, raw))
    }

    pub async fn create_account(&self) -> Result<Value> {
        self.call("createAccount", Value::Null).await
    }

    pub async fn get_accounts(&self) -> Result<Value> {
        self.call("getAccounts", Value::Null).await
    }

    pub async fn account_ids(&self) -> Result<Vec<u32>> {
        let page: Page<AccountRef> = decode(self.get_accounts().await?)?;
        Ok(page.data.into_iter().map(|a| a.account_id).collect())
    }

    pub async fn get_assets(&self, account_id: u32) -> Result<Value> {
        self.call("getAssets", json!({ "accountId": account_id })).await
    }

    pub async fn asset_ids(&self, account_id: u32) -> Result<Vec<String>> {
        let page: Page<AssetRef> = decode(self.get_assets(account_id).await?)?;
        Ok(page.data.into_iter().map(|a| a.id).collect())
    }

    pub async fn get_asset(&self, account_id: u32, asset_id: &str) -> Result<Value> {
        self.call("getAsset", json!({ "accountId": account_id, "assetId": asset_id }))
            .await
    }

    pub async fn add_asset(&self, account_id: u32, asset_id: &str) -> Result<Value> {
        self.call("addAsset", json!({ "accountId": account_id, "assetId": asset_id }))
            .await
    }

    pub async fn get_balance(&self, account_id: u32, asset_id: &str) -> Result<Value> {
        self.call("getBalance", json!({ "accountId": account_id, "assetId": asset_id }))
            .await
    }

    pub async fn balance(&self, account_id: u32, asset_id: &str) -> Result<Balance> {
        decode(self.get_balance(account_id, asset_id).await?)
    }

    pub async fn refresh_balance(&self, account_id: u32, asset_id: &str) -> Result<Value> {
        self.call(
            "refreshBalance",
            json!({ "accountId": account_id, "assetId": asset_id }),
        )
        .await
    }

    pub async fn get_addresses(&self, account_id: u32, asset_id: &str) -> Result<Value> {
        self.call(
            "getAddresses",
            json!({ "accountId": account_id, "assetId": asset_id }),
        )
        .await
    }

    pub async fn get_device(&self, device_id: &str) -> Result<Value> {
        self.call("getDevice", json!({ "deviceId": device_id })).await
    }

    pub async fn get_latest_backup(&self) -> Result<Value> {
        self.call("getLatestBackup", Value::Null).await
    }

    pub async fn latest_backup(&self) -> Result<LatestBackup> {
        decode(self.get_latest_backup().await?)
    }

    pub async fn get_supported_assets(&self) -> Result<Value> {
        self.call("getSupportedAssets", Value::Null).await
    }

    // ### NFTs

    pub async fn get_nft(&self, id: &str) -> Result<Value> {
        self.call("getNFT", json!({ "id": id })).await
    }

    pub async fn get_owned_nfts(&self) -> Result<Value> {
        self.call("getOwnedNFTs", Value::Null).await
    }

    pub async fn list_owned_assets(&self) -> Result<Value> {
        self.call("listOwnedAssets", Value::Null).await
    }

    pub async fn list_owned_collections(&self) -> Result<Value> {
        self.call("listOwnedCollections", Value::Null).await
    }

    // ### Web3 connections

    pub async fn get_web3_connections(&self) -> Result<Value> {
        self.call("getWeb3Connections", Value::Null).await
    }

    pub async fn create_web3_connection(&self, account_id: u32, uri: &str) -> Result<Value> {
        self.call(
            "createWeb3Connection",
            json!({ "feeLevel": "MEDIUM", "ncwAccountId": account_id, "uri": uri }),
        )
        .await
    }

    pub async fn submit_web3_connection(&self, connection_id: &str, approve: bool) -> Result<Value> {
        self.call(
            "submitWeb3Connection",
            json!({ "connectionId": connection_id, "approve": approve }),
        )
        .await
    }

    pub async fn remove_web3_connection(&self, connection_id: &str) -> Result<Value> {
        self.call(
            "removeWeb3Connection",
            json!({ "connectionId": connection_id }),
        )
        .await
    }

    // ### Transactions

    pub async fn create_transaction(&self, request: &TransactionRequest) -> Result<Value> {
        self.call("createTransaction", serde_json::to_value(request)?).await
    }

    /// Create a transaction from a caller-supplied JSON body
    pub async fn create_transaction_raw(&self, request: Value) -> Result<Value> {
        self.call("createTransaction", request).await
    }

    pub async fn estimate_transaction_fee(&self, request: &TransactionRequest) -> Result<Value> {
        self.call("estimateTransactionFee", serde_json::to_value(request)?)
            .await
    }

    pub async fn get_transaction(&self, tx_id: &str) -> Result<Value> {
        self.call("getTransaction", json!({ "txId": tx_id })).await
    }

    pub async fn get_transactions(&self, filter: &TransactionFilter) -> Result<Value> {
        self.call("getTransactions", serde_json::to_value(filter)?).await
    }

    pub async fn cancel_transaction(&self, tx_id: &str) -> Result<Value> {
        self.call("cancelTransaction", json!({ "txId": tx_id })).await
    }
}

impl std::fmt::Debug for EmbeddedWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedWallet").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::sdk::MockTransport;

    #[tokio::test]
    async fn test_account_ids_decodes_page() {
        let mock = Arc::new(MockTransport::new());
        mock.on(
            SdkNamespace::EmbeddedWallet,
            "getAccounts",
            json!({"data": [{"accountId": 0}, {"accountId": 3}]}),
        );
        let wallet = EmbeddedWallet::new(mock.clone());

        assert_eq!(wallet.account_ids().await.unwrap(), vec![0, 3]);
    }

    #[tokio::test]
    async fn test_assign_wallet_returns_id_and_raw() {
        let mock = Arc::new(MockTransport::new());
        mock.on(
            SdkNamespace::EmbeddedWallet,
            "assignWallet",
            json!({"walletId": "wallet-123"}),
        );
        let wallet = EmbeddedWallet::new(mock.clone());

        let (assigned, raw) = wallet.assign_wallet().await.unwrap();
        assert_eq!(assigned.wallet_id, "wallet-123");
        assert_eq!(raw["walletId"], "wallet-123");
    }

    #[tokio::test]
    async fn test_params_are_forwarded() {
        let mock = Arc::new(MockTransport::new());
        mock.on(SdkNamespace::EmbeddedWallet, "getBalance", json!({"total": "5"}));
        let wallet = EmbeddedWallet::new(mock.clone());

        wallet.get_balance(2, "ETH_TEST5").await.unwrap();
        let calls = mock.calls_to("getBalance");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].params, json!({"accountId": 2, "assetId": "ETH_TEST5"}));
    }
}
