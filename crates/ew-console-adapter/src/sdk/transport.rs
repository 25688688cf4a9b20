/*
[INPUT]:  SDK namespace, method name and JSON params
[OUTPUT]: Raw JSON results from the wallet/MPC SDK bridge
[POS]:    SDK layer - transport abstraction and HTTP bridge client
[UPDATE]: When the bridge protocol or authentication header changes
*/

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::TokenCache;
use crate::http::{AdapterError, ClientConfig, JsonClient, RawResponse, Result};

/// Which SDK surface a call targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SdkNamespace {
    /// Embedded wallet REST surface
    EmbeddedWallet,
    /// MPC device ("core") surface
    Core,
}

impl SdkNamespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            SdkNamespace::EmbeddedWallet => "ew",
            SdkNamespace::Core => "core",
        }
    }
}

impl fmt::Display for SdkNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for forwarding SDK calls
///
/// The console treats the SDK as a black box: it names a method and passes
/// JSON params; the transport returns whatever the SDK returned.
#[async_trait]
pub trait SdkTransport: Send + Sync {
    async fn call(&self, namespace: SdkNamespace, method: &str, params: Value) -> Result<Value>;
}

/// HTTP client for the SDK bridge
///
/// POST {base_url}/v1/{namespace}/{method} with a bearer token from the cache.
#[derive(Debug, Clone)]
pub struct HttpSdkBridge {
    client: JsonClient,
    tokens: TokenCache,
}

impl HttpSdkBridge {
    pub fn new(base_url: &str, tokens: TokenCache) -> Result<Self> {
        Self::with_config(base_url, ClientConfig::default(), tokens)
    }

    pub fn with_config(base_url: &str, config: ClientConfig, tokens: TokenCache) -> Result<Self> {
        Ok(Self {
            client: JsonClient::with_config(base_url, config)?,
            tokens,
        })
    }
}

#[async_trait]
impl SdkTransport for HttpSdkBridge {
    async fn call(&self, namespace: SdkNamespace, method: &str, params: Value) -> Result<Value> {
        let token = self.tokens.get_token(false).await?;
        let endpoint = format!("/v1/{namespace}/{method}");
        debug!(%namespace, method, "sdk call");

        let builder = self
            .client
            .request(Method::POST, &endpoint)?
            .bearer_auth(token)
            .json(&params);
        let raw = self.client.send_raw(builder).await?;

        if raw.status.is_success() {
            raw.json()
        } else {
            let err = sdk_error(&raw);
            warn!(%namespace, method, status = raw.status.as_u16(), error = %err, "sdk call rejected");
            Err(err)
        }
    }
}

fn sdk_error(raw: &RawResponse) -> AdapterError {
    let parsed: Option<Value> = serde_json::from_str(&raw.body).ok();
    let error = parsed.as_ref().and_then(|body| body.get("error"));
    let name = error
        .and_then(|e| e.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let message = error
        .and_then(|e| e.get("message").or(Some(e)))
        .and_then(Value::as_str)
        .map(str::to_string);

    match (name, message) {
        (Some(name), Some(message)) => AdapterError::Sdk { name, message },
        (None, Some(message)) => AdapterError::sdk_status(raw.status, message),
        _ => AdapterError::sdk_status(raw.status, raw.body.trim()),
    }
}

type MockHandler = Arc<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

/// One call observed by [`MockTransport`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub namespace: SdkNamespace,
    pub method: String,
    pub params: Value,
}

/// In-memory SDK transport for testing
#[derive(Default)]
pub struct MockTransport {
    handlers: Mutex<HashMap<(SdkNamespace, String), MockHandler>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to `method` with a fixed value
    pub fn on(&self, namespace: SdkNamespace, method: &str, reply: Value) {
        self.on_with(namespace, method, move |_| Ok(reply.clone()));
    }

    /// Reply to `method` with an SDK error
    pub fn fail(&self, namespace: SdkNamespace, method: &str, name: &str, message: &str) {
        let (name, message) = (name.to_string(), message.to_string());
        self.on_with(namespace, method, move |_| {
            Err(AdapterError::Sdk {
                name: name.clone(),
                message: message.clone(),
            })
        });
    }

    /// Reply to `method` by inspecting its params
    pub fn on_with<F>(&self, namespace: SdkNamespace, method: &str, handler: F)
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((namespace, method.to_string()), Arc::new(handler));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn calls_to(&self, method: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.method == method)
            .collect()
    }
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTransport")
            .field("calls", &self.calls().len())
            .finish()
    }
}

#[async_trait]
impl SdkTransport for MockTransport {
    async fn call(&self, namespace: SdkNamespace, method: &str, params: Value) -> Result<Value> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                namespace,
                method: method.to_string(),
                params: params.clone(),
            });

        let handler = self
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(namespace, method.to_string()))
            .cloned();

        match handler {
            Some(handler) => handler(&params),
            None => Err(AdapterError::Sdk {
                name: "NotMocked".to_string(),
                message: format!("no mock reply for {namespace}/{method}"),
            }),
        }
    }
}
