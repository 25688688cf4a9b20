/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public embedded-wallet console adapter surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod auth;
pub mod http;
pub mod sdk;

// Re-export commonly used types from auth
pub use auth::{
    CLEAR_CLAIMS,
    ClaimsAdmin,
    Clock,
    IdentityProvider,
    IdentityToolkitConfig,
    IdentityToolkitProvider,
    ManualClock,
    MockClaimsAdmin,
    MockIdentityProvider,
    ServiceAccountKey,
    SystemClock,
    TokenCache,
    TokenRecord,
};

// Re-export commonly used types from http
pub use http::{AdapterError, ClientConfig, JsonClient, Result};

// Re-export SDK facades and types
pub use sdk::types::*;
pub use sdk::{CoreDevice, EmbeddedWallet, HttpSdkBridge, MockTransport, SdkNamespace, SdkTransport};
