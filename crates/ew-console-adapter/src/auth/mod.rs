/*
[INPUT]:  Identity provider credentials and the current time
[OUTPUT]: Fresh bearer tokens, token records and claim administration
[POS]:    Auth layer - handles identity provider authentication
[UPDATE]: When auth flow or token refresh policy changes
*/

pub mod cache;
pub mod claims;
pub mod clock;
pub mod identity_toolkit;
pub mod jwt;
pub mod provider;

pub use cache::TokenCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use claims::{CLEAR_CLAIMS, ClaimsAdmin, MockClaimsAdmin, merge_claim};
pub use identity_toolkit::{IdentityToolkitConfig, IdentityToolkitProvider, ServiceAccountKey};
pub use jwt::{TokenRecord, decode_token_times};
pub use provider::{IdentityProvider, MockIdentityProvider, unsigned_jwt};
