/*
[INPUT]:  SDK method names, params and an authenticated transport
[OUTPUT]: Typed facades over the embedded wallet and MPC device SDK
[POS]:    SDK layer - wallet and device call surface
[UPDATE]: When adding SDK methods or changing the bridge protocol
*/

pub mod device;
pub mod transport;
pub mod types;
pub mod wallet;

pub use device::CoreDevice;
pub use transport::{HttpSdkBridge, MockTransport, RecordedCall, SdkNamespace, SdkTransport};
pub use wallet::EmbeddedWallet;
