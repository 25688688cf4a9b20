/*
[INPUT]:  Storage directory from configuration
[OUTPUT]: Flat-file wallet alias registry and device id store
[POS]:    Storage layer - persistence across console runs
[UPDATE]: When adding persisted records or changing file formats
*/

pub mod device;
pub mod registry;

pub use device::DeviceIdStore;
pub use registry::{WalletAlias, WalletAliasRegistry, sanitize_alias_name};
