//! Peerbook Core - Paired-device registry and session directory
//!
//! This crate provides the bookkeeping layer for a controller that pairs
//! with remote peer devices:
//! - Device profiles: the durable set of paired devices, identity-resolved
//!   by normalized hardware address or device id
//! - Session directory: the latest transport-reported session snapshot with
//!   a durable preferred-session pointer
//! - Settings store: namespaced string persistence behind a narrow trait

pub mod codec;
pub mod profile;
pub mod registry;
pub mod session;
pub mod settings;

pub use codec::{CodecError, JsonProfileCodec, ProfileCodec};
pub use profile::{normalize_mac, DeviceProfile};
pub use registry::{DeviceRegistry, PREFERRED_SESSION_KEY, PROFILES_KEY, SETTINGS_NAMESPACE};
pub use session::SessionInfo;
pub use settings::{FileSettings, MemorySettings, SettingsError, SettingsStore};
