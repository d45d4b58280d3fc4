//! modsync-core: Core synchronization model
//!
//! Provides content hashing, the server manifest model, and the mod-list
//! selection engine shared by the server and client sides.

pub mod hash;
pub mod manifest;
pub mod path;
pub mod select;
pub mod version;

pub use hash::{compute_checksum, ContentHash};
pub use manifest::{DecodeError, Manifest, ManifestEntry, MANIFEST_FILE_NAME};
pub use path::resolve_direct_child;
pub use select::{Candidate, ModListSelector, ModMetadata};
pub use version::ModVersion;
