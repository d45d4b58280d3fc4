//! modsync-client: the consumer side of modsync
//!
//! Fetches the server manifest, then fetches only the files whose local
//! content hash differs, one at a time, in manifest order.

pub mod progress;
pub mod sync;

pub use progress::{NullSink, ProgressSink};
pub use sync::{SyncClient, SyncError, SyncTask};
