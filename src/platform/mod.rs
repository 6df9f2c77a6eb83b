//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Storage (LocalStorage on web, in-memory natively)
//! - Wall-clock time and calendar dates

pub mod storage;
pub mod time;

pub use storage::{MemoryStorage, Storage, StorageError, StorageResult};
pub use time::{Clock, FixedClock, SystemClock, iso_date};

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
