//! In-memory, time-bounded cache shared by every request of a process.
//!
//! The cache is not a source of truth: entries expire after their TTL and
//! nothing survives a restart. Its second job is stampede protection, making
//! sure that concurrent requests for the same missing key trigger a single
//! upstream fetch whose outcome they all share.

mod clock;
mod entry;
pub mod error;
mod store;

#[cfg(any(test, feature = "mock"))]
pub use crate::clock::ManualClock;
pub use crate::clock::{Clock, SystemClock};
pub use crate::entry::CacheEntry;
pub use crate::store::CacheStore;
