//! Process-local caching of the fetched record set.
//!
//! Entries carry an absolute expiry and, optionally, a sliding idle window:
//! a read renews the window but never moves the absolute cutoff.

mod memory;
mod traits;

pub use memory::MemoryCache;
pub use traits::CacheStore;
