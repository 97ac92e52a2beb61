//! Sightline cache subsystem.
//!
//! A key-value cache fronting the Catalog Store. Entries are derived,
//! disposable projections with a fixed TTL; absence or corruption is always
//! recoverable by re-querying the store.
//!
//! Keys are colon-delimited strings under the `sight:` namespace:
//!
//! ```text
//! sight:detail:<id>
//! sight:list:<page>:<page_size>
//! sight:hot:list
//! sight:fine:list
//! sight:search:<keyword>:<page>:<page_size>
//! ```

mod client;
mod keys;
mod memory;

pub use client::{CacheClient, CacheError};
pub use keys::{SightKey, patterns};
pub use memory::MemoryCache;
