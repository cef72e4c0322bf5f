//! Documents and the persistent memoization layer beneath them.

pub mod cache;
mod types;

pub use cache::{CacheKey, ContentCache};
pub use types::Document;
