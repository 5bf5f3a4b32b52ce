//! URL handling module for webchk
//!
//! This module provides the link canonicalization applied to extracted links and
//! the dedup filter that decides which discovered links are crawled.

mod filter;
mod normalize;

pub use filter::DedupFilter;
pub use normalize::{canonical_link, trim_trailing_slash};
