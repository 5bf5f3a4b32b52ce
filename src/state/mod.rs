//! State module for pages and crawl runs
//!
//! # Components
//!
//! - `PageResult`: the outcome of fetching one page, with its matches or error
//! - `SearchMatch`: a search term found on a given line
//! - `CrawlState`: the coordinator's running/terminated state and its `TerminationReason`

mod crawl_state;
mod page;

pub use crawl_state::{CrawlState, TerminationReason};
pub use page::{FetchError, PageResult, SearchMatch, STATUS_TOO_MANY_REQUESTS};
