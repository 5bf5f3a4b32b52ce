//! Output module for presenting crawl results
//!
//! This module handles:
//! - Rendering each result as it arrives
//! - Tallying pages, matches and errors for the closing summary

mod printer;
pub mod stats;

pub use printer::Printer;
pub use stats::CrawlStats;
