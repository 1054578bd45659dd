//! State module for tracking crawl progress
//!
//! `PageState` tracks where each URL is in the crawl lifecycle.

mod page_state;

pub use page_state::PageState;
