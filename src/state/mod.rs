//! State module for crawl records and per-URL progress
//!
//! # Components
//!
//! - `PageType` / `PageInfo`: what a crawl produces for every recorded URL
//! - `UrlState`: the lifecycle of a single URL during one crawl
//! - `UrlLedger`: the shared visited set, keyed by canonical URL, that
//!   workers claim URLs from

mod ledger;
mod page_type;
mod url_state;

// Re-export main types
pub use ledger::{LedgerTally, UrlLedger};
pub use page_type::{PageInfo, PageType};
pub use url_state::{DropReason, StateError, UrlState};
