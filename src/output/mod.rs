//! Output module for generating `llms.txt` files and reports
//!
//! This module handles:
//! - Rendering the latest snapshot of a site as `llms.txt`
//! - Writing generated files to disk
//! - Per-site statistics for the command line

mod llms_txt;
pub mod stats;
mod traits;

pub use llms_txt::{format_llms_txt, write_llms_txt, LlmsTxtGenerator};
pub use stats::{load_statistics, print_statistics, SiteStatistics};
pub use traits::{OutputError, OutputResult, TextGenerator};
