//! Output traits and error types
//!
//! This module defines the trait interface for `llms.txt` text generators
//! and the errors raised when writing output files.

use crate::storage::PageRecord;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Renders the persisted pages of a snapshot as an `llms.txt` file
pub trait TextGenerator: Send + Sync {
    /// Generates the file text
    ///
    /// # Arguments
    ///
    /// * `base_url` - The site the pages belong to
    /// * `pages` - The snapshot's page records; `None` yields the empty string
    fn generate(&self, base_url: &str, pages: Option<&[PageRecord]>) -> String;
}
