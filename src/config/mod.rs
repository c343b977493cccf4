//! Configuration module for llms-txt-monitor
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use llms_txt_monitor::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, MonitorConfig, OutputConfig, RendererConfig, SiteEntry};

// Re-export parser functions
pub use parser::{load_config, parse_config};
