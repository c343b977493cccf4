//! Snapshot module: diffing, the crawl/persist cycle and the periodic monitor
//!
//! # Components
//!
//! - `diff`: fingerprint maps and the added / removed / modified report
//! - `SnapshotService`: crawl, persist and diff one site
//! - `Monitor`: fixed-delay loop over every monitored site

mod diff;
mod monitor;
mod service;

pub use diff::{compute_diff, fingerprint_map, DiffReport};
pub use monitor::{CycleReport, Monitor, DEFAULT_INTERVAL};
pub use service::{validate_base_url, SnapshotService};
