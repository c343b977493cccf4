//! Change detection between two crawls
//!
//! Both sides are reduced to a `url -> content hash` map and compared with
//! plain set algebra over the URL keys:
//!
//! - `added = new \ old`
//! - `removed = old \ new`
//! - `modified = { u in old ∩ new : old[u] != new[u] }`

use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// URLs that changed between two snapshots
///
/// The three sets are disjoint. Sets are ordered so reports print stably.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffReport {
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
    pub modified: BTreeSet<String>,
}

impl DiffReport {
    /// Report for a site seen for the first time: every URL is new
    pub fn all_added<I, U>(urls: I) -> Self
    where
        I: IntoIterator<Item = U>,
        U: Into<String>,
    {
        Self {
            added: urls.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Returns true if nothing changed
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    /// Total number of changed URLs
    pub fn change_count(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }
}

impl fmt::Display for DiffReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} added, {} removed, {} modified",
            self.added.len(),
            self.removed.len(),
            self.modified.len()
        )
    }
}

/// Builds a `url -> hash` map, keeping the first hash seen for a URL
///
/// # Example
///
/// ```
/// use llms_txt_monitor::snapshot::fingerprint_map;
///
/// let map = fingerprint_map([("https://x/", "h1"), ("https://x/", "h2")]);
/// assert_eq!(map["https://x/"], "h1");
/// ```
pub fn fingerprint_map<I, K, V>(entries: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut map = HashMap::new();
    for (url, hash) in entries {
        map.entry(url.into()).or_insert_with(|| hash.into());
    }
    map
}

/// Compares two fingerprint maps
///
/// Any difference in hash means "modified"; runs in `O(|old| + |new|)`.
pub fn compute_diff(old: &HashMap<String, String>, new: &HashMap<String, String>) -> DiffReport {
    let mut report = DiffReport::default();

    for (url, new_hash) in new {
        match old.get(url) {
            None => {
                report.added.insert(url.clone());
            }
            Some(old_hash) if old_hash != new_hash => {
                report.modified.insert(url.clone());
            }
            Some(_) => {}
        }
    }

    for url in old.keys() {
        if !new.contains_key(url) {
            report.removed.insert(url.clone());
        }
    }

    report
}
