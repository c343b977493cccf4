use super::url_state::{DropReason, StateError, UrlState};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Shared visited set for one crawl
///
/// A URL is claimed at most once: the first caller of [`UrlLedger::claim`]
/// wins and every later caller, from any task, is refused. Every claimed URL
/// is then driven to a terminal [`UrlState`].
#[derive(Debug, Default)]
pub struct UrlLedger {
    entries: Mutex<HashMap<String, UrlState>>,
}

/// Counts of URLs per outcome at the end of a crawl
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LedgerTally {
    pub recorded: usize,
    pub in_flight: usize,
    pub host_mismatch: usize,
    pub fetch_failed: usize,
    pub depth_cut: usize,
    pub cap_reached: usize,
}

impl LedgerTally {
    /// Total number of URLs the crawl looked at
    pub fn total(&self) -> usize {
        self.recorded
            + self.in_flight
            + self.host_mismatch
            + self.fetch_failed
            + self.depth_cut
            + self.cap_reached
    }
}

impl UrlLedger {
    /// Creates an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claims a URL
    ///
    /// # Returns
    ///
    /// `true` if the URL had never been seen and now belongs to the caller,
    /// `false` if it was already claimed or dropped.
    pub fn claim(&self, url: &str) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.contains_key(url) {
            return false;
        }
        entries.insert(url.to_string(), UrlState::Claimed);
        true
    }

    /// Moves a claimed URL to its next state
    pub fn advance(&self, url: &str, next: UrlState) -> Result<(), StateError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let current = entries
            .get_mut(url)
            .ok_or_else(|| StateError::Unknown(url.to_string()))?;

        if !current.can_transition_to(next) {
            return Err(StateError::InvalidTransition {
                url: url.to_string(),
                from: *current,
                to: next,
            });
        }

        *current = next;
        Ok(())
    }

    /// Records that a URL was seen but never claimed
    ///
    /// Has no effect if the URL is already known.
    pub fn drop_unclaimed(&self, url: &str, reason: DropReason) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .entry(url.to_string())
            .or_insert(UrlState::Dropped(reason));
    }

    /// Returns true if the URL was claimed or dropped before
    pub fn is_known(&self, url: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(url)
    }

    /// Returns the current state of a URL
    pub fn state_of(&self, url: &str) -> Option<UrlState> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .copied()
    }

    /// Counts URLs per outcome
    pub fn tally(&self) -> LedgerTally {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut tally = LedgerTally::default();

        for state in entries.values() {
            match state {
                UrlState::Claimed | UrlState::Fetched => tally.in_flight += 1,
                UrlState::Recorded => tally.recorded += 1,
                UrlState::Dropped(DropReason::HostMismatch) => tally.host_mismatch += 1,
                UrlState::Dropped(DropReason::FetchFailed) => tally.fetch_failed += 1,
                UrlState::Dropped(DropReason::DepthCut) => tally.depth_cut += 1,
                UrlState::Dropped(DropReason::CapReached) => tally.cap_reached += 1,
            }
        }

        tally
    }
}
