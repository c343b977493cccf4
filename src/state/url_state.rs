/// URL state definitions for tracking crawl progress
///
/// Every URL that a crawl looks at ends up in exactly one terminal state.
use std::fmt;
use thiserror::Error;

/// Why a URL was not recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// Host of the URL is not within the base host
    HostMismatch,

    /// Network error, HTTP error status, or unusable content type
    FetchFailed,

    /// URL was discovered past the maximum depth
    DepthCut,

    /// Page cap was already reached when the URL came up
    CapReached,
}

impl DropReason {
    /// Returns the short label used in logs and tallies
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HostMismatch => "host-mismatch",
            Self::FetchFailed => "fetch-failed",
            Self::DepthCut => "depth-cut",
            Self::CapReached => "cap-reached",
        }
    }
}

/// Represents the current state of a URL in one crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlState {
    // ===== Active States =====
    /// URL has been claimed by a worker and will be fetched
    Claimed,

    /// URL has been fetched and is being parsed or hashed
    Fetched,

    // ===== Terminal States =====
    /// A `PageInfo` for the URL was appended to the crawl result
    Recorded,

    /// The URL was given up on
    Dropped(DropReason),
}

impl UrlState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Recorded | Self::Dropped(_))
    }

    /// Returns true if moving from this state to `next` is allowed
    ///
    /// ```text
    /// Claimed -> Fetched -> Recorded
    ///    |          |
    ///    +----------+----> Dropped(_)
    /// ```
    pub fn can_transition_to(&self, next: UrlState) -> bool {
        match (self, next) {
            (Self::Claimed, Self::Fetched) => true,
            (Self::Fetched, Self::Recorded) => true,
            (Self::Claimed | Self::Fetched, Self::Dropped(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for UrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Claimed => write!(f, "claimed"),
            Self::Fetched => write!(f, "fetched"),
            Self::Recorded => write!(f, "recorded"),
            Self::Dropped(reason) => write!(f, "dropped ({})", reason.as_str()),
        }
    }
}

/// Errors raised by the URL ledger
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("URL {url} cannot move from {from} to {to}")]
    InvalidTransition {
        url: String,
        from: UrlState,
        to: UrlState,
    },

    #[error("URL {0} was never claimed")]
    Unknown(String),
}
