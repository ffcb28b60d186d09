//! Candidate state definitions for tracking per-post progress
//!
//! A candidate moves `Pending → Fetching → Extracting → Analyzing → Recorded`,
//! or ends early in `Skipped` (no content) or `Failed` (any stage raised).

use std::fmt;

/// Represents the current state of a post candidate within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateState {
    // ===== Active States =====
    /// Waiting for its turn
    Pending,

    /// Page is being fetched
    Fetching,

    /// Readable content is being extracted from the page
    Extracting,

    /// Content is with the analysis service
    Analyzing,

    // ===== Terminal States =====
    /// Analysis succeeded and a record was produced
    Recorded,

    /// Page had no extractable content
    Skipped,

    /// A stage raised an error
    Failed,
}

impl CandidateState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Recorded | Self::Skipped | Self::Failed)
    }

    /// Returns true if reaching this state counts against the error budget
    ///
    /// Skipped candidates count the same as failed ones.
    pub fn counts_against_budget(&self) -> bool {
        matches!(self, Self::Skipped | Self::Failed)
    }

    /// Checks whether moving from `self` to `next` follows the lifecycle
    pub fn can_transition_to(&self, next: CandidateState) -> bool {
        use CandidateState::*;

        match (self, next) {
            (Pending, Fetching) => true,
            (Fetching, Extracting) => true,
            (Extracting, Analyzing) | (Extracting, Skipped) => true,
            (Analyzing, Recorded) => true,
            (Fetching | Extracting | Analyzing, Failed) => true,
            _ => false,
        }
    }

    /// Short lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Analyzing => "analyzing",
            Self::Recorded => "recorded",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible candidate states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::Fetching,
            Self::Extracting,
            Self::Analyzing,
            Self::Recorded,
            Self::Skipped,
            Self::Failed,
        ]
    }
}

impl fmt::Display for CandidateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
