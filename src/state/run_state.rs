use crate::state::CandidateState;

/// Counters for a single pipeline run
///
/// Created fresh for every run and discarded when it ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunState {
    /// Failed or skipped candidates since the last recorded one
    pub consecutive_errors: u32,

    /// Candidates that produced a record
    pub analyzed: usize,

    /// Candidates resolved from the sitemap
    pub candidates: usize,

    /// Candidates without extractable content
    pub skipped: usize,

    /// Candidates that failed at some stage
    pub failed: usize,
}

impl RunState {
    /// Creates the state for a run over `candidates` post URLs
    pub fn new(candidates: usize) -> Self {
        Self {
            candidates,
            ..Self::default()
        }
    }

    /// Applies a candidate's terminal state to the counters
    pub fn record_outcome(&mut self, state: CandidateState) {
        match state {
            CandidateState::Recorded => {
                self.analyzed += 1;
                self.consecutive_errors = 0;
            }
            CandidateState::Skipped => {
                self.skipped += 1;
                self.consecutive_errors += 1;
            }
            CandidateState::Failed => {
                self.failed += 1;
                self.consecutive_errors += 1;
            }
            other => tracing::debug!(state = %other, "Ignoring non-terminal state"),
        }
    }

    /// True once `budget` consecutive errors have been seen
    pub fn budget_exhausted(&self, budget: u32) -> bool {
        self.consecutive_errors >= budget
    }

    /// Candidates that reached a terminal state
    pub fn processed(&self) -> usize {
        self.analyzed + self.skipped + self.failed
    }
}
