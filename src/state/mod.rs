//! State module for tracking pipeline progress
//!
//! # Components
//!
//! - `CandidateState`: lifecycle of a single post candidate (pending, fetching, ... recorded)
//! - `RunState`: per-run counters backing the consecutive-error budget

mod candidate_state;
mod run_state;

pub use candidate_state::CandidateState;
pub use run_state::RunState;
