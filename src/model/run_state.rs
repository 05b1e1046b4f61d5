use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Where the top-level state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Menu,
    Countdown,
    AwaitingAnswer,
    Resolving,
    Paused,
    Ended,
}

/// The mutable per-run aggregate. Created fresh on every run start and
/// mutated only by the controller task; health pools live in `CombatState`.
#[derive(Debug, Clone)]
pub struct RunState {
    pub phase: Phase,
    pub score: u32,
    pub consecutive_correct: u32,
    pub questions_presented: u32,
    pub questions_correct: u32,
    pub questions_incorrect: u32,
    /// Incorrect answers plus timeouts, drives taunt pacing.
    pub failure_count: u32,
    /// Seconds left on the active question; -1 marks "timed out this tick".
    pub time_remaining: i32,
    pub started_at: Option<Instant>,
    pub ended_at: Option<Instant>,
    /// True iff the run ended with the boss defeated.
    pub completed: bool,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Menu,
            score: 0,
            consecutive_correct: 0,
            questions_presented: 0,
            questions_correct: 0,
            questions_incorrect: 0,
            failure_count: 0,
            time_remaining: 0,
            started_at: None,
            ended_at: None,
            completed: false,
        }
    }

    /// Whole seconds the run has been going, once both timestamps exist.
    pub fn elapsed_seconds(&self) -> u64 {
        match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) => end.saturating_duration_since(start).as_secs(),
            _ => 0,
        }
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}
