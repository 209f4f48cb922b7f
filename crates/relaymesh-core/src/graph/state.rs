//! Per-run execution state

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Graph stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Task received, not yet routed
    Start,
    /// Executor selected
    Routed,
    /// Executor produced output
    Executed,
    /// Terminal
    Done,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Routed => write!(f, "routed"),
            Self::Executed => write!(f, "executed"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// State owned by exactly one orchestration run.
///
/// `history` is append-only.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionState {
    /// Run ID
    pub run_id: Uuid,
    /// Task text
    pub task: String,
    /// Requesting user
    pub user_id: String,
    /// Selected executor (empty until routed)
    pub selected_executor_id: String,
    history: Vec<String>,
    /// Executor output (empty until executed)
    pub final_output: String,
    stage: Stage,
    /// When the run started
    pub started_at: DateTime<Utc>,
}

impl ExecutionState {
    /// Create state for a new run
    #[must_use]
    pub fn new(task: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            task: task.into(),
            user_id: user_id.into(),
            selected_executor_id: String::new(),
            history: Vec::new(),
            final_output: String::new(),
            stage: Stage::Start,
            started_at: Utc::now(),
        }
    }

    /// Current stage
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Ordered event history
    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Start → Routed
    pub(crate) fn mark_routed(&mut self, executor_id: &str) {
        debug_assert_eq!(self.stage, Stage::Start);
        self.selected_executor_id = executor_id.to_string();
        self.history.push(format!("Router selected: {}", executor_id));
        self.stage = Stage::Routed;
    }

    /// Routed → Executed
    pub(crate) fn mark_executed(&mut self, output: String) {
        debug_assert_eq!(self.stage, Stage::Routed);
        self.final_output = output;
        self.history
            .push(format!("Executed: {}", self.selected_executor_id));
        self.stage = Stage::Executed;
    }

    /// Any stage → Done
    pub(crate) fn finish(&mut self) {
        self.stage = Stage::Done;
    }
}
