//! Strategy synthesis
//!
//! Research findings and the task they were gathered for become one call on
//! the default executor. The executor's prompt template still frames the
//! request; this module only builds the task text.

use std::time::Duration;

/// Instruction appended after the findings
pub const STRATEGY_OBJECTIVE: &str = "Synthesize this data into a 3-point actionable strategy. \
Focus on ROI, scalability and marketing impact. Keep it direct and punchy.";

/// A synthesized strategy
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Executor that produced the strategy
    pub executor_id: String,
    /// Provider output
    pub strategy: String,
    /// Wall-clock duration of the provider call
    pub duration: Duration,
}

/// Build the task text for a strategy call.
///
/// Blank findings are dropped; an empty list is stated explicitly so the
/// executor does not invent sources.
#[must_use]
pub fn compose_analysis_task(task: &str, findings: &[String]) -> String {
    let block: Vec<String> = findings
        .iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .map(|f| format!("- {f}"))
        .collect();
    let block = if block.is_empty() {
        "(no research data supplied)".to_string()
    } else {
        block.join("\n")
    };

    format!(
        "{}\n\nRAW RESEARCH DATA:\n{}\n\nOBJECTIVE:\n{}",
        task.trim(),
        block,
        STRATEGY_OBJECTIVE
    )
}
