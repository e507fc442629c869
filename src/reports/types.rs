use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Average dwell time for one department, in days at day granularity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentDwell {
    pub department_id: String,
    pub department: String,
    pub avg_days: f64,
}

/// One month's completed vs in-progress counts, bucketed by the month a
/// document's workflow was initiated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyThroughput {
    /// Short month label, e.g. "Mar".
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub completed: u32,
    pub in_progress: u32,
}

/// Full report derived from the ledger, scoped to one user's visibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub total_documents: usize,
    /// Documents currently in progress.
    pub active_workflows: usize,
    pub total_rejected: usize,
    /// Completed within the configured trailing window, keyed off the
    /// synthetic completion entry's timestamp.
    pub completed_recently: usize,
    pub processing_times: Vec<DepartmentDwell>,
    /// Department with the highest average dwell time, if any resolved
    /// steps exist. Ties go to the first department encountered.
    pub bottleneck: Option<DepartmentDwell>,
    pub workflow_efficiency: Vec<MonthlyThroughput>,
}

/// Aggregation knobs. `now` is explicit so the aggregator stays a pure
/// function of its inputs.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub trailing_months: u32,
    pub completed_window_days: i64,
    pub now: DateTime<Utc>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            trailing_months: 6,
            completed_window_days: 30,
            now: Utc::now(),
        }
    }
}
