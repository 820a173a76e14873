// ABOUTME: RunReport summarizes one pipeline run: status, recommendations, and timing.
// ABOUTME: QuotaUnmet is a reported status with partial results, never an error.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// How a pipeline run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// The minimum recommendation quota was reached.
    Done,
    /// The iteration budget or the catalog ran out before the quota was met.
    /// The partial recommendation set is still returned.
    QuotaUnmet,
}

impl RunStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RunStatus::Done => "done",
            RunStatus::QuotaUnmet => "quota_unmet",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The result of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Ulid,
    pub status: RunStatus,
    pub recommendations: BTreeSet<String>,
    pub iterations: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn new(
        run_id: Ulid,
        status: RunStatus,
        recommendations: BTreeSet<String>,
        iterations: u32,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            run_id,
            status,
            recommendations,
            iterations,
            started_at,
            finished_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels() {
        assert_eq!(RunStatus::Done.label(), "done");
        assert_eq!(RunStatus::QuotaUnmet.to_string(), "quota_unmet");
    }

    #[test]
    fn report_round_trips_through_json() {
        let mut recs = BTreeSet::new();
        recs.insert("Corporate Finance".to_string());

        let report = RunReport::new(Ulid::new(), RunStatus::QuotaUnmet, recs, 3, Utc::now());
        let json = serde_json::to_string(&report).unwrap();
        let back: RunReport = serde_json::from_str(&json).unwrap();

        assert_eq!(back.run_id, report.run_id);
        assert_eq!(back.status, RunStatus::QuotaUnmet);
        assert_eq!(back.iterations, 3);
        assert!(back.recommendations.contains("Corporate Finance"));
    }

    #[test]
    fn finished_at_is_not_before_started_at() {
        let started = Utc::now();
        let report = RunReport::new(Ulid::new(), RunStatus::Done, BTreeSet::new(), 1, started);
        assert!(report.finished_at >= report.started_at);
    }
}
