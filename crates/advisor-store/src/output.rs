// ABOUTME: Writes run results to disk: the final recommendation report and ranking scores.
// ABOUTME: Output paths are caller-supplied; files are pretty-printed JSON.

use std::path::Path;

use advisor_core::RunReport;

use crate::catalog::StoreError;

/// Persist the final run report (run id, status, recommended course names,
/// timing) as pretty JSON.
pub fn write_report(path: &Path, report: &RunReport) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    tracing::info!(
        path = %path.display(),
        courses = report.recommendations.len(),
        status = %report.status,
        "run report written"
    );
    Ok(())
}

/// Persist per-course ranking scores as a pretty JSON array of
/// `{"course": ..., "score": ...}` objects, already in rank order.
pub fn write_scores(path: &Path, scores: &[(String, f64)]) -> Result<(), StoreError> {
    let rows: Vec<serde_json::Value> = scores
        .iter()
        .map(|(course, score)| serde_json::json!({"course": course, "score": score}))
        .collect();
    let json = serde_json::to_string_pretty(&rows)?;
    std::fs::write(path, json)?;
    tracing::info!(path = %path.display(), courses = rows.len(), "score file written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use advisor_core::RunStatus;
    use chrono::Utc;
    use ulid::Ulid;

    #[test]
    fn report_file_contains_status_and_courses() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("recommendations.json");

        let mut recs = BTreeSet::new();
        recs.insert("Corporate Finance".to_string());
        let report = RunReport::new(Ulid::new(), RunStatus::Done, recs, 2, Utc::now());

        write_report(&path, &report).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["status"], "Done");
        assert_eq!(json["recommendations"][0], "Corporate Finance");
        assert_eq!(json["iterations"], 2);
    }

    #[test]
    fn score_file_preserves_rank_order() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("scores.json");

        let scores = vec![
            ("Corporate Finance".to_string(), 92.0),
            ("Labor Law".to_string(), 75.0),
        ];
        write_scores(&path, &scores).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json[0]["course"], "Corporate Finance");
        assert_eq!(json[0]["score"], 92.0);
        assert_eq!(json[1]["course"], "Labor Law");
    }
}
