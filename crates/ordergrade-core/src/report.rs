//! Grade report types with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::results::AttemptResult;
use crate::statistics::AggregateStats;

/// A complete grading report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the grading set.
    pub grading_set: GradingSetSummary,
    /// Individual attempt results, in grading set order.
    pub results: Vec<AttemptResult>,
    /// Aggregate statistics.
    pub aggregate: AggregateStats,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Summary of a grading set (without the full question definitions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingSetSummary {
    pub id: String,
    pub name: String,
    pub question_count: usize,
    pub attempt_count: usize,
}

impl GradeReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::results::GradeSummary;

    fn make_report(results: Vec<AttemptResult>) -> GradeReport {
        GradeReport {
            id: Uuid::nil(),
            created_at: Utc::now(),
            grading_set: GradingSetSummary {
                id: "test".into(),
                name: "Test".into(),
                question_count: 1,
                attempt_count: results.len(),
            },
            results,
            aggregate: AggregateStats::default(),
            duration_ms: 0,
        }
    }

    fn make_result(question_id: &str, attempt_id: &str, score: u32, max: u32) -> AttemptResult {
        let scores = [classify(score, Some(max))];
        AttemptResult {
            question_id: question_id.into(),
            attempt_id: attempt_id.into(),
            policy: None,
            items: vec![],
            all_correct: score == max,
            summary: GradeSummary::from_scores(&scores),
            skipped: vec![],
        }
    }

    #[test]
    fn json_roundtrip() {
        let report = make_report(vec![make_result("q1", "alice", 3, 4)]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        report.save_json(&path).unwrap();
        let loaded: GradeReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(loaded.grading_set.id, "test");
        assert_eq!(loaded.results.len(), 1);
        assert_eq!(loaded.results[0].summary.total_score, 3);
    }

    #[test]
    fn save_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let report = make_report(vec![]);
        assert!(report.save_json(&blocker.join("report.json")).is_err());
    }
}
