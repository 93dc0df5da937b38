//! Aggregate statistics over graded attempts.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::results::AttemptResult;

/// Key used for attempts graded without a recognized policy.
pub const UNRECOGNIZED_POLICY: &str = "unrecognized";

/// Aggregate statistics across all results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Per-question statistics.
    pub per_question: HashMap<String, QuestionStats>,
    /// Per-policy statistics, keyed by policy name.
    pub per_policy: HashMap<String, PolicyStats>,
}

/// Statistics for a single question across its attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionStats {
    pub question_id: String,
    /// Number of graded attempts.
    pub attempts: usize,
    /// Mean of the attempts' grade fractions.
    pub mean_fraction: f64,
    /// Share of attempts whose order was exactly right.
    pub all_correct_rate: f64,
    /// Item count per class label, over all attempts.
    pub class_counts: BTreeMap<String, usize>,
}

/// Statistics for one grading policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyStats {
    pub policy: String,
    pub attempts: usize,
    pub mean_fraction: f64,
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Compute aggregate statistics from all results.
pub fn compute_aggregate_stats(results: &[AttemptResult]) -> AggregateStats {
    let mut by_question: HashMap<&str, Vec<&AttemptResult>> = HashMap::new();
    let mut by_policy: HashMap<String, Vec<&AttemptResult>> = HashMap::new();
    for r in results {
        by_question.entry(r.question_id.as_str()).or_default().push(r);
        let key = r
            .policy
            .map(|p| p.name().to_string())
            .unwrap_or_else(|| UNRECOGNIZED_POLICY.to_string());
        by_policy.entry(key).or_default().push(r);
    }

    let per_question = by_question
        .into_iter()
        .map(|(question_id, group)| {
            let mut class_counts = BTreeMap::new();
            for item in group.iter().flat_map(|r| &r.items) {
                *class_counts
                    .entry(item.score.class.as_str().to_string())
                    .or_insert(0) += 1;
            }
            let stats = QuestionStats {
                question_id: question_id.to_string(),
                attempts: group.len(),
                mean_fraction: mean(group.iter().map(|r| r.summary.fraction)),
                all_correct_rate: mean(
                    group
                        .iter()
                        .map(|r| if r.all_correct { 1.0 } else { 0.0 }),
                ),
                class_counts,
            };
            (question_id.to_string(), stats)
        })
        .collect();

    let per_policy = by_policy
        .into_iter()
        .map(|(policy, group)| {
            let stats = PolicyStats {
                policy: policy.clone(),
                attempts: group.len(),
                mean_fraction: mean(group.iter().map(|r| r.summary.fraction)),
            };
            (policy, stats)
        })
        .collect();

    AggregateStats {
        per_question,
        per_policy,
    }
}
