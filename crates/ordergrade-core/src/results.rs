//! Grading result types.

use serde::{Deserialize, Serialize};

use crate::classify::{percent_of, ClassLabel, ItemScore};
use crate::policy::GradingPolicy;
use crate::sequence::{ItemId, Position};

/// The graded outcome of one attempt at one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptResult {
    /// Question this attempt answers.
    pub question_id: String,
    /// Attempt identifier (unique within the question).
    pub attempt_id: String,
    /// Policy the attempt was graded with; `None` if it was unrecognized.
    pub policy: Option<GradingPolicy>,
    /// Per-item scores in submitted order.
    pub items: Vec<ItemResult>,
    /// Whether the submitted order equals the correct order.
    pub all_correct: bool,
    /// Totals over the item scores.
    pub summary: GradeSummary,
    /// Submitted ids dropped before grading.
    #[serde(default)]
    pub skipped: Vec<ItemId>,
}

/// Score of one submitted item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResult {
    pub position: Position,
    pub item: ItemId,
    pub score: ItemScore,
}

/// Aggregate of the item scores of one attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GradeSummary {
    /// Items classed correct.
    pub num_right: usize,
    /// Items in any partial class.
    pub num_partial: usize,
    /// Items classed incorrect.
    pub num_incorrect: usize,
    /// Items that were not graded.
    pub num_unscored: usize,
    /// Sum of scores over graded items.
    pub total_score: u32,
    /// Sum of max scores over graded items.
    pub total_max_score: u32,
    /// `total_score / total_max_score`, 0 when nothing was graded.
    pub fraction: f64,
    /// `fraction` as a rounded percentage.
    pub percent: u32,
}

impl GradeSummary {
    /// Sum up a set of item scores.
    pub fn from_scores<'a>(scores: impl IntoIterator<Item = &'a ItemScore>) -> Self {
        let mut summary = GradeSummary::default();
        for score in scores {
            match score.class {
                ClassLabel::Correct => summary.num_right += 1,
                ClassLabel::Incorrect => summary.num_incorrect += 1,
                ClassLabel::Unscored => summary.num_unscored += 1,
                ClassLabel::Partial66 | ClassLabel::Partial33 | ClassLabel::Partial00 => {
                    summary.num_partial += 1
                }
            }
            if let Some(max) = score.max_score {
                summary.total_score += score.score;
                summary.total_max_score += max;
            }
        }
        if summary.total_max_score > 0 {
            summary.fraction = f64::from(summary.total_score) / f64::from(summary.total_max_score);
            summary.percent = percent_of(summary.fraction);
        }
        summary
    }

    /// Number of items in the summary.
    pub fn item_count(&self) -> usize {
        self.num_right + self.num_partial + self.num_incorrect + self.num_unscored
    }
}
