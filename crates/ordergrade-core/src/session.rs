//! Scoring sessions.
//!
//! A [`ScoringSession`] grades one submitted order against one correct order
//! under one policy. Relation maps are built on first use and item scores are
//! memoized per position, so repeated queries during a render pass are cheap.
//! A session is single-owner and short-lived; it is not `Sync` and holds no
//! state that outlives the evaluation.

use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;

use crate::classify::{classify, ItemScore};
use crate::policy::GradingPolicy;
use crate::relations::{
    build_next_map, build_prev_next_sets, longest_ordered_subset, NextMap, PrevNextMap, Subset,
};
use crate::results::GradeSummary;
use crate::sequence::{ItemId, OrderedResponse, Position};

/// One evaluation of a submitted order.
#[derive(Debug)]
pub struct ScoringSession {
    correct: OrderedResponse,
    current: OrderedResponse,
    policy: Option<GradingPolicy>,
    // The relation caches are built with the flags of `policy`, which never
    // changes for the life of the session.
    next: OnceCell<(NextMap, NextMap)>,
    prev_next: OnceCell<(PrevNextMap, PrevNextMap)>,
    subset: OnceCell<Subset>,
    all_correct: OnceCell<bool>,
    scores: RefCell<HashMap<Position, ItemScore>>,
}

impl ScoringSession {
    /// Create a session. With `policy == None` every item is unscored.
    pub fn new(
        correct: OrderedResponse,
        current: OrderedResponse,
        policy: Option<GradingPolicy>,
    ) -> Self {
        Self {
            correct,
            current,
            policy,
            next: OnceCell::new(),
            prev_next: OnceCell::new(),
            subset: OnceCell::new(),
            all_correct: OnceCell::new(),
            scores: RefCell::new(HashMap::new()),
        }
    }

    /// Create a session from an integer policy selector.
    ///
    /// An unrecognized code does not fail: it is logged and every item is
    /// reported unscored.
    pub fn from_code(correct: OrderedResponse, current: OrderedResponse, code: i64) -> Self {
        let policy = GradingPolicy::from_code(code);
        if policy.is_none() {
            tracing::warn!("unrecognized grading policy code {code}, every item will be unscored");
        }
        Self::new(correct, current, policy)
    }

    pub fn policy(&self) -> Option<GradingPolicy> {
        self.policy
    }

    pub fn correct(&self) -> &OrderedResponse {
        &self.correct
    }

    pub fn current(&self) -> &OrderedResponse {
        &self.current
    }

    /// Score of the item at `position` in the submitted order.
    pub fn score(&self, position: Position) -> ItemScore {
        if let Some(score) = self.scores.borrow().get(&position) {
            return *score;
        }
        let score = self.compute(position);
        self.scores.borrow_mut().insert(position, score);
        score
    }

    /// Whether the submitted order is exactly the correct order.
    pub fn is_all_correct(&self) -> bool {
        *self
            .all_correct
            .get_or_init(|| self.correct == self.current)
    }

    /// Scores for every occupied submitted position, in order.
    pub fn scores(&self) -> Vec<(Position, ItemScore)> {
        self.current
            .iter()
            .map(|(p, _)| (p, self.score(p)))
            .collect()
    }

    /// Totals over every occupied submitted position.
    pub fn summary(&self) -> GradeSummary {
        let scores: Vec<ItemScore> = self.scores().into_iter().map(|(_, s)| s).collect();
        GradeSummary::from_scores(&scores)
    }

    fn compute(&self, position: Position) -> ItemScore {
        let Some(policy) = self.policy else {
            return ItemScore::unscored();
        };
        let Some(answer) = self.current.get(position) else {
            return ItemScore::unscored();
        };
        if position >= self.correct.len() {
            return ItemScore::unscored();
        }

        let (score, max_score) = match policy {
            GradingPolicy::AllOrNothing => (u32::from(self.is_all_correct()), Some(1)),
            GradingPolicy::AbsolutePosition => {
                (u32::from(self.correct.get(position) == Some(answer)), Some(1))
            }
            GradingPolicy::RelativeNextExcludeLast | GradingPolicy::RelativeNextIncludeLast => {
                self.score_next(answer)
            }
            GradingPolicy::RelativeOnePreviousAndNext
            | GradingPolicy::RelativeAllPreviousAndNext => self.score_prev_next(answer),
            GradingPolicy::LongestOrderedSubset | GradingPolicy::LongestContiguousSubset => {
                (u32::from(self.subset().contains(&position)), Some(1))
            }
            GradingPolicy::RelativeToCorrect => self.score_distance(position, answer),
        };
        classify(score, max_score)
    }

    fn score_next(&self, answer: &ItemId) -> (u32, Option<u32>) {
        let (correct, current) = self.next.get_or_init(|| {
            let include_last = self.policy == Some(GradingPolicy::RelativeNextIncludeLast);
            tracing::debug!(include_last, "building next-item maps");
            (
                build_next_map(&self.correct, include_last),
                build_next_map(&self.current, include_last),
            )
        });
        match correct.get(answer) {
            Some(expected) => (u32::from(current.get(answer) == Some(expected)), Some(1)),
            None => (0, None),
        }
    }

    fn score_prev_next(&self, answer: &ItemId) -> (u32, Option<u32>) {
        let (correct, current) = self.prev_next.get_or_init(|| {
            let include_all = self.policy == Some(GradingPolicy::RelativeAllPreviousAndNext);
            tracing::debug!(include_all, "building previous/next sets");
            (
                build_prev_next_sets(&self.correct, include_all),
                build_prev_next_sets(&self.current, include_all),
            )
        });
        let Some(expected) = correct.get(answer) else {
            return (0, None);
        };
        let max_score = expected.prev.len() + expected.next.len();
        let score = current.get(answer).map_or(0, |actual| {
            expected.prev.intersection(&actual.prev).count()
                + expected.next.intersection(&actual.next).count()
        });
        (score as u32, Some(max_score as u32))
    }

    fn subset(&self) -> &Subset {
        self.subset.get_or_init(|| {
            let contiguous = self.policy == Some(GradingPolicy::LongestContiguousSubset);
            tracing::debug!(contiguous, "computing longest ordered subset");
            longest_ordered_subset(&self.correct, &self.current, contiguous)
        })
    }

    fn score_distance(&self, position: Position, answer: &ItemId) -> (u32, Option<u32>) {
        let max_score = self.correct.len().saturating_sub(1);
        match self.correct.position_of(answer) {
            Some(correct_position) => {
                let distance = correct_position.abs_diff(position);
                (max_score.saturating_sub(distance) as u32, Some(max_score as u32))
            }
            None => (0, None),
        }
    }
}
