//! Core data model types for ordergrade.
//!
//! A grading set bundles ordering questions, each with its correct order and
//! the attempts submitted against it.

use serde::{Deserialize, Serialize};

use crate::error::ResponseError;
use crate::policy::{GradingPolicy, PolicySelector};
use crate::sequence::{ItemId, OrderedResponse};

/// A single ordering question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier for this question.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Description or question text.
    #[serde(default)]
    pub description: String,
    /// Items in their correct order.
    pub items: Vec<ItemId>,
    /// Grading policy for this question; falls back to the set default.
    #[serde(default)]
    pub policy: Option<PolicySelector>,
    /// Tags for filtering questions.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Submitted attempts to grade.
    #[serde(default)]
    pub attempts: Vec<Attempt>,
}

impl Question {
    /// The correct order as a typed response.
    pub fn correct_response(&self) -> Result<OrderedResponse, ResponseError> {
        OrderedResponse::new(self.items.iter().cloned())
    }
}

/// One submitted ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    /// Identifier, unique within its question (e.g. a student id).
    pub id: String,
    /// Items in submitted order, possibly unsanitized.
    pub response: Vec<ItemId>,
}

/// A collection of questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingSet {
    /// Unique identifier for this grading set.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Description of this grading set.
    #[serde(default)]
    pub description: String,
    /// Policy for questions that don't specify one.
    #[serde(default)]
    pub default_policy: Option<PolicySelector>,
    /// The questions in this set.
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl GradingSet {
    /// The selector that applies to `question`, if any is written down.
    pub fn selector_for<'a>(&'a self, question: &'a Question) -> Option<&'a PolicySelector> {
        question.policy.as_ref().or(self.default_policy.as_ref())
    }

    /// Resolve the policy for `question`.
    ///
    /// `fallback` applies when neither the question nor the set names a
    /// policy. A policy that is named but unrecognized resolves to `None`.
    pub fn policy_for(&self, question: &Question, fallback: GradingPolicy) -> Option<GradingPolicy> {
        match self.selector_for(question) {
            Some(selector) => selector.resolve(),
            None => Some(fallback),
        }
    }

    /// Total number of attempts across all questions.
    pub fn attempt_count(&self) -> usize {
        self.questions.iter().map(|q| q.attempts.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(policy: Option<PolicySelector>) -> Question {
        Question {
            id: "q1".into(),
            name: "Question 1".into(),
            description: String::new(),
            items: vec!["A".into(), "B".into(), "C".into()],
            policy,
            tags: vec![],
            attempts: vec![Attempt {
                id: "a1".into(),
                response: vec!["B".into(), "A".into(), "C".into()],
            }],
        }
    }

    fn set(default_policy: Option<PolicySelector>, questions: Vec<Question>) -> GradingSet {
        GradingSet {
            id: "set".into(),
            name: "Set".into(),
            description: String::new(),
            default_policy,
            questions,
        }
    }

    #[test]
    fn question_policy_overrides_default() {
        let q = question(Some(PolicySelector::Code(7)));
        let s = set(Some(PolicySelector::Code(0)), vec![q.clone()]);
        assert_eq!(
            s.policy_for(&q, GradingPolicy::AllOrNothing),
            Some(GradingPolicy::RelativeToCorrect)
        );
    }

    #[test]
    fn set_default_then_fallback() {
        let q = question(None);
        let s = set(Some(PolicySelector::Name("longest_ordered_subset".into())), vec![]);
        assert_eq!(
            s.policy_for(&q, GradingPolicy::AllOrNothing),
            Some(GradingPolicy::LongestOrderedSubset)
        );
        let s = set(None, vec![]);
        assert_eq!(
            s.policy_for(&q, GradingPolicy::AllOrNothing),
            Some(GradingPolicy::AllOrNothing)
        );
    }

    #[test]
    fn unrecognized_selector_resolves_to_none() {
        let q = question(Some(PolicySelector::Code(42)));
        let s = set(None, vec![q.clone()]);
        assert_eq!(s.policy_for(&q, GradingPolicy::AbsolutePosition), None);
    }

    #[test]
    fn correct_response_rejects_duplicates() {
        let mut q = question(None);
        assert_eq!(q.correct_response().unwrap().len(), 3);
        q.items.push("A".into());
        assert!(q.correct_response().is_err());
    }

    #[test]
    fn question_serde_roundtrip() {
        let q = question(Some(PolicySelector::Code(3)));
        let json = serde_json::to_string(&q).unwrap();
        let back: Question = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "q1");
        assert_eq!(back.policy, Some(PolicySelector::Code(3)));
        assert_eq!(back.attempts.len(), 1);
        assert_eq!(set(None, vec![back]).attempt_count(), 1);
    }
}
