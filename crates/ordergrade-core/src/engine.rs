//! Batch grading engine.
//!
//! Grades every attempt of every question in a grading set. Each attempt gets
//! its own [`ScoringSession`]; sessions share nothing, so they run
//! concurrently on the blocking pool with bounded parallelism.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::model::{Attempt, GradingSet};
use crate::policy::GradingPolicy;
use crate::report::{GradeReport, GradingSetSummary};
use crate::results::{AttemptResult, ItemResult};
use crate::sequence::OrderedResponse;
use crate::session::ScoringSession;
use crate::statistics::compute_aggregate_stats;

/// Configuration for the grading engine.
#[derive(Debug, Clone)]
pub struct GradingEngineConfig {
    /// Maximum concurrent gradings.
    pub parallelism: usize,
    /// Policy for questions whose grading set names none.
    pub default_policy: GradingPolicy,
    /// Policy forced onto every question, ignoring the grading set.
    pub policy_override: Option<GradingPolicy>,
}

impl Default for GradingEngineConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            default_policy: GradingPolicy::AbsolutePosition,
            policy_override: None,
        }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_attempt_start(&self, question_id: &str, attempt_id: &str);
    fn on_attempt_complete(&self, result: &AttemptResult);
    fn on_attempt_error(&self, question_id: &str, attempt_id: &str, error: &str);
    fn on_set_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_attempt_start(&self, _: &str, _: &str) {}
    fn on_attempt_complete(&self, _: &AttemptResult) {}
    fn on_attempt_error(&self, _: &str, _: &str, _: &str) {}
    fn on_set_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// Grade one attempt against a correct order.
///
/// The submission is sanitized first: ids unknown to the question and
/// repeated ids are skipped in place and reported in [`AttemptResult::skipped`].
/// Every other item is graded at the position it was submitted at.
pub fn grade_attempt(
    question_id: &str,
    correct: &OrderedResponse,
    attempt: &Attempt,
    policy: Option<GradingPolicy>,
) -> AttemptResult {
    let submission = OrderedResponse::from_submission(attempt.response.iter().cloned(), correct);
    let session = ScoringSession::new(correct.clone(), submission.response, policy);

    let items = session
        .scores()
        .into_iter()
        .filter_map(|(position, score)| {
            session.current().get(position).map(|item| ItemResult {
                position,
                item: item.clone(),
                score,
            })
        })
        .collect();

    AttemptResult {
        question_id: question_id.to_string(),
        attempt_id: attempt.id.clone(),
        policy,
        items,
        all_correct: session.is_all_correct(),
        summary: session.summary(),
        skipped: submission.skipped,
    }
}

/// The batch grading engine.
pub struct GradingEngine {
    config: GradingEngineConfig,
}

impl GradingEngine {
    pub fn new(config: GradingEngineConfig) -> Self {
        Self { config }
    }

    /// Grade every attempt in a grading set.
    pub async fn run(
        &self,
        grading_set: &GradingSet,
        progress: &dyn ProgressReporter,
    ) -> Result<GradeReport> {
        let start = Instant::now();
        let run_id = Uuid::new_v4();
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism.max(1)));

        let mut futures = FuturesUnordered::new();
        let mut failed = 0usize;
        let mut total = 0usize;

        for (question_index, question) in grading_set.questions.iter().enumerate() {
            let correct = match question.correct_response() {
                Ok(correct) => Arc::new(correct),
                Err(e) => {
                    tracing::error!("question {} has an invalid correct order: {e}", question.id);
                    for attempt in &question.attempts {
                        progress.on_attempt_error(&question.id, &attempt.id, &e.to_string());
                    }
                    total += question.attempts.len();
                    failed += question.attempts.len();
                    continue;
                }
            };

            let policy = match self.config.policy_override {
                Some(policy) => Some(policy),
                None => grading_set.policy_for(question, self.config.default_policy),
            };
            if policy.is_none() {
                tracing::warn!(
                    "question {} has an unrecognized grading policy, every item will be unscored",
                    question.id
                );
            }

            for (attempt_index, attempt) in question.attempts.iter().enumerate() {
                let semaphore = Arc::clone(&semaphore);
                let correct = Arc::clone(&correct);
                let question_id = question.id.clone();
                let attempt = attempt.clone();
                total += 1;

                futures.push(async move {
                    let ctx_question_id = question_id.clone();
                    let ctx_attempt_id = attempt.id.clone();
                    let inner = async move {
                        let _permit = semaphore
                            .acquire_owned()
                            .await
                            .map_err(|_| anyhow::anyhow!("semaphore closed"))?;
                        progress.on_attempt_start(&question_id, &attempt.id);
                        let result = tokio::task::spawn_blocking(move || {
                            grade_attempt(&question_id, &correct, &attempt, policy)
                        })
                        .await?;
                        Ok::<_, anyhow::Error>(result)
                    };
                    (
                        (question_index, attempt_index),
                        ctx_question_id,
                        ctx_attempt_id,
                        inner.await,
                    )
                });
            }
        }

        let mut graded = Vec::new();
        let mut completed = 0usize;

        while let Some((order, question_id, attempt_id, result)) = futures.next().await {
            match result {
                Ok(attempt_result) => {
                    progress.on_attempt_complete(&attempt_result);
                    graded.push((order, attempt_result));
                    completed += 1;
                }
                Err(e) => {
                    tracing::error!("grading failed for {question_id}/{attempt_id}: {e:#}");
                    progress.on_attempt_error(&question_id, &attempt_id, &e.to_string());
                    failed += 1;
                }
            }
        }

        let elapsed = start.elapsed();
        progress.on_set_complete(total, completed, failed, elapsed);

        graded.sort_by_key(|(order, _)| *order);
        let results: Vec<AttemptResult> = graded.into_iter().map(|(_, r)| r).collect();
        let aggregate = compute_aggregate_stats(&results);

        Ok(GradeReport {
            id: run_id,
            created_at: chrono::Utc::now(),
            grading_set: GradingSetSummary {
                id: grading_set.id.clone(),
                name: grading_set.name.clone(),
                question_count: grading_set.questions.len(),
                attempt_count: grading_set.attempt_count(),
            },
            results,
            aggregate,
            duration_ms: elapsed.as_millis() as u64,
        })
    }
}
