//! The `ordergrade grade` command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use ordergrade_core::config::load_config_from;
use ordergrade_core::engine::{GradingEngine, GradingEngineConfig, ProgressReporter};
use ordergrade_core::parser;
use ordergrade_core::policy::GradingPolicy;
use ordergrade_core::report::GradeReport;
use ordergrade_core::results::AttemptResult;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_attempt_start(&self, question_id: &str, attempt_id: &str) {
        tracing::debug!("grading {question_id} :: {attempt_id}");
    }

    fn on_attempt_complete(&self, result: &AttemptResult) {
        let status = if result.all_correct { "OK" } else { "--" };
        eprintln!(
            "  Done: {} :: {} [{}] {}/{} ({}%)",
            result.question_id,
            result.attempt_id,
            status,
            result.summary.total_score,
            result.summary.total_max_score,
            result.summary.percent,
        );
    }

    fn on_attempt_error(&self, question_id: &str, attempt_id: &str, error: &str) {
        eprintln!("  ERROR: {question_id} :: {attempt_id}: {error}");
    }

    fn on_set_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {completed}/{total} graded, {failed} failed ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    grading_set_path: PathBuf,
    policy: Option<String>,
    parallelism: Option<usize>,
    output: Option<PathBuf>,
    format: String,
    filter: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let parallelism = parallelism.unwrap_or(config.parallelism);
    anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");

    let policy_override = policy
        .as_deref()
        .map(|p| p.parse::<GradingPolicy>().map_err(anyhow::Error::msg))
        .transpose()?;

    let formats: Vec<&str> = if format == "all" {
        vec!["json", "text"]
    } else {
        format.split(',').map(str::trim).collect()
    };
    if let Some(unknown) = formats.iter().find(|f| !matches!(**f, "json" | "text")) {
        anyhow::bail!("unknown output format: '{unknown}' (expected json, text or all)");
    }

    let mut grading_sets = parser::load_grading_sets(&grading_set_path)?;
    anyhow::ensure!(
        !grading_sets.is_empty(),
        "no grading sets found at {}",
        grading_set_path.display()
    );

    if let Some(filter_tags) = &filter {
        let tags: Vec<&str> = filter_tags.split(',').map(|s| s.trim()).collect();
        for set in &mut grading_sets {
            set.questions
                .retain(|q| q.tags.iter().any(|t| tags.contains(&t.as_str())));
        }
    }

    let engine = GradingEngine::new(GradingEngineConfig {
        parallelism,
        default_policy: config.resolved_policy()?,
        policy_override,
    });
    let output = output.unwrap_or(config.output_dir);
    let reporter = ConsoleReporter;

    for grading_set in &grading_sets {
        eprintln!(
            "ordergrade v{}: grading {} attempts across {} questions in '{}'",
            env!("CARGO_PKG_VERSION"),
            grading_set.attempt_count(),
            grading_set.questions.len(),
            grading_set.name
        );
        eprintln!();

        let report = engine.run(grading_set, &reporter).await?;

        print_summary(&report);

        for fmt in &formats {
            match *fmt {
                "json" => {
                    std::fs::create_dir_all(&output)?;
                    let timestamp = report.created_at.format("%Y-%m-%dT%H%M%S");
                    let path = output.join(format!("report-{}-{timestamp}.json", grading_set.id));
                    report.save_json(&path)?;
                    eprintln!("Results saved to: {}", path.display());
                }
                _ => print_text(&report),
            }
        }
    }

    Ok(())
}

fn print_summary(report: &GradeReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Question", "Attempts", "Mean", "All correct", "Classes"]);

    let mut stats: Vec<_> = report.aggregate.per_question.values().collect();
    stats.sort_by(|a, b| a.question_id.cmp(&b.question_id));

    for q in stats {
        let classes = q
            .class_counts
            .iter()
            .map(|(class, n)| format!("{class}={n}"))
            .collect::<Vec<_>>()
            .join(" ");
        table.add_row(vec![
            Cell::new(&q.question_id),
            Cell::new(q.attempts),
            Cell::new(format!("{:.1}%", q.mean_fraction * 100.0)),
            Cell::new(format!("{:.1}%", q.all_correct_rate * 100.0)),
            Cell::new(classes),
        ]);
    }

    eprintln!("\n{table}");
}

fn print_text(report: &GradeReport) {
    for result in &report.results {
        let policy = result
            .policy
            .map(|p| p.name().to_string())
            .unwrap_or_else(|| "unrecognized".to_string());
        println!(
            "{} / {}: {}/{} ({}%) [{}]",
            result.question_id,
            result.attempt_id,
            result.summary.total_score,
            result.summary.total_max_score,
            result.summary.percent,
            policy
        );
        for item in &result.items {
            let max = item
                .score
                .max_score
                .map(|m| m.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:>3} {:<16} {}/{} {}",
                item.position + 1,
                item.item,
                item.score.score,
                max,
                item.score.class
            );
        }
        if !result.skipped.is_empty() {
            let skipped: Vec<&str> = result.skipped.iter().map(|i| i.as_str()).collect();
            println!("  skipped: {}", skipped.join(", "));
        }
    }
}
