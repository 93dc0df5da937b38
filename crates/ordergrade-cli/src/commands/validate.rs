//! The `ordergrade validate` command.

use std::path::PathBuf;

use anyhow::Result;

use ordergrade_core::parser::{load_grading_sets, validate_grading_set};

pub fn execute(grading_set_path: PathBuf) -> Result<()> {
    let sets = load_grading_sets(&grading_set_path)?;
    anyhow::ensure!(
        !sets.is_empty(),
        "no grading sets found at {}",
        grading_set_path.display()
    );

    let mut total_warnings = 0;

    for set in &sets {
        println!(
            "Grading set: {} ({} questions, {} attempts)",
            set.name,
            set.questions.len(),
            set.attempt_count()
        );

        let warnings = validate_grading_set(set);
        for w in &warnings {
            let prefix = match (&w.question_id, &w.attempt_id) {
                (Some(q), Some(a)) => format!("  [{q}/{a}]"),
                (Some(q), None) => format!("  [{q}]"),
                _ => "  ".to_string(),
            };
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All grading sets valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
