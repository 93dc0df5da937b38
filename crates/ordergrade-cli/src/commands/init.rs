//! The `ordergrade init` command.

use std::path::Path;

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("ordergrade.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("grading-sets").context("failed to create grading-sets/")?;
    write_if_missing(Path::new("grading-sets/example.toml"), EXAMPLE_GRADING_SET)?;

    println!("\nNext steps:");
    println!("  1. Edit grading-sets/example.toml with your questions and attempts");
    println!("  2. Run: ordergrade validate --grading-set grading-sets/example.toml");
    println!("  3. Run: ordergrade grade --grading-set grading-sets/example.toml --format all");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# ordergrade configuration

# Policy for questions that name none: a policy name or its integer code.
# Run `ordergrade policies` for the full list.
default_policy = "absolute_position"

# Max concurrent gradings.
parallelism = 4

# Where `ordergrade grade` writes JSON reports. ${VAR} references are expanded.
output_dir = "./ordergrade-results"
"#;

const EXAMPLE_GRADING_SET: &str = r#"[grading_set]
id = "example"
name = "Example Grading Set"
description = "A small grading set to get started"
default_policy = "relative_to_correct"

[[questions]]
id = "planets"
name = "Planets by distance"
description = "Order the planets from closest to farthest from the Sun."
items = ["mercury", "venus", "earth", "mars"]
tags = ["astronomy"]

[[questions.attempts]]
id = "student-1"
response = ["mercury", "venus", "earth", "mars"]

[[questions.attempts]]
id = "student-2"
response = ["mercury", "earth", "venus", "mars"]

[[questions]]
id = "water-cycle"
name = "Water cycle"
description = "Order the stages of the water cycle, starting from evaporation."
items = ["evaporation", "condensation", "precipitation", "collection"]
policy = "longest_ordered_subset"
tags = ["science"]

[[questions.attempts]]
id = "student-1"
response = ["condensation", "evaporation", "precipitation", "collection"]
"#;
