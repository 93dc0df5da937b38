//! TOML grading set parser.
//!
//! Loads grading sets from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Attempt, GradingSet, Question};
use crate::policy::PolicySelector;
use crate::sequence::ItemId;

/// Intermediate TOML structure for parsing grading set files.
#[derive(Debug, Deserialize)]
struct TomlGradingFile {
    grading_set: TomlGradingSetHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlGradingSetHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    default_policy: Option<PolicySelector>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    items: Vec<String>,
    #[serde(default)]
    policy: Option<PolicySelector>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    attempts: Vec<TomlAttempt>,
}

#[derive(Debug, Deserialize)]
struct TomlAttempt {
    id: String,
    response: Vec<String>,
}

/// Parse a single TOML file into a `GradingSet`.
pub fn parse_grading_set(path: &Path) -> Result<GradingSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read grading set file: {}", path.display()))?;

    parse_grading_set_str(&content, path)
}

/// Parse a TOML string into a `GradingSet` (useful for testing).
pub fn parse_grading_set_str(content: &str, source_path: &Path) -> Result<GradingSet> {
    let parsed: TomlGradingFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| Question {
            id: q.id,
            name: q.name,
            description: q.description,
            items: q.items.into_iter().map(ItemId::from).collect(),
            policy: q.policy,
            tags: q.tags,
            attempts: q
                .attempts
                .into_iter()
                .map(|a| Attempt {
                    id: a.id,
                    response: a.response.into_iter().map(ItemId::from).collect(),
                })
                .collect(),
        })
        .collect();

    Ok(GradingSet {
        id: parsed.grading_set.id,
        name: parsed.grading_set.name,
        description: parsed.grading_set.description,
        default_policy: parsed.grading_set.default_policy,
        questions,
    })
}

/// Recursively load all `.toml` grading set files from a directory.
pub fn load_grading_directory(dir: &Path) -> Result<Vec<GradingSet>> {
    let mut sets = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            sets.extend(load_grading_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_grading_set(&path) {
                Ok(set) => sets.push(set),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(sets)
}

/// Load a grading set file, or every grading set under a directory.
pub fn load_grading_sets(path: &Path) -> Result<Vec<GradingSet>> {
    if path.is_dir() {
        load_grading_directory(path)
    } else {
        Ok(vec![parse_grading_set(path)?])
    }
}

/// A warning from grading set validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// The attempt ID (if applicable).
    pub attempt_id: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn question(question: &Question, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(question.id.clone()),
            attempt_id: None,
            message: message.into(),
        }
    }

    fn attempt(question: &Question, attempt: &Attempt, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(question.id.clone()),
            attempt_id: Some(attempt.id.clone()),
            message: message.into(),
        }
    }
}

/// Validate a grading set for common issues.
pub fn validate_grading_set(set: &GradingSet) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if let Some(selector) = &set.default_policy {
        if selector.resolve().is_none() {
            warnings.push(ValidationWarning {
                question_id: None,
                attempt_id: None,
                message: format!("unrecognized default grading policy '{selector}'"),
            });
        }
    }

    // Check for duplicate question IDs
    let mut seen_ids = HashSet::new();
    for question in &set.questions {
        if !seen_ids.insert(&question.id) {
            warnings.push(ValidationWarning::question(
                question,
                format!("duplicate question ID: {}", question.id),
            ));
        }
    }

    for question in &set.questions {
        warnings.extend(validate_question(question));
    }

    warnings
}

fn validate_question(question: &Question) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if question.items.len() < 2 {
        warnings.push(ValidationWarning::question(
            question,
            format!("question has {} item(s); ordering needs at least 2", question.items.len()),
        ));
    }

    if let Err(e) = question.correct_response() {
        warnings.push(ValidationWarning::question(
            question,
            format!("correct order is invalid: {e}"),
        ));
    }

    if let Some(selector) = &question.policy {
        if selector.resolve().is_none() {
            warnings.push(ValidationWarning::question(
                question,
                format!("unrecognized grading policy '{selector}'; every item will be unscored"),
            ));
        }
    }

    if question.attempts.is_empty() {
        warnings.push(ValidationWarning::question(question, "question has no attempts"));
    }

    let known: HashSet<&ItemId> = question.items.iter().collect();
    let mut seen_attempts = HashSet::new();
    for attempt in &question.attempts {
        if !seen_attempts.insert(&attempt.id) {
            warnings.push(ValidationWarning::attempt(
                question,
                attempt,
                format!("duplicate attempt ID: {}", attempt.id),
            ));
        }

        let mut seen_items = HashSet::new();
        for item in &attempt.response {
            if !known.contains(item) {
                warnings.push(ValidationWarning::attempt(
                    question,
                    attempt,
                    format!("unknown item '{item}' will be skipped"),
                ));
            } else if !seen_items.insert(item) {
                warnings.push(ValidationWarning::attempt(
                    question,
                    attempt,
                    format!("repeated item '{item}' will be skipped"),
                ));
            }
        }

        let missing = known.len().saturating_sub(seen_items.len());
        if missing > 0 {
            warnings.push(ValidationWarning::attempt(
                question,
                attempt,
                format!("response is missing {missing} item(s)"),
            ));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::GradingPolicy;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[grading_set]
id = "test-set"
name = "Test Set"
description = "A test grading set"
default_policy = "absolute_position"

[[questions]]
id = "mitosis"
name = "Phases of mitosis"
items = ["prophase", "metaphase", "anaphase", "telophase"]
policy = "relative_to_correct"
tags = ["biology"]

[[questions.attempts]]
id = "alice"
response = ["prophase", "metaphase", "anaphase", "telophase"]

[[questions.attempts]]
id = "bob"
response = ["prophase", "anaphase", "metaphase", "telophase"]

[[questions]]
id = "counting"
name = "Counting"
items = ["one", "two", "three"]
policy = 6

[[questions.attempts]]
id = "carol"
response = ["two", "three", "one"]
"#;

    #[test]
    fn parse_valid_toml() {
        let set = parse_grading_set_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(set.id, "test-set");
        assert_eq!(set.name, "Test Set");
        assert_eq!(set.questions.len(), 2);
        assert_eq!(set.questions[0].items.len(), 4);
        assert_eq!(set.questions[0].attempts.len(), 2);
        assert_eq!(set.attempt_count(), 3);
        assert_eq!(
            set.policy_for(&set.questions[0], GradingPolicy::AllOrNothing),
            Some(GradingPolicy::RelativeToCorrect)
        );
        assert_eq!(
            set.policy_for(&set.questions[1], GradingPolicy::AllOrNothing),
            Some(GradingPolicy::LongestContiguousSubset)
        );
        assert!(validate_grading_set(&set).is_empty());
    }

    #[test]
    fn parse_missing_optional_fields() {
        let toml = r#"
[grading_set]
id = "minimal"
name = "Minimal"

[[questions]]
id = "q1"
name = "Question 1"
items = ["a", "b"]
"#;
        let set = parse_grading_set_str(toml, &PathBuf::from("test.toml")).unwrap();
        assert!(set.default_policy.is_none());
        assert!(set.questions[0].policy.is_none());
        assert!(set.questions[0].tags.is_empty());
        assert!(set.questions[0].attempts.is_empty());
    }

    #[test]
    fn validate_duplicate_ids() {
        let toml = r#"
[grading_set]
id = "dupes"
name = "Dupes"

[[questions]]
id = "same"
name = "First"
items = ["a", "b"]

[[questions.attempts]]
id = "x"
response = ["a", "b"]

[[questions.attempts]]
id = "x"
response = ["b", "a"]

[[questions]]
id = "same"
name = "Second"
items = ["c", "d"]
"#;
        let set = parse_grading_set_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_grading_set(&set);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("duplicate question ID")));
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("duplicate attempt ID")));
    }

    #[test]
    fn validate_bad_questions() {
        let toml = r#"
[grading_set]
id = "bad"
name = "Bad"
default_policy = "shuffled"

[[questions]]
id = "tiny"
name = "Tiny"
items = ["a"]
policy = 99

[[questions.attempts]]
id = "x"
response = ["a"]

[[questions]]
id = "dup-items"
name = "Duplicate items"
items = ["a", "b", "a"]

[[questions.attempts]]
id = "y"
response = ["a", "b"]
"#;
        let set = parse_grading_set_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_grading_set(&set);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("unrecognized default grading policy 'shuffled'")));
        assert!(warnings.iter().any(|w| w.message.contains("at least 2")));
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("unrecognized grading policy '99'")));
        assert!(warnings
            .iter()
            .any(|w| w.question_id.as_deref() == Some("dup-items")
                && w.message.contains("correct order is invalid")));
    }

    #[test]
    fn validate_attempt_contents() {
        let toml = r#"
[grading_set]
id = "attempts"
name = "Attempts"

[[questions]]
id = "q"
name = "Q"
items = ["a", "b", "c"]

[[questions.attempts]]
id = "messy"
response = ["a", "z", "a"]
"#;
        let set = parse_grading_set_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_grading_set(&set);
        let messages: Vec<&str> = warnings.iter().map(|w| w.message.as_str()).collect();
        assert!(messages.iter().any(|m| m.contains("unknown item 'z'")));
        assert!(messages.iter().any(|m| m.contains("repeated item 'a'")));
        assert!(messages.iter().any(|m| m.contains("missing 2 item(s)")));
        assert!(warnings
            .iter()
            .all(|w| w.attempt_id.as_deref() == Some("messy")));
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        let result = parse_grading_set_str(bad, &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("test.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not = [valid").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let sets = load_grading_directory(dir.path()).unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].id, "test-set");

        let sets = load_grading_sets(&dir.path().join("test.toml")).unwrap();
        assert_eq!(sets.len(), 1);
    }
}
