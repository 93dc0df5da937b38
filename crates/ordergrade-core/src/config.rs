//! Tool configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::policy::{GradingPolicy, PolicySelector};

/// Top-level ordergrade configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdergradeConfig {
    /// Policy for questions whose grading set names none.
    #[serde(default = "default_policy")]
    pub default_policy: PolicySelector,
    /// Max concurrent attempt gradings.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_policy() -> PolicySelector {
    GradingPolicy::AbsolutePosition.into()
}
fn default_parallelism() -> usize {
    4
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./ordergrade-results")
}

impl Default for OrdergradeConfig {
    fn default() -> Self {
        Self {
            default_policy: default_policy(),
            parallelism: default_parallelism(),
            output_dir: default_output_dir(),
        }
    }
}

impl OrdergradeConfig {
    /// The configured default policy.
    pub fn resolved_policy(&self) -> Result<GradingPolicy> {
        self.default_policy
            .resolve()
            .ok_or_else(|| anyhow::anyhow!("unknown default_policy '{}'", self.default_policy))
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `ordergrade.toml` in the current directory
/// 2. `~/.config/ordergrade/config.toml`
///
/// Environment variable overrides: `ORDERGRADE_POLICY`, `ORDERGRADE_PARALLELISM`.
pub fn load_config() -> Result<OrdergradeConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<OrdergradeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("ordergrade.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => OrdergradeConfig::default(),
    };

    // Apply env var overrides
    if let Ok(policy) = std::env::var("ORDERGRADE_POLICY") {
        config.default_policy = PolicySelector::Name(policy);
    }
    if let Ok(parallelism) = std::env::var("ORDERGRADE_PARALLELISM") {
        config.parallelism = parallelism
            .trim()
            .parse()
            .with_context(|| format!("invalid ORDERGRADE_PARALLELISM: '{parallelism}'"))?;
    }

    config.output_dir = PathBuf::from(resolve_env_vars(&config.output_dir.to_string_lossy()));

    config.resolved_policy()?;
    anyhow::ensure!(config.parallelism >= 1, "parallelism must be at least 1");

    Ok(config)
}

/// Parse a config TOML string.
pub fn parse_config_str(content: &str) -> Result<OrdergradeConfig> {
    Ok(toml::from_str::<OrdergradeConfig>(content)?)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("ordergrade"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_ORDERGRADE_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_ORDERGRADE_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_ORDERGRADE_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_ORDERGRADE_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = OrdergradeConfig::default();
        assert_eq!(config.parallelism, 4);
        assert_eq!(
            config.resolved_policy().unwrap(),
            GradingPolicy::AbsolutePosition
        );
    }

    #[test]
    fn parse_policy_by_name_or_code() {
        let config = parse_config_str("default_policy = \"relative_to_correct\"\nparallelism = 2\n")
            .unwrap();
        assert_eq!(
            config.resolved_policy().unwrap(),
            GradingPolicy::RelativeToCorrect
        );
        assert_eq!(config.parallelism, 2);

        let config = parse_config_str("default_policy = -1\n").unwrap();
        assert_eq!(config.resolved_policy().unwrap(), GradingPolicy::AllOrNothing);
    }

    #[test]
    fn unknown_policy_is_an_error() {
        let config = parse_config_str("default_policy = \"alphabetical\"\n").unwrap();
        assert!(config.resolved_policy().is_err());
    }

    #[test]
    fn explicit_path_must_exist() {
        let err = load_config_from(Some(Path::new("/nonexistent/ordergrade.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ordergrade.toml");
        std::fs::write(&path, "default_policy = 5\noutput_dir = \"out\"\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }
}
