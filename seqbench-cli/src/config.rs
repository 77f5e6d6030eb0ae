//! Configuration loading from seqbench.toml
//!
//! SeqBench configuration can be specified in a `seqbench.toml` file in the project root.
//! The configuration is automatically discovered by walking up from the current directory.

use seqbench_core::{ContainerKind, DEFAULT_WORKERS, FailurePolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name searched for by [`SeqConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "seqbench.toml";

/// SeqBench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SeqConfig {
    /// Run configuration
    #[serde(default)]
    pub run: RunConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Parameters of a comparison run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Trials per averaging pass
    #[serde(default = "default_cycles")]
    pub cycles: i64,
    /// `[size, low, high]`: element count and random value range `[low, high)`
    #[serde(default)]
    pub size_params: Option<Vec<i64>>,
    /// The two container kinds to compare
    #[serde(default)]
    pub lists: Option<[ContainerKind; 2]>,
    /// Concurrent workers per trial
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// "abort" or "exclude"
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Pin worker `i` to core `i` modulo the available cores
    #[serde(default)]
    pub pin_workers: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            cycles: default_cycles(),
            size_params: None,
            lists: None,
            workers: default_workers(),
            failure_policy: FailurePolicy::default(),
            pin_workers: false,
        }
    }
}

fn default_cycles() -> i64 {
    1
}
fn default_workers() -> usize {
    DEFAULT_WORKERS
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format: "human" or "json"
    #[serde(default = "default_format")]
    pub format: String,
    /// Show a progress spinner while cycles run
    #[serde(default = "default_progress")]
    pub progress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            progress: default_progress(),
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}
fn default_progress() -> bool {
    true
}

impl SeqConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        tracing::warn!("ignoring {}: {}", config_path.display(), e);
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# SeqBench Configuration

[run]
# Trials per averaging pass
cycles = 5
# [size, low, high]: element count and random value range [low, high)
size_params = [1000, 0, 100]
# Containers to compare: copy-on-write, synchronized, unsync, linked
lists = ["copy-on-write", "synchronized"]
# Concurrent workers per trial
workers = 2
# On a failed worker: "abort" the pass, or "exclude" the failed cycle
failure_policy = "abort"
# Pin worker i to core i modulo the available cores (Linux only)
pin_workers = false

[output]
# Output format: human or json
format = "human"
# Progress spinner while cycles run
progress = true
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SeqConfig::default();
        assert_eq!(config.run.cycles, 1);
        assert_eq!(config.run.workers, 2);
        assert!(config.run.size_params.is_none());
        assert!(config.run.lists.is_none());
        assert_eq!(config.run.failure_policy, FailurePolicy::Abort);
        assert_eq!(config.output.format, "human");
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [run]
            cycles = 10
            size_params = [3, 0, 10]
            lists = ["linked", "unsync"]
            failure_policy = "exclude"
        "#;

        let config: SeqConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.run.cycles, 10);
        assert_eq!(config.run.size_params, Some(vec![3, 0, 10]));
        assert_eq!(
            config.run.lists,
            Some([ContainerKind::Linked, ContainerKind::Unsync])
        );
        assert_eq!(config.run.failure_policy, FailurePolicy::Exclude);
        // Defaults should still apply
        assert_eq!(config.run.workers, 2);
        assert!(config.output.progress);
    }

    #[test]
    fn test_malformed_size_params_still_parse() {
        // Arity is checked by the validation gate, not the parser.
        let config: SeqConfig = toml::from_str("[run]\nsize_params = [3, 4]").unwrap();
        assert_eq!(config.run.size_params, Some(vec![3, 4]));
    }

    #[test]
    fn test_unknown_container_rejected() {
        let result: Result<SeqConfig, _> =
            toml::from_str("[run]\nlists = [\"vector\", \"linked\"]");
        assert!(result.is_err());
    }

    #[test]
    fn test_default_toml_parses() {
        let config: SeqConfig = toml::from_str(&SeqConfig::default_toml()).unwrap();
        assert_eq!(config.run.cycles, 5);
        assert_eq!(config.run.size_params, Some(vec![1000, 0, 100]));
    }
}
