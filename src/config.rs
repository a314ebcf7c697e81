use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::bench::DEFAULT_SIZES;
use crate::grading::DEFAULT_THRESHOLD;
use crate::record::GradePolicy;

/// Environment variable naming the JSON config file.
pub const CONFIG_ENV: &str = "GRADER_CONFIG";

/// Run defaults, overridable from the command line.
///
/// Stored as a JSON object on disk; every key is optional:
/// ```json
/// {
///   "threshold": 5.0,
///   "policy": "median",
///   "homework_count": 15,
///   "bench_sizes": [1000, 10000],
///   "seed": 42
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraderConfig {
    pub threshold: f64,
    pub policy: GradePolicy,
    pub homework_count: usize,
    pub bench_sizes: Vec<usize>,
    pub seed: Option<u64>,
}

impl Default for GraderConfig {
    fn default() -> Self {
        GraderConfig {
            threshold: DEFAULT_THRESHOLD,
            policy: GradePolicy::Average,
            homework_count: 15,
            bench_sizes: DEFAULT_SIZES.to_vec(),
            seed: None,
        }
    }
}

impl GraderConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: GraderConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        debug!(path = %path.display(), ?config, "Loaded config");
        Ok(config)
    }

    /// Loads from `explicit` if given, else from `$GRADER_CONFIG`, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let file = write_config(r#"{ "policy": "median", "seed": 42 }"#);
        let config = GraderConfig::load(file.path()).unwrap();

        assert_eq!(config.policy, GradePolicy::Median);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.threshold, 5.0);
        assert_eq!(config.homework_count, 15);
        assert_eq!(config.bench_sizes, [1_000, 10_000, 100_000]);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let file = write_config(r#"{ "treshold": 4.0 }"#);
        assert!(GraderConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_explicit_path_wins() {
        let file = write_config(r#"{ "threshold": 6.5 }"#);
        let config = GraderConfig::resolve(Some(file.path())).unwrap();
        assert_eq!(config.threshold, 6.5);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(GraderConfig::load("no/such/config.json").is_err());
    }
}
