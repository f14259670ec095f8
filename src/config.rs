//! Serializable configuration for support bundle runs

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Bundle run configuration
///
/// Holds the plain-data part of a run: worker count, target nodes and an
/// optional archive location. Runtime collaborators (archive, progress
/// channel, log output) are attached through [`Options`](crate::Options).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleConfig {
    /// Number of concurrent collector workers (default: 1, 0 is treated as 1)
    #[serde(default = "default_num_workers")]
    pub num_workers: usize,

    /// Nodes to collect node-scoped data from
    #[serde(default)]
    pub nodes: Vec<String>,

    /// Path of the zip archive to write (None = caller supplies the archive)
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            num_workers: default_num_workers(),
            nodes: Vec::new(),
            output: None,
        }
    }
}

impl BundleConfig {
    /// Parse a configuration from JSON, applying defaults for missing fields.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    /// Check node names are non-empty and unique.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.nodes.len());

        for node in &self.nodes {
            if node.trim().is_empty() {
                return Err(Error::Config {
                    message: "node name must not be empty".to_string(),
                    key: Some("nodes".to_string()),
                });
            }

            if !seen.insert(node.as_str()) {
                return Err(Error::Config {
                    message: format!("node {node} is listed more than once"),
                    key: Some("nodes".to_string()),
                });
            }
        }

        Ok(())
    }
}

fn default_num_workers() -> usize {
    1
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_uses_defaults() {
        let config = BundleConfig::from_json("{}").unwrap();

        assert_eq!(config, BundleConfig::default());
        assert_eq!(config.num_workers, 1);
        assert!(config.nodes.is_empty());
        assert!(config.output.is_none());
    }

    #[test]
    fn explicit_fields_are_parsed() {
        let config = BundleConfig::from_json(
            r#"{"num_workers": 8, "nodes": ["10.5.0.2", "10.5.0.3"], "output": "support.zip"}"#,
        )
        .unwrap();

        assert_eq!(config.num_workers, 8);
        assert_eq!(config.nodes, vec!["10.5.0.2", "10.5.0.3"]);
        assert_eq!(config.output, Some(PathBuf::from("support.zip")));
    }

    #[test]
    fn negative_worker_count_is_rejected_by_parser() {
        let result = BundleConfig::from_json(r#"{"num_workers": -1}"#);
        assert!(matches!(result, Err(Error::Serialization(_))));
    }

    #[test]
    fn duplicate_nodes_are_rejected() {
        let config = BundleConfig {
            nodes: vec!["n1".into(), "n1".into()],
            ..Default::default()
        };

        match config.validate() {
            Err(Error::Config { key, .. }) => assert_eq!(key.as_deref(), Some("nodes")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn blank_node_is_rejected() {
        let config = BundleConfig {
            nodes: vec![" ".into()],
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn config_survives_json_round_trip() {
        let original = BundleConfig {
            num_workers: 4,
            nodes: vec!["n1".into()],
            output: Some(PathBuf::from("out.zip")),
        };

        let json = serde_json::to_string(&original).expect("config must serialize");
        let restored = BundleConfig::from_json(&json).expect("config must deserialize");

        assert_eq!(restored, original);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.json");
        std::fs::write(&path, r#"{"nodes": ["n1"]}"#).unwrap();

        let config = BundleConfig::load(&path).unwrap();
        assert_eq!(config.nodes, vec!["n1"]);
    }
}
