use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "aerate.config.json";

/// Aerate configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Doxygen's XML output directory (its `XML_OUTPUT` option)
    #[serde(default = "default_doxygen_root")]
    pub doxygen_root: String,

    /// Member kinds to render
    #[serde(default = "default_kinds")]
    pub kinds: Vec<String>,

    /// Write rendered output here instead of stdout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_file: Option<String>,
}

fn default_doxygen_root() -> String {
    "xml".to_string()
}

fn default_kinds() -> Vec<String> {
    ["function", "typedef", "define"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!(path = %config_path.display(), "Loaded config");
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get absolute path to the Doxygen XML directory
    pub fn get_doxygen_root(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.doxygen_root)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            doxygen_root: default_doxygen_root(),
            kinds: default_kinds(),
            out_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "doxygenRoot": "build/doxygen/xml",
            "kinds": ["function", "variable"],
            "outFile": "api.rst"
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.doxygen_root, "build/doxygen/xml");
        assert_eq!(config.kinds, vec!["function", "variable"]);
        assert_eq!(config.out_file, Some("api.rst".to_string()));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{ "kinds": ["define"] }"#).unwrap();
        assert_eq!(config.doxygen_root, "xml");
        assert_eq!(config.kinds, vec!["define"]);
        assert_eq!(config.out_file, None);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.doxygen_root, "xml");
        assert_eq!(config.kinds, vec!["function", "typedef", "define"]);
        assert!(config.out_file.is_none());
    }

    #[test]
    fn test_missing_config_file() {
        let config = Config::load("/nonexistent/aerate/project").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(
            config.get_doxygen_root("/project"),
            PathBuf::from("/project/xml")
        );
    }
}
