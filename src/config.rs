//! Configuration management for the linter
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (openapi-lint.toml)
//! - Environment variables (OPENAPI_LINT__*)
//!
//! ## Example config file (openapi-lint.toml):
//! ```toml
//! [rules]
//! disabled = ["MISSING_TAGS", "SINGLE_VALUE_ENUM"]
//! min_severity = "warning"
//! check_nullable_required_parameters = false
//! extra_reserved_words = ["Builder"]
//!
//! [output]
//! format = "text"
//! json_style = "pretty"
//!
//! [discovery]
//! extensions = ["json", "yaml", "yml"]
//! ignore_paths = ["node_modules/"]
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::diagnostics::{Issue, IssueCode, Severity};
use crate::error::Result;

/// Main configuration for the linter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LintConfig {
    /// Rule selection
    #[serde(default)]
    pub rules: RuleConfig,

    /// Output settings (CLI only)
    #[serde(default)]
    pub output: OutputConfig,

    /// Which files `check` picks up inside directories
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

/// Rule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Issue codes that are dropped from results
    #[serde(default)]
    pub disabled: Vec<String>,

    /// Issues below this severity are dropped
    #[serde(default = "default_min_severity")]
    pub min_severity: Severity,

    /// Flag parameters that are both required and nullable
    #[serde(default)]
    pub check_nullable_required_parameters: bool,

    /// Extra words treated as reserved schema names
    #[serde(default)]
    pub extra_reserved_words: Vec<String>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default)]
    pub json_style: JsonStyle,
}

/// How the CLI prints issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// JSON layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum JsonStyle {
    #[default]
    Pretty,
    Compact,
}

/// Discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// File extensions considered OpenAPI documents
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Path fragments skipped while walking directories
    #[serde(default)]
    pub ignore_paths: Vec<String>,
}

// Default value functions
fn default_min_severity() -> Severity {
    Severity::Info
}

fn default_extensions() -> Vec<String> {
    vec!["json".to_string(), "yaml".to_string(), "yml".to_string()]
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            disabled: Vec::new(),
            min_severity: default_min_severity(),
            check_nullable_required_parameters: false,
            extra_reserved_words: Vec::new(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            json_style: JsonStyle::Pretty,
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            ignore_paths: Vec::new(),
        }
    }
}

impl RuleConfig {
    /// Parse the disabled list, rejecting unknown codes
    pub fn disabled_codes(&self) -> Result<Vec<IssueCode>> {
        self.disabled.iter().map(|c| c.trim().parse()).collect()
    }

    /// Should this issue survive filtering?
    pub fn keeps(&self, issue: &Issue) -> bool {
        issue.severity >= self.min_severity
            && !self.disabled.iter().any(|c| c.trim() == issue.code.as_str())
    }
}

impl DiscoveryConfig {
    /// Does `path` look like a document we should analyze?
    pub fn matches(&self, path: &std::path::Path) -> bool {
        let display = path.to_string_lossy().replace('\\', "/");
        if self.ignore_paths.iter().any(|p| display.contains(p.as_str())) {
            return false;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

impl LintConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = [
            "openapi-lint.toml",
            ".openapi-lint.toml",
            "config/openapi-lint.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "openapi-lint") {
            let xdg_config = config_dir.config_dir().join("openapi-lint.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // OPENAPI_LINT__RULES__MIN_SEVERITY=warning
        builder = builder.add_source(
            Environment::with_prefix("OPENAPI_LINT")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("rules.disabled")
                .with_list_parse_key("rules.extra_reserved_words")
                .with_list_parse_key("discovery.extensions")
                .with_list_parse_key("discovery.ignore_paths"),
        );

        let config: LintConfig = builder.build()?.try_deserialize()?;
        config.rules.disabled_codes()?;
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_default_config() {
        let config = LintConfig::default();
        assert_eq!(config.rules.min_severity, Severity::Info);
        assert!(!config.rules.check_nullable_required_parameters);
        assert_eq!(config.discovery.extensions.len(), 3);
    }

    #[test]
    fn test_serialize_config() {
        let config = LintConfig::default();
        let toml_str = config.to_toml().unwrap();
        assert!(toml_str.contains("[rules]"));
        assert!(toml_str.contains("[discovery]"));
    }

    #[test]
    fn test_filtering() {
        let rules = RuleConfig {
            disabled: vec!["MISSING_TAGS".to_string()],
            min_severity: Severity::Warning,
            ..Default::default()
        };
        assert!(!rules.keeps(&Issue::new(IssueCode::MissingTags, "", "#")));
        assert!(!rules.keeps(&Issue::new(IssueCode::SingleValueEnum, "", "#")));
        assert!(rules.keeps(&Issue::new(IssueCode::MissingServers, "", "#")));
    }

    #[test]
    fn test_unknown_disabled_code() {
        let rules = RuleConfig {
            disabled: vec!["NOPE".to_string()],
            ..Default::default()
        };
        assert!(rules.disabled_codes().is_err());
    }

    #[test]
    fn test_discovery_matches() {
        let discovery = DiscoveryConfig {
            ignore_paths: vec!["vendor/".to_string()],
            ..Default::default()
        };
        assert!(discovery.matches(Path::new("specs/petstore.YAML")));
        assert!(!discovery.matches(Path::new("specs/README.md")));
        assert!(!discovery.matches(Path::new("vendor/api.json")));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lint.toml");
        std::fs::write(
            &path,
            "[rules]\ndisabled = [\"MISSING_SERVERS\"]\nmin_severity = \"warning\"\n",
        )
        .unwrap();
        let config = LintConfig::load_from(path.to_str()).unwrap();
        assert_eq!(config.rules.disabled, vec!["MISSING_SERVERS"]);
        assert_eq!(config.rules.min_severity, Severity::Warning);
    }
}
