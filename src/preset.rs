//! Category rule presets loaded from a YAML file.
//!
//! The schema maps category names to a `deny_unexpected` policy flag and
//! an ordered rule list. `deny_unexpected` is required on every category;
//! loading fails fast on a category that omits it or is not a mapping.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{CheckError, Result};

/// What a rule pattern selects: files (the default) or directories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    #[default]
    File,
    Dir,
}

/// A single structure validation rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub pattern: String,
    /// Whether the pattern selects files or directories
    #[serde(rename = "type", default)]
    pub kind: RuleKind,
    /// Minimum match count; 0 means no lower bound
    #[serde(default)]
    pub min: u32,
    /// Maximum match count; 0 means no upper bound
    #[serde(default)]
    pub max: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Treat the pattern as a regex instead of a glob
    #[serde(default)]
    pub regex: bool,
}

/// Rules and policy for one category
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRules {
    pub deny_unexpected: bool,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// The entire preset configuration, keyed by category name
#[derive(Debug, Clone, Deserialize)]
pub struct Presets {
    #[serde(default)]
    pub schema_version: u32,
    pub rules: HashMap<String, CategoryRules>,
}

impl Presets {
    /// Look up the rules for a category. `None` is a distinct outcome
    /// from a present category with an empty rule list.
    pub fn category(&self, name: &str) -> Option<&CategoryRules> {
        self.rules.get(name)
    }
}

/// Parse preset YAML, validating required fields before deserializing
pub fn parse_presets(data: &str) -> Result<Presets> {
    let raw: serde_yaml::Value = serde_yaml::from_str(data)
        .map_err(|e| CheckError::Config(format!("failed to parse preset file: {}", e)))?;

    if let Some(categories) = raw.get("rules").and_then(serde_yaml::Value::as_mapping) {
        let deny_key = serde_yaml::Value::from("deny_unexpected");
        for (key, value) in categories {
            let category = key.as_str().unwrap_or("<non-string>");
            match value.as_mapping() {
                None => {
                    return Err(CheckError::Config(format!(
                        "category {:?} has invalid format: expected map with 'deny_unexpected' and 'rules'",
                        category
                    )))
                }
                Some(map) if !map.contains_key(&deny_key) => {
                    return Err(CheckError::Config(format!(
                        "category {:?} is missing required field 'deny_unexpected'",
                        category
                    )))
                }
                Some(_) => {}
            }
        }
    }

    serde_yaml::from_str(data)
        .map_err(|e| CheckError::Config(format!("failed to parse preset file: {}", e)))
}

/// Load presets from an explicit path, or search the default locations
pub fn load_presets(preset_path: Option<&Path>) -> Result<Presets> {
    let path = match preset_path {
        Some(p) => p.to_path_buf(),
        None => find_default_presets().ok_or_else(|| {
            CheckError::Config("preset file not found in default locations".to_string())
        })?,
    };

    let data = std::fs::read_to_string(&path).map_err(|e| {
        CheckError::Config(format!("failed to read preset file {}: {}", path.display(), e))
    })?;
    parse_presets(&data)
}

fn find_default_presets() -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(home) = std::env::var_os("HOME") {
        candidates.push(
            PathBuf::from(home)
                .join(".config")
                .join("relcheck")
                .join("presets.yaml"),
        );
    }
    candidates.push(PathBuf::from("docs/presets.yaml"));
    candidates.push(PathBuf::from("presets.yaml"));

    candidates.into_iter().find(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
schema_version: 1
rules:
  movie:
    deny_unexpected: true
    rules:
      - pattern: "*.nfo"
        min: 1
        max: 1
      - pattern: "*.r??"
        description: "rar volumes"
      - pattern: "Sample/*.{mkv,mp4}"
        max: 2
      - pattern: "Sample"
        type: dir
        max: 1
  music:
    deny_unexpected: false
    rules:
      - pattern: '^\d{2}-.+\.flac$'
        regex: true
        min: 1
"#;

    #[test]
    fn test_parse_sample() {
        let presets = parse_presets(SAMPLE).unwrap();
        assert_eq!(presets.schema_version, 1);

        let movie = presets.category("movie").unwrap();
        assert!(movie.deny_unexpected);
        assert_eq!(movie.rules.len(), 4);
        assert_eq!(movie.rules[0].min, 1);
        assert_eq!(movie.rules[0].kind, RuleKind::File);
        assert_eq!(movie.rules[3].kind, RuleKind::Dir);

        let music = presets.category("music").unwrap();
        assert!(!music.deny_unexpected);
        assert!(music.rules[0].regex);
    }

    #[test]
    fn test_missing_category_is_none() {
        let presets = parse_presets(SAMPLE).unwrap();
        assert!(presets.category("episode").is_none());
    }

    #[test]
    fn test_deny_unexpected_is_required() {
        let data = r#"
rules:
  movie:
    rules:
      - pattern: "*.nfo"
"#;
        let err = parse_presets(data).unwrap_err();
        assert!(err.to_string().contains("deny_unexpected"));
    }

    #[test]
    fn test_non_mapping_category_rejected() {
        let data = "rules:\n  movie: 42\n";
        let err = parse_presets(data).unwrap_err();
        assert!(err.to_string().contains("invalid format"));
    }

    #[test]
    fn test_empty_rule_list_is_valid_config() {
        let data = "rules:\n  app:\n    deny_unexpected: false\n";
        let presets = parse_presets(data).unwrap();
        let app = presets.category("app").unwrap();
        assert!(app.rules.is_empty());
    }
}
