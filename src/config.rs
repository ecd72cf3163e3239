//! Editor configuration
//!
//! Read from a JSON rc-file. Every key is optional.
//!
//! ```json
//! {
//!   "indentStyle": "space",
//!   "indentSize": 2,
//!   "schemaLocation": "http://standards.buildingsmart.org/IDS/1.0/ids.xsd",
//!   "defaultAuthor": "bim@example.org"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File names searched by [`EditorConfig::find_and_load`], in priority order
pub const CONFIG_FILE_NAMES: [&str; 3] = [".idseditorrc.json", ".idseditorrc", "idseditor.json"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentStyle {
    #[default]
    Space,
    Tab,
}

/// Output layout and the values a new document starts with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub indent_style: IndentStyle,
    /// Indent characters per nesting level
    pub indent_size: usize,
    pub insert_final_newline: bool,
    /// `xsi:noNamespaceSchemaLocation` written on the root element
    pub schema_location: String,

    pub default_title: String,
    pub default_author: String,
    pub default_copyright: String,
    /// IFC class given to newly added applicability rules
    pub default_entity: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            indent_style: IndentStyle::Space,
            indent_size: 4,
            insert_final_newline: true,
            schema_location: "ids.xsd".into(),
            default_title: "New check".into(),
            default_author: "user@example.com".into(),
            default_copyright: "User".into(),
            default_entity: "IfcWall".into(),
        }
    }
}

impl EditorConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.into(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.into(),
            source,
        })
    }

    /// Nearest config file in `start_dir` or an ancestor.
    ///
    /// A file that fails to load is logged and the search continues.
    pub fn find_and_load(start_dir: &Path) -> Option<Self> {
        start_dir
            .ancestors()
            .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
            .filter(|candidate| candidate.is_file())
            .find_map(|candidate| match Self::load(&candidate) {
                Ok(config) => {
                    tracing::debug!(path = %candidate.display(), "using config");
                    Some(config)
                }
                Err(e) => {
                    tracing::warn!("{}", e);
                    None
                }
            })
    }

    /// One level of indentation
    pub fn indent_str(&self) -> String {
        let c = match self.indent_style {
            IndentStyle::Space => " ",
            IndentStyle::Tab => "\t",
        };
        c.repeat(self.indent_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.indent_str(), "    ");
        assert!(config.insert_final_newline);
        assert_eq!(config.schema_location, "ids.xsd");
        assert_eq!(config.default_title, "New check");
        assert_eq!(config.default_entity, "IfcWall");
    }

    #[test]
    fn test_tab_indent() {
        let config = EditorConfig {
            indent_style: IndentStyle::Tab,
            indent_size: 2,
            ..Default::default()
        };
        assert_eq!(config.indent_str(), "\t\t");
    }

    #[test]
    fn test_unspecified_keys_keep_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".idseditorrc.json");
        fs::write(
            &path,
            r#"{"indentStyle": "tab", "defaultAuthor": "bim@example.org"}"#,
        )
        .unwrap();

        let config = EditorConfig::load(&path).unwrap();
        assert_eq!(config.indent_style, IndentStyle::Tab);
        assert_eq!(config.default_author, "bim@example.org");
        assert_eq!(config.indent_size, 4);
        assert_eq!(config.default_copyright, "User");
    }

    #[test]
    fn test_found_in_ancestor() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("checks").join("walls");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("idseditor.json"), r#"{"defaultEntity": "IfcDoor"}"#).unwrap();

        let config = EditorConfig::find_and_load(&nested).unwrap();
        assert_eq!(config.default_entity, "IfcDoor");
    }

    #[test]
    fn test_nearest_file_wins() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("sub");
        fs::create_dir(&nested).unwrap();
        fs::write(dir.path().join(".idseditorrc"), r#"{"indentSize": 8}"#).unwrap();
        fs::write(nested.join(".idseditorrc.json"), r#"{"indentSize": 3}"#).unwrap();

        let config = EditorConfig::find_and_load(&nested).unwrap();
        assert_eq!(config.indent_size, 3);
    }

    #[test]
    fn test_broken_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".idseditorrc.json"), "{ not json").unwrap();
        fs::write(dir.path().join("idseditor.json"), r#"{"indentSize": 2}"#).unwrap();

        let config = EditorConfig::find_and_load(dir.path()).unwrap();
        assert_eq!(config.indent_size, 2);
    }

    #[test]
    fn test_load_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("idseditor.json");
        fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(EditorConfig::load(&path), Err(ConfigError::Parse { .. })));

        let missing = dir.path().join("absent.json");
        assert!(matches!(EditorConfig::load(&missing), Err(ConfigError::Read { .. })));
    }
}
