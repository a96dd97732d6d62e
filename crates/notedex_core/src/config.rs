//! Page-format configuration keyed by notebook type.
//!
//! # Responsibility
//! - Supply the zero-pad width used when normalizing pages of each notebook
//!   type.
//! - Load that mapping from JSON documents owned by the application.
//!
//! # Invariants
//! - Every configured width is within `1..=MAX_PAGE_WIDTH`.
//! - Notebook types without an explicit width use `default_width`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Width used when a configuration does not say otherwise.
pub const DEFAULT_PAGE_WIDTH: usize = 3;
/// Upper bound on a configured page width.
pub const MAX_PAGE_WIDTH: usize = 12;

/// Errors raised while loading or validating a [`PageFormatConfig`].
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    InvalidWidth {
        notebook_type: Option<String>,
        width: usize,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read page format config: {err}"),
            Self::Parse(err) => write!(f, "invalid page format config: {err}"),
            Self::InvalidWidth {
                notebook_type: Some(ntype),
                width,
            } => write!(
                f,
                "page width {width} for notebook type `{ntype}` is outside 1..={MAX_PAGE_WIDTH}"
            ),
            Self::InvalidWidth {
                notebook_type: None,
                width,
            } => write!(
                f,
                "default page width {width} is outside 1..={MAX_PAGE_WIDTH}"
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::InvalidWidth { .. } => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Zero-pad widths per notebook type.
///
/// JSON shape:
///
/// ```json
/// { "default_width": 3, "widths": { "CB": 3, "TB": 4 } }
/// ```
///
/// Both keys are optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageFormatConfig {
    pub default_width: usize,
    pub widths: BTreeMap<String, usize>,
}

impl Default for PageFormatConfig {
    fn default() -> Self {
        Self {
            default_width: DEFAULT_PAGE_WIDTH,
            widths: BTreeMap::new(),
        }
    }
}

impl PageFormatConfig {
    /// Returns a copy of this config with `width` set for `notebook_type`.
    pub fn with_width(mut self, notebook_type: impl Into<String>, width: usize) -> Self {
        self.widths.insert(notebook_type.into(), width);
        self
    }

    /// Parses and validates a JSON config document.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json_str(&source)
    }

    /// Checks that every width is usable for padding.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !width_in_range(self.default_width) {
            return Err(ConfigError::InvalidWidth {
                notebook_type: None,
                width: self.default_width,
            });
        }
        for (ntype, width) in &self.widths {
            if !width_in_range(*width) {
                return Err(ConfigError::InvalidWidth {
                    notebook_type: Some(ntype.clone()),
                    width: *width,
                });
            }
        }
        Ok(())
    }

    /// Returns the pad width for `notebook_type`.
    pub fn width_for(&self, notebook_type: &str) -> usize {
        self.widths
            .get(notebook_type)
            .copied()
            .unwrap_or(self.default_width)
    }
}

fn width_in_range(width: usize) -> bool {
    (1..=MAX_PAGE_WIDTH).contains(&width)
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, PageFormatConfig, DEFAULT_PAGE_WIDTH};

    #[test]
    fn default_config_uses_default_width_for_every_type() {
        let config = PageFormatConfig::default();
        assert_eq!(config.width_for("CB"), DEFAULT_PAGE_WIDTH);
        assert_eq!(config.width_for("anything"), DEFAULT_PAGE_WIDTH);
    }

    #[test]
    fn json_overrides_are_applied_per_type() {
        let config =
            PageFormatConfig::from_json_str(r#"{ "widths": { "TB": 4 } }"#).unwrap();
        assert_eq!(config.width_for("TB"), 4);
        assert_eq!(config.width_for("CB"), DEFAULT_PAGE_WIDTH);
    }

    #[test]
    fn empty_json_object_yields_defaults() {
        let config = PageFormatConfig::from_json_str("{}").unwrap();
        assert_eq!(config, PageFormatConfig::default());
    }

    #[test]
    fn zero_width_is_rejected() {
        let err = PageFormatConfig::from_json_str(r#"{ "widths": { "CB": 0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidWidth {
                notebook_type: Some(ref ntype),
                width: 0
            } if ntype == "CB"
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = PageFormatConfig::from_json_str("{ widths: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pages.json");
        std::fs::write(&path, r#"{ "default_width": 4 }"#).unwrap();

        let config = PageFormatConfig::load(&path).unwrap();
        assert_eq!(config.width_for("CB"), 4);
    }
}
