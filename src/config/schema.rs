//! KDL schema for `config.kdl`.
//!
//! ```kdl
//! output-format "human"  // or "json"
//! default-priority "high"
//! default-category "network"
//! ```

use crate::models::{Category, Priority};
use crate::{Error, Result};
use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

impl OutputFormat {
    /// Parse from string, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "human" => Some(OutputFormat::Human),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Human => "human",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keys accepted in `config.kdl` and by `td config`.
pub const CONFIG_KEYS: &[&str] = &["output-format", "default-priority", "default-category"];

/// User preferences stored in config.kdl.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketdeskConfig {
    /// Default output format for CLI commands
    pub output_format: Option<OutputFormat>,

    /// Priority for new tickets when `--priority` is not given
    pub default_priority: Option<Priority>,

    /// Category for new tickets when `--category` is not given
    pub default_category: Option<Category>,
}

impl TicketdeskConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse config from a KDL document.
    ///
    /// Unrecognised values are skipped with a warning so that one bad line
    /// does not stop the CLI from starting.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut config = Self::new();

        if let Some(s) = first_string(doc, "output-format") {
            config.output_format = OutputFormat::parse(s);
            if config.output_format.is_none() {
                tracing::warn!(value = s, "ignoring invalid output-format in config");
            }
        }

        if let Some(s) = first_string(doc, "default-priority") {
            match s.parse() {
                Ok(priority) => config.default_priority = Some(priority),
                Err(e) => tracing::warn!(error = %e, "ignoring default-priority in config"),
            }
        }

        if let Some(s) = first_string(doc, "default-category") {
            match s.parse() {
                Ok(category) => config.default_category = Some(category),
                Err(e) => tracing::warn!(error = %e, "ignoring default-category in config"),
            }
        }

        config
    }

    /// Convert config to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        if let Some(format) = self.output_format {
            push_string(&mut doc, "output-format", format.as_str());
        }
        if let Some(priority) = self.default_priority {
            push_string(&mut doc, "default-priority", priority.as_str());
        }
        if let Some(category) = self.default_category {
            push_string(&mut doc, "default-category", category.as_str());
        }

        doc
    }

    /// Read a value by its KDL key.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = match key {
            "output-format" => self.output_format.map(|v| v.as_str()),
            "default-priority" => self.default_priority.map(|v| v.as_str()),
            "default-category" => self.default_category.map(|v| v.as_str()),
            _ => return Err(unknown_key(key)),
        };
        Ok(value.map(str::to_string))
    }

    /// Set a value by its KDL key, validating it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "output-format" => {
                let format = OutputFormat::parse(value).ok_or_else(|| {
                    Error::Validation(format!(
                        "output-format must be 'json' or 'human', got '{}'",
                        value
                    ))
                })?;
                self.output_format = Some(format);
            }
            "default-priority" => {
                let priority = value
                    .parse::<Priority>()
                    .map_err(|e| Error::Validation(e.to_string()))?;
                self.default_priority = Some(priority);
            }
            "default-category" => {
                let category = value
                    .parse::<Category>()
                    .map_err(|e| Error::Validation(e.to_string()))?;
                self.default_category = Some(category);
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &TicketdeskConfig) {
        if other.output_format.is_some() {
            self.output_format = other.output_format;
        }
        if other.default_priority.is_some() {
            self.default_priority = other.default_priority;
        }
        if other.default_category.is_some() {
            self.default_category = other.default_category;
        }
    }

    /// Load from a file; a missing file yields an empty config.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)?;
        let doc: KdlDocument = content.parse()?;
        Ok(Self::from_kdl(&doc))
    }

    /// Write to a file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_kdl().to_string())?;
        tracing::debug!(path = %path.display(), "wrote config");
        Ok(())
    }
}

fn first_string<'a>(doc: &'a KdlDocument, name: &str) -> Option<&'a str> {
    doc.get(name)?.entries().first()?.value().as_string()
}

fn push_string(doc: &mut KdlDocument, name: &str, value: &str) {
    let mut node = KdlNode::new(name);
    node.push(KdlEntry::new(KdlValue::String(value.to_string())));
    doc.nodes_mut().push(node);
}

fn unknown_key(key: &str) -> Error {
    Error::InvalidInput(format!(
        "Unknown config key '{}'. Valid keys: {}",
        key,
        CONFIG_KEYS.join(", ")
    ))
}
