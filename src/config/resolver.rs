//! Precedence resolution for configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Session config.kdl (`<data dir>/<workspace-hash>/config.kdl`)
//! 3. System config.kdl (`~/.config/ticketdesk/config.kdl`)
//! 4. Built-in defaults

use crate::config::{OutputFormat, TicketdeskConfig};
use crate::models::{Category, Priority};
use crate::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Environment variable overriding the system config directory.
pub const CONFIG_DIR_ENV: &str = "TD_CONFIG_DIR";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    /// Value from CLI flag
    Cli,
    /// Value from session-level config
    Session,
    /// Value from system-level config
    System,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ValueSource::Cli => "cli",
            ValueSource::Session => "session",
            ValueSource::System => "system",
            ValueSource::Default => "default",
        };
        write!(f, "{}", s)
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved configuration with source tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    pub output_format: Resolved<OutputFormat>,
    pub default_priority: Resolved<Priority>,
    pub default_category: Resolved<Category>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            output_format: Resolved::new(OutputFormat::Json, ValueSource::Default),
            default_priority: Resolved::new(Priority::Medium, ValueSource::Default),
            default_category: Resolved::new(Category::Technical, ValueSource::Default),
        }
    }
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub output_format: Option<OutputFormat>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }
}

/// Location of the system-level config file.
///
/// `$TD_CONFIG_DIR/config.kdl` if set, otherwise
/// `<config dir>/ticketdesk/config.kdl`.
pub fn system_config_path() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(dir).join("config.kdl"));
    }
    let config_dir = dirs::config_dir()
        .ok_or_else(|| Error::Other("Could not determine config directory".to_string()))?;
    Ok(config_dir.join("ticketdesk").join("config.kdl"))
}

/// Resolve configuration with full precedence chain.
///
/// `session_path` is `None` when the workspace has no storage yet.
pub fn resolve_config(
    system_path: &Path,
    session_path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<ResolvedConfig> {
    let system = TicketdeskConfig::load(system_path)?;
    let session = match session_path {
        Some(path) => TicketdeskConfig::load(path)?,
        None => TicketdeskConfig::new(),
    };
    Ok(resolve_layers(&system, &session, overrides))
}

/// Resolve from already-loaded layers.
pub fn resolve_layers(
    system: &TicketdeskConfig,
    session: &TicketdeskConfig,
    overrides: &ConfigOverrides,
) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    ResolvedConfig {
        output_format: pick(
            overrides.output_format,
            session.output_format,
            system.output_format,
            defaults.output_format,
        ),
        default_priority: pick(
            None,
            session.default_priority,
            system.default_priority,
            defaults.default_priority,
        ),
        default_category: pick(
            None,
            session.default_category,
            system.default_category,
            defaults.default_category,
        ),
    }
}

fn pick<T>(
    cli: Option<T>,
    session: Option<T>,
    system: Option<T>,
    default: Resolved<T>,
) -> Resolved<T> {
    if let Some(value) = cli {
        Resolved::new(value, ValueSource::Cli)
    } else if let Some(value) = session {
        Resolved::new(value, ValueSource::Session)
    } else if let Some(value) = system {
        Resolved::new(value, ValueSource::System)
    } else {
        default
    }
}
