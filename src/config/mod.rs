//! Configuration for Ticketdesk.
//!
//! User preferences live in `config.kdl` files:
//!
//! - System: `~/.config/ticketdesk/config.kdl` (or `$TD_CONFIG_DIR/config.kdl`)
//! - Session: `<data dir>/<workspace-hash>/config.kdl`
//!
//! Contains:
//! - `output-format` - "json" or "human"
//! - `default-priority` - Priority for new tickets
//! - `default-category` - Category for new tickets
//!
//! ## Precedence
//!
//! CLI flag > session config > system config > defaults
//!
//! Use the [`resolver`] module for precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    CONFIG_DIR_ENV, ConfigOverrides, Resolved, ResolvedConfig, ValueSource, resolve_config,
    resolve_layers, system_config_path,
};
pub use schema::{CONFIG_KEYS, OutputFormat, TicketdeskConfig};
