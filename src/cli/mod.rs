//! CLI argument definitions for Ticketdesk.

use clap::{Parser, Subcommand};

/// Ticketdesk - support tickets with SLA monitoring.
///
/// Start with `td init`, then `td create` tickets and watch them with `td list` and `td kpi`.
#[derive(Parser, Debug)]
#[command(name = "td")]
#[command(author, version, about = "Track support tickets against their SLA deadlines", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Run as if td was started in <path> instead of the current directory.
    /// Each directory has its own ticket collection.
    #[arg(short = 'C', long = "workspace", global = true, env = "TD_WORKSPACE")]
    pub workspace: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize ticket storage for this workspace
    Init,

    /// Show version, storage location and resolved configuration
    Info,

    /// Create a new ticket
    Create {
        /// Ticket title
        title: String,

        /// Detailed description
        #[arg(short, long)]
        description: Option<String>,

        /// Priority: critical (4h), high (8h), medium (24h), low (72h)
        #[arg(short, long)]
        priority: Option<String>,

        /// Category: technical, access, hardware, software, network
        #[arg(short, long)]
        category: Option<String>,

        /// Assignee (empty means unassigned)
        #[arg(short, long)]
        assignee: Option<String>,
    },

    /// Move a ticket to a new status
    Status {
        /// Ticket ID (e.g., tk-a1b2c3)
        id: String,

        /// Target status: open, in_progress, resolved
        status: String,
    },

    /// Mark a ticket as in progress
    Start {
        /// Ticket ID
        id: String,
    },

    /// Mark a ticket as resolved
    Resolve {
        /// Ticket ID
        id: String,
    },

    /// Move a ticket back to open
    Reopen {
        /// Ticket ID
        id: String,
    },

    /// Delete a ticket (no error if it does not exist)
    Delete {
        /// Ticket ID
        id: String,
    },

    /// List tickets, newest first
    List {
        /// Filter: all, open, in_progress, resolved, breached
        #[arg(short, long, default_value = "all")]
        filter: String,
    },

    /// Show a ticket with its SLA state
    Show {
        /// Ticket ID
        id: String,
    },

    /// Show KPI summary over all tickets
    Kpi,

    /// Show the SLA policy table
    Sla,

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Key: output-format, default-priority, default-category
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Key: output-format, default-priority, default-category
        key: String,

        /// Value to store
        value: String,

        /// Write to the system config instead of this workspace's config
        #[arg(long)]
        system: bool,
    },

    /// Show all resolved values and where they came from
    List,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_create() {
        let cli = Cli::try_parse_from([
            "td", "create", "VPN down", "-p", "critical", "-c", "network", "-a", "ops",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Create {
                title,
                priority,
                category,
                assignee,
                description,
            }) => {
                assert_eq!(title, "VPN down");
                assert_eq!(priority.as_deref(), Some("critical"));
                assert_eq!(category.as_deref(), Some("network"));
                assert_eq!(assignee.as_deref(), Some("ops"));
                assert!(description.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_human_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["td", "kpi", "-H"]).unwrap();
        assert!(cli.human_readable);
        assert!(matches!(cli.command, Some(Commands::Kpi)));
    }

    #[test]
    fn test_list_filter_default() {
        let cli = Cli::try_parse_from(["td", "list"]).unwrap();
        match cli.command {
            Some(Commands::List { filter }) => assert_eq!(filter, "all"),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
