//! Ticketdesk CLI - support tickets with SLA monitoring.

use clap::Parser;
use std::env;
use std::path::{Path, PathBuf};
use std::process;
use ticketdesk::cli::{Cli, Commands, ConfigCommands};
use ticketdesk::commands::{self, Output, Session};
use ticketdesk::config::{ConfigOverrides, OutputFormat, ResolvedConfig};
use ticketdesk::models::TicketStatus;
use ticketdesk::storage::FileBackend;
use ticketdesk::store::SystemClock;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `TD_LOG=debug`).
const LOG_ENV: &str = "TD_LOG";

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let workspace = resolve_workspace(cli.workspace, cli.human_readable);

    let mut overrides = ConfigOverrides::new();
    if cli.human_readable {
        overrides = overrides.with_output_format(OutputFormat::Human);
    }

    let config = match commands::resolve_workspace_config(&workspace, &overrides) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "could not load config, using defaults");
            let mut config = ResolvedConfig::default();
            if cli.human_readable {
                config.output_format.value = OutputFormat::Human;
            }
            config
        }
    };
    let human = config.output_format.value == OutputFormat::Human;

    if let Err(e) = run_command(cli.command, &workspace, &config, human) {
        tracing::debug!(error = ?e, "command failed");
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve the workspace directory: --workspace flag / TD_WORKSPACE, else cwd.
fn resolve_workspace(explicit: Option<PathBuf>, human: bool) -> PathBuf {
    match explicit {
        Some(path) => {
            if !path.exists() {
                let message = format!("Specified workspace does not exist: {}", path.display());
                if human {
                    eprintln!("Error: {}", message);
                } else {
                    eprintln!("{}", serde_json::json!({ "error": message }));
                }
                process::exit(1);
            }
            path
        }
        None => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

fn open_session(workspace: &Path) -> Result<Session<FileBackend, SystemClock>, ticketdesk::Error> {
    Session::open(FileBackend::open(workspace)?, SystemClock)
}

fn run_command(
    command: Option<Commands>,
    workspace: &Path,
    config: &ResolvedConfig,
    human: bool,
) -> Result<(), ticketdesk::Error> {
    match command {
        None | Some(Commands::Info) => output(&commands::info(workspace, *config)?, human),
        Some(Commands::Init) => output(&commands::init(workspace)?, human),
        Some(Commands::Create {
            title,
            description,
            priority,
            category,
            assignee,
        }) => {
            let mut session = open_session(workspace)?;
            let result = commands::ticket_create(
                &mut session,
                title,
                description,
                priority.as_deref(),
                category.as_deref(),
                assignee,
                config,
            )?;
            output(&result, human);
        }
        Some(Commands::Status { id, status }) => {
            let mut session = open_session(workspace)?;
            output(&commands::ticket_transition(&mut session, &id, &status)?, human);
        }
        Some(Commands::Start { id }) => {
            set_status(workspace, &id, TicketStatus::InProgress, human)?;
        }
        Some(Commands::Resolve { id }) => {
            set_status(workspace, &id, TicketStatus::Resolved, human)?;
        }
        Some(Commands::Reopen { id }) => {
            set_status(workspace, &id, TicketStatus::Open, human)?;
        }
        Some(Commands::Delete { id }) => {
            let mut session = open_session(workspace)?;
            output(&commands::ticket_delete(&mut session, &id)?, human);
        }
        Some(Commands::List { filter }) => {
            let session = open_session(workspace)?;
            output(&commands::ticket_list(&session, &filter)?, human);
        }
        Some(Commands::Show { id }) => {
            let session = open_session(workspace)?;
            output(&commands::ticket_show(&session, &id)?, human);
        }
        Some(Commands::Kpi) => {
            let session = open_session(workspace)?;
            output(&commands::kpi(&session), human);
        }
        Some(Commands::Sla) => output(&commands::sla_policy(), human),
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Get { key } => output(&commands::config_get(&key, config)?, human),
            ConfigCommands::Set { key, value, system } => {
                output(&commands::config_set(workspace, &key, &value, system)?, human)
            }
            ConfigCommands::List => output(&commands::config_list(*config), human),
        },
    }

    Ok(())
}

fn set_status(
    workspace: &Path,
    id: &str,
    status: TicketStatus,
    human: bool,
) -> Result<(), ticketdesk::Error> {
    let mut session = open_session(workspace)?;
    output(&commands::ticket_set_status(&mut session, id, status)?, human);
    Ok(())
}

/// Print output in JSON or human-readable format.
fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
