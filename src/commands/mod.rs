//! Command implementations for the `td` CLI.
//!
//! Each command loads the ticket collection through a backend, runs one
//! engine operation, saves after mutations, and returns a result that can be
//! rendered as JSON or as human-readable text. Formatting of durations and
//! percentages happens here; the engine only returns numbers.

use crate::aggregate::{self, ElapsedTime, KpiSummary, SlaClock, TicketFilter, TicketView};
use crate::config::{
    CONFIG_KEYS, ConfigOverrides, ResolvedConfig, TicketdeskConfig, ValueSource, resolve_config,
    system_config_path,
};
use crate::models::sla::sla_hours;
use crate::models::{Category, NewTicket, Priority, TicketStatus};
use crate::storage::{FileBackend, TicketBackend};
use crate::store::{Clock, TicketStore};
use crate::{Error, Result};
use serde::Serialize;
use std::path::Path;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
}

/// Format an elapsed time the way the dashboard shows it: `4h 30m`.
pub fn format_elapsed(elapsed: ElapsedTime) -> String {
    format!("{}h {}m", elapsed.hours, elapsed.minutes)
}

/// A loaded ticket collection bound to the backend it came from.
pub struct Session<B: TicketBackend, C: Clock> {
    backend: B,
    store: TicketStore<C>,
}

impl<B: TicketBackend, C: Clock> Session<B, C> {
    /// Load the collection from `backend`.
    pub fn open(backend: B, clock: C) -> Result<Self> {
        let tickets = backend.load()?;
        Ok(Self {
            store: TicketStore::from_tickets(tickets, clock),
            backend,
        })
    }

    pub fn store(&self) -> &TicketStore<C> {
        &self.store
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn save(&mut self) -> Result<()> {
        self.backend.save(self.store.list())
    }
}

// === Init / Info ===

#[derive(Serialize)]
pub struct InitResult {
    pub initialized: bool,
    pub location: String,
}

impl Output for InitResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.initialized {
            format!("Initialized ticketdesk at {}", self.location)
        } else {
            format!("Ticketdesk already initialized at {}", self.location)
        }
    }
}

/// Initialize storage for a workspace. Idempotent.
pub fn init(workspace: &Path) -> Result<InitResult> {
    let existed = FileBackend::exists(workspace)?;
    let backend = FileBackend::init(workspace)?;
    Ok(InitResult {
        initialized: !existed,
        location: backend.location(),
    })
}

#[derive(Serialize)]
pub struct InfoResult {
    pub version: &'static str,
    pub location: String,
    pub initialized: bool,
    pub tickets: usize,
    pub config: ResolvedConfig,
}

impl Output for InfoResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("ticketdesk {}", self.version),
            format!("Storage: {}", self.location),
        ];
        if self.initialized {
            lines.push(format!("Tickets: {}", self.tickets));
        } else {
            lines.push("Not initialized (run `td init`)".to_string());
        }
        lines.push(String::new());
        lines.push(format_resolved_config(&self.config));
        lines.join("\n")
    }
}

pub fn info(workspace: &Path, config: ResolvedConfig) -> Result<InfoResult> {
    let initialized = FileBackend::exists(workspace)?;
    let (location, tickets) = if initialized {
        let backend = FileBackend::open(workspace)?;
        (backend.location(), backend.load()?.len())
    } else {
        (
            crate::storage::get_storage_dir(workspace)?
                .display()
                .to_string(),
            0,
        )
    };
    Ok(InfoResult {
        version: env!("CARGO_PKG_VERSION"),
        location,
        initialized,
        tickets,
        config,
    })
}

// === Ticket commands ===

#[derive(Serialize)]
#[serde(transparent)]
pub struct TicketResult {
    pub view: TicketView,
}

impl Output for TicketResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format_ticket(&self.view)
    }
}

fn format_ticket(view: &TicketView) -> String {
    let t = &view.ticket;
    let mut header = format!("{} [{}] [{}]", t.id, t.priority, t.status);
    if view.breached {
        header.push_str(" SLA BREACHED");
    }

    let mut lines = vec![header, format!("  {}", t.title)];
    if let Some(ref description) = t.description {
        lines.push(format!("  {}", description));
    }
    lines.push(format!(
        "  Category: {}  Assignee: {}",
        t.category,
        t.assignee.as_deref().unwrap_or("Unassigned")
    ));
    lines.push(format!(
        "  Created: {}  SLA: {}h",
        t.created_at.format("%Y-%m-%d %H:%M UTC"),
        view.sla_hours
    ));
    lines.push(match view.sla_clock {
        SlaClock::Remaining(e) => format!("  Time remaining: {}", format_elapsed(e)),
        SlaClock::Overdue(e) => format!("  Overdue by: {}", format_elapsed(e)),
        SlaClock::ResolvedIn(e) => format!("  Resolved in: {}", format_elapsed(e)),
    });
    lines.join("\n")
}

/// Create a ticket. Unset priority/category fall back to the resolved
/// configuration defaults.
pub fn ticket_create<B: TicketBackend, C: Clock>(
    session: &mut Session<B, C>,
    title: String,
    description: Option<String>,
    priority: Option<&str>,
    category: Option<&str>,
    assignee: Option<String>,
    defaults: &ResolvedConfig,
) -> Result<TicketResult> {
    let priority = match priority {
        Some(p) => p.parse::<Priority>()?,
        None => defaults.default_priority.value,
    };
    let category = match category {
        Some(c) => c.parse::<Category>()?,
        None => defaults.default_category.value,
    };

    let ticket = session.store.create(NewTicket {
        title,
        description,
        priority,
        category,
        assignee,
    })?;
    session.save()?;

    Ok(TicketResult {
        view: TicketView::at(&ticket, session.store.now()),
    })
}

/// Transition a ticket to a status given as text.
pub fn ticket_transition<B: TicketBackend, C: Clock>(
    session: &mut Session<B, C>,
    id: &str,
    status: &str,
) -> Result<TicketResult> {
    let status = status.parse::<TicketStatus>()?;
    ticket_set_status(session, id, status)
}

/// Transition a ticket to `status`.
pub fn ticket_set_status<B: TicketBackend, C: Clock>(
    session: &mut Session<B, C>,
    id: &str,
    status: TicketStatus,
) -> Result<TicketResult> {
    let ticket = session.store.transition(id, status)?;
    session.save()?;
    Ok(TicketResult {
        view: TicketView::at(&ticket, session.store.now()),
    })
}

#[derive(Serialize)]
pub struct DeleteResult {
    pub id: String,
    pub deleted: bool,
}

impl Output for DeleteResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.deleted {
            format!("Deleted ticket {}", self.id)
        } else {
            format!("No ticket {} (nothing deleted)", self.id)
        }
    }
}

pub fn ticket_delete<B: TicketBackend, C: Clock>(
    session: &mut Session<B, C>,
    id: &str,
) -> Result<DeleteResult> {
    let deleted = session.store.delete(id);
    if deleted {
        session.save()?;
    }
    Ok(DeleteResult {
        id: id.to_string(),
        deleted,
    })
}

#[derive(Serialize)]
pub struct TicketList {
    pub filter: TicketFilter,
    pub count: usize,
    pub tickets: Vec<TicketView>,
}

impl Output for TicketList {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.tickets.is_empty() {
            return format!("No tickets found (filter: {}).", self.filter);
        }
        let mut out = format!("{} ticket(s) (filter: {}):\n", self.count, self.filter);
        for view in &self.tickets {
            out.push('\n');
            out.push_str(&format_ticket(view));
            out.push('\n');
        }
        out.trim_end().to_string()
    }
}

pub fn ticket_list<B: TicketBackend, C: Clock>(
    session: &Session<B, C>,
    filter: &str,
) -> Result<TicketList> {
    let filter = filter.parse::<TicketFilter>()?;
    let now = session.store.now();
    let tickets: Vec<TicketView> = aggregate::filter(session.store.list(), filter, now)
        .into_iter()
        .map(|t| TicketView::at(t, now))
        .collect();
    Ok(TicketList {
        filter,
        count: tickets.len(),
        tickets,
    })
}

pub fn ticket_show<B: TicketBackend, C: Clock>(
    session: &Session<B, C>,
    id: &str,
) -> Result<TicketResult> {
    let ticket = session
        .store
        .get(id)
        .ok_or_else(|| Error::NotFound(id.to_string()))?;
    Ok(TicketResult {
        view: TicketView::at(ticket, session.store.now()),
    })
}

// === KPI / SLA ===

#[derive(Serialize)]
#[serde(transparent)]
pub struct KpiResult {
    pub summary: KpiSummary,
}

impl Output for KpiResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let s = &self.summary;
        let compliance = if s.resolved == 0 {
            format!("{:.1}% (no resolved tickets yet)", s.sla_compliance)
        } else {
            format!("{:.1}%", s.sla_compliance)
        };
        [
            format!("Total: {}", s.total),
            format!("Open: {}", s.open),
            format!("In progress: {}", s.in_progress),
            format!("Resolved: {}", s.resolved),
            format!("SLA breached: {}", s.breached),
            format!("SLA compliance: {}", compliance),
            format!("Avg resolution time: {:.1} hours", s.avg_resolution_time),
        ]
        .join("\n")
    }
}

pub fn kpi<B: TicketBackend, C: Clock>(session: &Session<B, C>) -> KpiResult {
    KpiResult {
        summary: aggregate::kpis(session.store.list(), session.store.now()),
    }
}

#[derive(Serialize)]
pub struct SlaTier {
    pub priority: Priority,
    pub hours: i64,
}

#[derive(Serialize)]
pub struct SlaPolicy {
    pub tiers: Vec<SlaTier>,
}

impl Output for SlaPolicy {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        self.tiers
            .iter()
            .map(|tier| format!("{:<9} {}h", tier.priority.as_str(), tier.hours))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn sla_policy() -> SlaPolicy {
    SlaPolicy {
        tiers: Priority::all()
            .iter()
            .map(|&priority| SlaTier {
                priority,
                hours: sla_hours(priority),
            })
            .collect(),
    }
}

// === Config ===

#[derive(Serialize)]
pub struct ConfigValue {
    pub key: String,
    pub value: Option<String>,
    pub scope: String,
}

impl Output for ConfigValue {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        match self.value {
            Some(ref v) => format!("{} = {} ({})", self.key, v, self.scope),
            None => format!("{} is not set ({})", self.key, self.scope),
        }
    }
}

/// Read a key as resolved across all layers.
pub fn config_get(key: &str, resolved: &ResolvedConfig) -> Result<ConfigValue> {
    let (value, source) = match key {
        "output-format" => (
            resolved.output_format.value.as_str(),
            resolved.output_format.source,
        ),
        "default-priority" => (
            resolved.default_priority.value.as_str(),
            resolved.default_priority.source,
        ),
        "default-category" => (
            resolved.default_category.value.as_str(),
            resolved.default_category.source,
        ),
        _ => {
            return Err(Error::InvalidInput(format!(
                "Unknown config key '{}'. Valid keys: {}",
                key,
                CONFIG_KEYS.join(", ")
            )));
        }
    };
    Ok(ConfigValue {
        key: key.to_string(),
        value: Some(value.to_string()),
        scope: source.to_string(),
    })
}

/// Write a key to the session (or system) config file.
pub fn config_set(workspace: &Path, key: &str, value: &str, system: bool) -> Result<ConfigValue> {
    let (path, source) = if system {
        (system_config_path()?, ValueSource::System)
    } else {
        (FileBackend::open(workspace)?.config_path(), ValueSource::Session)
    };
    let mut config = TicketdeskConfig::load(&path)?;
    config.set(key, value)?;
    config.save(&path)?;
    Ok(ConfigValue {
        key: key.to_string(),
        value: config.get(key)?,
        scope: source.to_string(),
    })
}

#[derive(Serialize)]
#[serde(transparent)]
pub struct ConfigList {
    pub config: ResolvedConfig,
}

impl Output for ConfigList {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format_resolved_config(&self.config)
    }
}

pub fn config_list(resolved: ResolvedConfig) -> ConfigList {
    ConfigList { config: resolved }
}

fn format_resolved_config(config: &ResolvedConfig) -> String {
    [
        format!(
            "output-format = {} ({})",
            config.output_format.value, config.output_format.source
        ),
        format!(
            "default-priority = {} ({})",
            config.default_priority.value, config.default_priority.source
        ),
        format!(
            "default-category = {} ({})",
            config.default_category.value, config.default_category.source
        ),
    ]
    .join("\n")
}

/// Resolve configuration for a workspace, tolerating missing storage.
pub fn resolve_workspace_config(
    workspace: &Path,
    overrides: &ConfigOverrides,
) -> Result<ResolvedConfig> {
    let session_path = match FileBackend::open(workspace) {
        Ok(backend) => Some(backend.config_path()),
        Err(Error::NotInitialized) => None,
        Err(e) => return Err(e),
    };
    resolve_config(&system_config_path()?, session_path.as_deref(), overrides)
}
