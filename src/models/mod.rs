//! Data models for Ticketdesk entities.
//!
//! This module defines the core data structures:
//! - `Ticket` - A support request with priority, status and SLA deadline
//! - `Priority` - SLA tier that fixes the response-time budget
//! - `Category` - Informational classification of the request
//! - `TicketStatus` - Lifecycle position (open, in progress, resolved)
//!
//! The SLA policy itself lives in [`sla`].

pub mod sla;

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ticket status in the lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolved => "resolved",
        }
    }

    pub fn all() -> &'static [TicketStatus] {
        &[
            TicketStatus::Open,
            TicketStatus::InProgress,
            TicketStatus::Resolved,
        ]
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(TicketStatus::Open),
            "in_progress" | "in-progress" | "inprogress" => Ok(TicketStatus::InProgress),
            "resolved" => Ok(TicketStatus::Resolved),
            _ => Err(Error::InvalidInput(format!(
                "Invalid status '{}'. Valid statuses: open, in_progress, resolved",
                s
            ))),
        }
    }
}

/// SLA priority tier, highest urgency first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn all() -> &'static [Priority] {
        &[
            Priority::Critical,
            Priority::High,
            Priority::Medium,
            Priority::Low,
        ]
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Ok(Priority::Critical),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(Error::InvalidInput(format!(
                "Invalid priority '{}'. Valid priorities: critical, high, medium, low",
                s
            ))),
        }
    }
}

/// Ticket category. Informational only; no effect on SLA or lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Technical,
    Access,
    Hardware,
    Software,
    Network,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Technical => "technical",
            Category::Access => "access",
            Category::Hardware => "hardware",
            Category::Software => "software",
            Category::Network => "network",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "technical" => Ok(Category::Technical),
            "access" => Ok(Category::Access),
            "hardware" => Ok(Category::Hardware),
            "software" => Ok(Category::Software),
            "network" => Ok(Category::Network),
            _ => Err(Error::InvalidInput(format!(
                "Invalid category '{}'. Valid categories: technical, access, hardware, software, network",
                s
            ))),
        }
    }
}

/// A support ticket tracked by Ticketdesk.
///
/// Only `status` and `resolved_at` change after creation, and only through
/// [`crate::store::TicketStore::transition`]. Breach status is deliberately
/// absent: it depends on the evaluation instant and is derived by
/// [`crate::aggregate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique identifier (e.g., "tk-a1b2c3")
    pub id: String,

    /// Ticket title, never empty
    pub title: String,

    /// Detailed description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// SLA tier
    pub priority: Priority,

    /// Request category
    #[serde(default)]
    pub category: Category,

    /// Assigned agent; `None` means unassigned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,

    /// Current lifecycle status
    #[serde(default)]
    pub status: TicketStatus,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Instant by which the ticket must be resolved
    pub sla_deadline: DateTime<Utc>,

    /// Resolution timestamp, present iff status is resolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Ticket {
    pub fn is_resolved(&self) -> bool {
        self.status == TicketStatus::Resolved
    }

    pub fn is_assigned(&self) -> bool {
        self.assignee.is_some()
    }
}

/// User-supplied fields for a new ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTicket {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub category: Category,
    pub assignee: Option<String>,
}

impl NewTicket {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }
}
