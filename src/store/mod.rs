//! Ticket store: owns the ticket collection and enforces lifecycle rules.
//!
//! The store is an explicit object owned by the caller. It never touches
//! disk; persistence is done by a [`crate::storage::TicketBackend`] that
//! the caller loads from before building the store and saves to after
//! each mutation.
//!
//! Tickets are kept newest-first: `create` prepends.

pub mod clock;

pub use clock::{Clock, ManualClock, SystemClock};

use crate::models::sla::compute_deadline;
use crate::models::{NewTicket, Ticket, TicketStatus};
use crate::{Error, Result};
use sha2::{Digest, Sha256};

/// Prefix of every ticket id.
pub const ID_PREFIX: &str = "tk";

/// Hex characters kept from the id hash.
const ID_HEX_LEN: usize = 6;

/// In-memory collection of tickets for one session.
pub struct TicketStore<C: Clock = SystemClock> {
    tickets: Vec<Ticket>,
    clock: C,
    /// Mixed into id hashes so two tickets created within one clock tick differ.
    sequence: u64,
}

impl TicketStore<SystemClock> {
    /// Create an empty store on the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for TicketStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TicketStore<C> {
    /// Create an empty store reading time from `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            tickets: Vec::new(),
            clock,
            sequence: 0,
        }
    }

    /// Rebuild a store from a persisted collection, keeping its order.
    pub fn from_tickets(tickets: Vec<Ticket>, clock: C) -> Self {
        let sequence = tickets.len() as u64;
        Self {
            tickets,
            clock,
            sequence,
        }
    }

    /// Consume the store, returning the collection newest-first.
    pub fn into_tickets(self) -> Vec<Ticket> {
        self.tickets
    }

    /// The current instant according to the store's clock.
    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Create a ticket and prepend it to the collection.
    ///
    /// Fails with [`Error::Validation`] if the title is blank; the store is
    /// left untouched in that case.
    pub fn create(&mut self, new: NewTicket) -> Result<Ticket> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(Error::Validation("Ticket title cannot be empty".to_string()));
        }

        let created_at = self.clock.now();
        let id = self.allocate_id(title, created_at);

        let ticket = Ticket {
            id,
            title: title.to_string(),
            description: non_blank(new.description),
            priority: new.priority,
            category: new.category,
            assignee: non_blank(new.assignee),
            status: TicketStatus::Open,
            created_at,
            sla_deadline: compute_deadline(created_at, new.priority),
            resolved_at: None,
        };

        tracing::debug!(id = %ticket.id, priority = %ticket.priority, "created ticket");
        self.tickets.insert(0, ticket.clone());
        Ok(ticket)
    }

    /// Move a ticket to `status`.
    ///
    /// Entering `resolved` stamps `resolved_at` with the current instant,
    /// even if the ticket was already resolved. Any other status clears it.
    pub fn transition(&mut self, id: &str, status: TicketStatus) -> Result<Ticket> {
        let now = self.clock.now();
        let ticket = self
            .tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        let previous = ticket.status;
        ticket.status = status;
        ticket.resolved_at = match status {
            TicketStatus::Resolved => Some(now),
            TicketStatus::Open | TicketStatus::InProgress => None,
        };

        tracing::debug!(id, from = %previous, to = %status, "transitioned ticket");
        Ok(ticket.clone())
    }

    /// Remove a ticket. Returns whether anything was removed; an unknown id
    /// is not an error.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.tickets.len();
        self.tickets.retain(|t| t.id != id);
        let removed = self.tickets.len() != before;
        tracing::debug!(id, removed, "delete ticket");
        removed
    }

    /// All tickets, newest-first.
    pub fn list(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn get(&self, id: &str) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    fn allocate_id(&mut self, title: &str, created_at: chrono::DateTime<chrono::Utc>) -> String {
        loop {
            self.sequence += 1;
            let seed = format!("{}:{}", title, self.sequence);
            let id = generate_id(ID_PREFIX, &seed, created_at);
            if self.get(&id).is_none() {
                return id;
            }
            tracing::warn!(%id, "ticket id collision, regenerating");
        }
    }
}

/// Generate a ticket id.
///
/// Format: `<prefix>-<6 hex chars>`, hashed from the seed and the
/// creation instant.
pub fn generate_id(prefix: &str, seed: &str, at: chrono::DateTime<chrono::Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    hasher.update(at.timestamp_nanos_opt().unwrap_or(0).to_le_bytes());
    let hash_hex = format!("{:x}", hasher.finalize());
    format!("{}-{}", prefix, &hash_hex[..ID_HEX_LEN])
}

/// Validate that an id looks like one this store produces.
pub fn validate_id(id: &str) -> Result<()> {
    let suffix = id
        .strip_prefix(ID_PREFIX)
        .and_then(|rest| rest.strip_prefix('-'))
        .ok_or_else(|| {
            Error::InvalidInput(format!("ID must start with '{}-', got: {}", ID_PREFIX, id))
        })?;

    if suffix.len() != ID_HEX_LEN || !suffix.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::InvalidInput(format!(
            "ID suffix must be {} hex characters, got: {}",
            ID_HEX_LEN, suffix
        )));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
