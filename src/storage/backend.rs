//! Persistence boundary for the ticket collection.
//!
//! The store never saves itself. A caller loads the collection through a
//! backend, hands it to [`crate::store::TicketStore::from_tickets`], and
//! saves the full collection back after every mutation.
//!
//! - `FileBackend` - JSONL file under the data directory (default)
//! - `MemoryBackend` - in-process vector, for tests and embedding hosts

use crate::Result;
use crate::models::Ticket;

/// Load/save of the complete ticket collection.
///
/// `save` followed by `load` must return the same tickets in the same
/// order, field for field.
pub trait TicketBackend {
    /// Read the full collection, newest-first.
    fn load(&self) -> Result<Vec<Ticket>>;

    /// Replace the stored collection with `tickets`.
    fn save(&mut self, tickets: &[Ticket]) -> Result<()>;

    /// Storage location description (for display purposes).
    fn location(&self) -> String;

    /// Backend type name.
    fn backend_type(&self) -> &'static str;
}

/// Backend that keeps the collection in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    tickets: Vec<Ticket>,
    saves: usize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tickets(tickets: Vec<Ticket>) -> Self {
        Self { tickets, saves: 0 }
    }

    /// Number of `save` calls so far.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl TicketBackend for MemoryBackend {
    fn load(&self) -> Result<Vec<Ticket>> {
        Ok(self.tickets.clone())
    }

    fn save(&mut self, tickets: &[Ticket]) -> Result<()> {
        self.tickets = tickets.to_vec();
        self.saves += 1;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}
