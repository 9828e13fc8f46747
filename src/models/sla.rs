//! SLA policy: the fixed mapping from priority tier to response-time budget.
//!
//! | priority | hours |
//! |----------|-------|
//! | critical | 4     |
//! | high     | 8     |
//! | medium   | 24    |
//! | low      | 72    |

use super::Priority;
use chrono::{DateTime, Duration, Utc};

/// Budget applied to priority labels outside the table.
pub const DEFAULT_SLA_HOURS: i64 = 24;

/// SLA budget in hours for a priority tier.
pub fn sla_hours(priority: Priority) -> i64 {
    match priority {
        Priority::Critical => 4,
        Priority::High => 8,
        Priority::Medium => 24,
        Priority::Low => 72,
    }
}

/// SLA budget looked up by a free-text priority label.
///
/// Never fails: unknown labels get [`DEFAULT_SLA_HOURS`]. This masks bad
/// input, so ticket creation parses the label with `Priority::from_str`
/// and rejects it instead; this lookup is only a safety net for callers
/// holding raw labels.
pub fn sla_hours_for_label(label: &str) -> i64 {
    match label.parse::<Priority>() {
        Ok(priority) => sla_hours(priority),
        Err(_) => {
            tracing::debug!(label, "unknown priority label, using default SLA");
            DEFAULT_SLA_HOURS
        }
    }
}

/// Absolute SLA deadline for a ticket created at `created_at`.
pub fn compute_deadline(created_at: DateTime<Utc>, priority: Priority) -> DateTime<Utc> {
    created_at + Duration::hours(sla_hours(priority))
}
