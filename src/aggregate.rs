//! Read-only derivations over a ticket collection.
//!
//! Everything here is a pure function of the tickets and an evaluation
//! instant. Nothing is cached: an unresolved ticket's breach status changes
//! as time passes without the ticket itself changing.

use crate::models::sla::sla_hours;
use crate::models::{Ticket, TicketStatus};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether a ticket has missed its SLA as of `now`.
///
/// Resolved tickets are judged on their resolution instant, so `now` is
/// ignored for them. Both comparisons are strict: finishing exactly on the
/// deadline is compliant.
pub fn is_breached(ticket: &Ticket, now: DateTime<Utc>) -> bool {
    match (ticket.status, ticket.resolved_at) {
        (TicketStatus::Resolved, Some(resolved_at)) => resolved_at > ticket.sla_deadline,
        // Resolved without a timestamp: judge on `now` like an open ticket.
        _ => now > ticket.sla_deadline,
    }
}

/// A span of time split into whole hours and leftover minutes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElapsedTime {
    pub hours: i64,
    pub minutes: i64,
}

impl ElapsedTime {
    /// Absolute distance between two instants, floored to the minute.
    pub fn between(a: DateTime<Utc>, b: DateTime<Utc>) -> Self {
        let total_minutes = (b - a).num_minutes().abs();
        Self {
            hours: total_minutes / 60,
            minutes: total_minutes % 60,
        }
    }

    /// Fractional hours, as used by the resolution-time average.
    pub fn as_hours_f64(&self) -> f64 {
        self.hours as f64 + self.minutes as f64 / 60.0
    }
}

/// Distance between `now` and the SLA deadline of an unresolved ticket.
///
/// Whether this is time left or time overdue depends on [`is_breached`];
/// [`sla_clock`] combines the two.
pub fn time_remaining(ticket: &Ticket, now: DateTime<Utc>) -> ElapsedTime {
    ElapsedTime::between(now, ticket.sla_deadline)
}

/// Time from creation to resolution. `None` for unresolved tickets.
pub fn resolution_time(ticket: &Ticket) -> Option<ElapsedTime> {
    if ticket.status != TicketStatus::Resolved {
        return None;
    }
    ticket
        .resolved_at
        .map(|resolved_at| ElapsedTime::between(ticket.created_at, resolved_at))
}

/// Where a ticket stands against its SLA at an instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SlaClock {
    /// Unresolved, deadline not yet passed
    Remaining(ElapsedTime),
    /// Unresolved, deadline passed
    Overdue(ElapsedTime),
    /// Resolved; time from creation to resolution
    ResolvedIn(ElapsedTime),
}

pub fn sla_clock(ticket: &Ticket, now: DateTime<Utc>) -> SlaClock {
    if let Some(elapsed) = resolution_time(ticket) {
        return SlaClock::ResolvedIn(elapsed);
    }
    let distance = time_remaining(ticket, now);
    if is_breached(ticket, now) {
        SlaClock::Overdue(distance)
    } else {
        SlaClock::Remaining(distance)
    }
}

/// View selector for ticket listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketFilter {
    #[default]
    All,
    Open,
    InProgress,
    Resolved,
    Breached,
}

impl TicketFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketFilter::All => "all",
            TicketFilter::Open => "open",
            TicketFilter::InProgress => "in_progress",
            TicketFilter::Resolved => "resolved",
            TicketFilter::Breached => "breached",
        }
    }

    pub fn matches(&self, ticket: &Ticket, now: DateTime<Utc>) -> bool {
        match self {
            TicketFilter::All => true,
            TicketFilter::Open => ticket.status == TicketStatus::Open,
            TicketFilter::InProgress => ticket.status == TicketStatus::InProgress,
            TicketFilter::Resolved => ticket.status == TicketStatus::Resolved,
            TicketFilter::Breached => is_breached(ticket, now),
        }
    }
}

impl fmt::Display for TicketFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TicketFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(TicketFilter::All),
            "open" => Ok(TicketFilter::Open),
            "in_progress" | "in-progress" | "inprogress" => Ok(TicketFilter::InProgress),
            "resolved" => Ok(TicketFilter::Resolved),
            "breached" => Ok(TicketFilter::Breached),
            _ => Err(Error::InvalidInput(format!(
                "Invalid filter '{}'. Valid filters: all, open, in_progress, resolved, breached",
                s
            ))),
        }
    }
}

/// Tickets matching `filter` at `now`, in their original order.
pub fn filter<'a>(
    tickets: &'a [Ticket],
    filter: TicketFilter,
    now: DateTime<Utc>,
) -> Vec<&'a Ticket> {
    tickets.iter().filter(|t| filter.matches(t, now)).collect()
}

/// Fleet-wide performance figures at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub total: usize,
    pub open: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub breached: usize,
    /// Percentage of resolved tickets that met their SLA, one decimal.
    /// `100.0` when nothing is resolved yet, which means "no data" rather
    /// than "fully compliant".
    pub sla_compliance: f64,
    /// Mean hours from creation to resolution, one decimal. `0.0` when
    /// nothing is resolved.
    pub avg_resolution_time: f64,
}

/// Compute KPIs over the full collection at `now`.
pub fn kpis(tickets: &[Ticket], now: DateTime<Utc>) -> KpiSummary {
    let mut summary = KpiSummary {
        total: tickets.len(),
        open: 0,
        in_progress: 0,
        resolved: 0,
        breached: 0,
        sla_compliance: 100.0,
        avg_resolution_time: 0.0,
    };

    let mut resolved_on_time = 0usize;
    let mut resolution_hours = 0.0f64;

    for ticket in tickets {
        let breached = is_breached(ticket, now);
        if breached {
            summary.breached += 1;
        }
        match ticket.status {
            TicketStatus::Open => summary.open += 1,
            TicketStatus::InProgress => summary.in_progress += 1,
            TicketStatus::Resolved => {
                summary.resolved += 1;
                if !breached {
                    resolved_on_time += 1;
                }
                if let Some(elapsed) = resolution_time(ticket) {
                    resolution_hours += elapsed.as_hours_f64();
                }
            }
        }
    }

    if summary.resolved > 0 {
        let resolved = summary.resolved as f64;
        summary.sla_compliance = round_one_decimal(resolved_on_time as f64 / resolved * 100.0);
        summary.avg_resolution_time = round_one_decimal(resolution_hours / resolved);
    }

    summary
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// A ticket together with the values derived from it at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketView {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub sla_hours: i64,
    pub breached: bool,
    pub sla_clock: SlaClock,
}

impl TicketView {
    pub fn at(ticket: &Ticket, now: DateTime<Utc>) -> Self {
        Self {
            ticket: ticket.clone(),
            sla_hours: sla_hours(ticket.priority),
            breached: is_breached(ticket, now),
            sla_clock: sla_clock(ticket, now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewTicket, Priority};
    use crate::store::{ManualClock, TicketStore};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap()
    }

    fn store() -> TicketStore<ManualClock> {
        TicketStore::with_clock(ManualClock::new(t0()))
    }

    /// The worked example: a critical ticket resolved in 2h and a low one
    /// resolved after 80h.
    fn worked_example() -> TicketStore<ManualClock> {
        let mut store = store();
        let critical = store
            .create(NewTicket::new("critical").with_priority(Priority::Critical))
            .unwrap();
        let low = store
            .create(NewTicket::new("low").with_priority(Priority::Low))
            .unwrap();

        store.clock().set(t0() + Duration::hours(2));
        store.transition(&critical.id, TicketStatus::Resolved).unwrap();
        store.clock().set(t0() + Duration::hours(80));
        store.transition(&low.id, TicketStatus::Resolved).unwrap();
        store
    }

    #[test]
    fn test_unresolved_breach_is_monotonic() {
        let mut store = store();
        let ticket = store
            .create(NewTicket::new("t").with_priority(Priority::High))
            .unwrap();

        assert!(!is_breached(&ticket, t0()));
        assert!(!is_breached(&ticket, t0() + Duration::hours(4)));
        assert!(!is_breached(&ticket, ticket.sla_deadline));
        for later in [1, 60, 3600, 86_400 * 30] {
            assert!(is_breached(
                &ticket,
                ticket.sla_deadline + Duration::seconds(later)
            ));
        }
    }

    #[test]
    fn test_resolved_breach_ignores_now() {
        let store = worked_example();
        let tickets = store.list();
        let low = tickets.iter().find(|t| t.title == "low").unwrap();
        let critical = tickets.iter().find(|t| t.title == "critical").unwrap();

        for now in [t0(), t0() + Duration::hours(1000)] {
            assert!(is_breached(low, now));
            assert!(!is_breached(critical, now));
        }
    }

    #[test]
    fn test_resolved_exactly_on_deadline_is_compliant() {
        let mut store = store();
        let id = store
            .create(NewTicket::new("t").with_priority(Priority::Critical))
            .unwrap()
            .id;
        store.clock().set(t0() + Duration::hours(4));
        let ticket = store.transition(&id, TicketStatus::Resolved).unwrap();
        assert!(!is_breached(&ticket, t0() + Duration::hours(100)));
    }

    #[test]
    fn test_elapsed_time_floors_to_minute() {
        let end = t0() + Duration::hours(4) + Duration::minutes(30) + Duration::seconds(59);
        assert_eq!(
            ElapsedTime::between(t0(), end),
            ElapsedTime {
                hours: 4,
                minutes: 30
            }
        );
        assert_eq!(ElapsedTime::between(end, t0()), ElapsedTime::between(t0(), end));
    }

    #[test]
    fn test_time_remaining_before_and_after_deadline() {
        let mut store = store();
        let ticket = store
            .create(NewTicket::new("t").with_priority(Priority::Critical))
            .unwrap();

        let before = t0() + Duration::minutes(90);
        assert_eq!(
            time_remaining(&ticket, before),
            ElapsedTime {
                hours: 2,
                minutes: 30
            }
        );
        assert_eq!(
            sla_clock(&ticket, before),
            SlaClock::Remaining(ElapsedTime {
                hours: 2,
                minutes: 30
            })
        );

        let after = t0() + Duration::hours(5) + Duration::minutes(15);
        assert_eq!(
            sla_clock(&ticket, after),
            SlaClock::Overdue(ElapsedTime {
                hours: 1,
                minutes: 15
            })
        );
    }

    #[test]
    fn test_resolution_time() {
        let mut store = store();
        let id = store.create(NewTicket::new("t")).unwrap().id;
        assert!(resolution_time(store.get(&id).unwrap()).is_none());

        store
            .clock()
            .set(t0() + Duration::hours(3) + Duration::minutes(45));
        let ticket = store.transition(&id, TicketStatus::Resolved).unwrap();
        let elapsed = ElapsedTime {
            hours: 3,
            minutes: 45,
        };
        assert_eq!(resolution_time(&ticket), Some(elapsed));
        assert_eq!(sla_clock(&ticket, t0()), SlaClock::ResolvedIn(elapsed));
        assert_eq!(elapsed.as_hours_f64(), 3.75);
    }

    #[test]
    fn test_filter_by_status() {
        let mut store = store();
        let a = store.create(NewTicket::new("a")).unwrap();
        let b = store.create(NewTicket::new("b")).unwrap();
        let c = store.create(NewTicket::new("c")).unwrap();
        store.transition(&b.id, TicketStatus::InProgress).unwrap();
        store.transition(&c.id, TicketStatus::Resolved).unwrap();

        let now = store.now();
        let ids = |f| -> Vec<String> {
            filter(store.list(), f, now)
                .into_iter()
                .map(|t| t.id.clone())
                .collect()
        };

        assert_eq!(ids(TicketFilter::All), vec![c.id.clone(), b.id.clone(), a.id.clone()]);
        assert_eq!(ids(TicketFilter::Open), vec![a.id.clone()]);
        assert_eq!(ids(TicketFilter::InProgress), vec![b.id.clone()]);
        assert_eq!(ids(TicketFilter::Resolved), vec![c.id.clone()]);
        assert!(ids(TicketFilter::Breached).is_empty());
    }

    #[test]
    fn test_breached_filter_grows_with_time() {
        let mut store = store();
        let critical = store
            .create(NewTicket::new("c").with_priority(Priority::Critical))
            .unwrap();
        let high = store
            .create(NewTicket::new("h").with_priority(Priority::High))
            .unwrap();
        store
            .create(NewTicket::new("l").with_priority(Priority::Low))
            .unwrap();
        let snapshot = store.list().to_vec();

        let at = |hours| filter(&snapshot, TicketFilter::Breached, t0() + Duration::hours(hours));
        assert!(at(1).is_empty());

        let after_critical = at(5);
        assert_eq!(after_critical.len(), 1);
        assert_eq!(after_critical[0].id, critical.id);

        let after_high: Vec<&str> = at(9).into_iter().map(|t| t.id.as_str()).collect();
        assert_eq!(after_high.len(), 2);
        assert!(after_high.contains(&high.id.as_str()));

        assert_eq!(at(73).len(), 3);
        assert_eq!(snapshot, store.list());
    }

    #[test]
    fn test_breached_filter_matches_is_breached() {
        let store = worked_example();
        let now = t0() + Duration::hours(200);
        let filtered = filter(store.list(), TicketFilter::Breached, now);
        let expected: Vec<&Ticket> = store.list().iter().filter(|t| is_breached(t, now)).collect();
        assert_eq!(filtered, expected);
    }

    #[test]
    fn test_kpis_worked_example() {
        let store = worked_example();
        let summary = kpis(store.list(), t0() + Duration::hours(80));

        assert_eq!(summary.total, 2);
        assert_eq!(summary.resolved, 2);
        assert_eq!(summary.open, 0);
        assert_eq!(summary.in_progress, 0);
        assert_eq!(summary.breached, 1);
        assert_eq!(summary.sla_compliance, 50.0);
        assert_eq!(summary.avg_resolution_time, 41.0);
    }

    #[test]
    fn test_kpis_with_nothing_resolved() {
        let mut store = store();
        store.create(NewTicket::new("a")).unwrap();
        let b = store.create(NewTicket::new("b")).unwrap();
        store.transition(&b.id, TicketStatus::InProgress).unwrap();

        let summary = kpis(store.list(), t0());
        assert_eq!(summary.total, 2);
        assert_eq!(summary.open, 1);
        assert_eq!(summary.in_progress, 1);
        assert_eq!(summary.resolved, 0);
        assert_eq!(summary.sla_compliance, 100.0);
        assert_eq!(summary.avg_resolution_time, 0.0);
    }

    #[test]
    fn test_kpis_empty_collection() {
        let summary = kpis(&[], t0());
        assert_eq!(summary.total, 0);
        assert_eq!(summary.breached, 0);
        assert_eq!(summary.sla_compliance, 100.0);
        assert_eq!(summary.avg_resolution_time, 0.0);
    }

    #[test]
    fn test_kpis_round_to_one_decimal() {
        let mut store = store();
        let ids: Vec<String> = (0..3)
            .map(|i| {
                store
                    .create(NewTicket::new(format!("t{}", i)).with_priority(Priority::Critical))
                    .unwrap()
                    .id
            })
            .collect();

        // Two on time (1h, 1h20m), one late (10h).
        store.clock().set(t0() + Duration::hours(1));
        store.transition(&ids[0], TicketStatus::Resolved).unwrap();
        store.clock().set(t0() + Duration::minutes(80));
        store.transition(&ids[1], TicketStatus::Resolved).unwrap();
        store.clock().set(t0() + Duration::hours(10));
        store.transition(&ids[2], TicketStatus::Resolved).unwrap();

        let summary = kpis(store.list(), store.now());
        assert_eq!(summary.sla_compliance, 66.7);
        // (1 + 1.333 + 10) / 3 = 4.111
        assert_eq!(summary.avg_resolution_time, 4.1);
    }

    #[test]
    fn test_kpis_count_open_breaches() {
        let mut store = store();
        store
            .create(NewTicket::new("late").with_priority(Priority::Critical))
            .unwrap();
        store
            .create(NewTicket::new("fine").with_priority(Priority::Low))
            .unwrap();

        assert_eq!(kpis(store.list(), t0()).breached, 0);
        assert_eq!(kpis(store.list(), t0() + Duration::hours(5)).breached, 1);
        // Open breaches do not affect compliance, which only looks at resolved tickets.
        assert_eq!(kpis(store.list(), t0() + Duration::hours(5)).sla_compliance, 100.0);
    }

    #[test]
    fn test_delete_unknown_leaves_kpis_unchanged() {
        let mut store = worked_example();
        let now = t0() + Duration::hours(100);
        let before = kpis(store.list(), now);
        assert!(!store.delete("tk-abcdef"));
        assert_eq!(kpis(store.list(), now), before);
    }

    #[test]
    fn test_filter_from_str() {
        assert_eq!("breached".parse::<TicketFilter>().unwrap(), TicketFilter::Breached);
        assert_eq!("in-progress".parse::<TicketFilter>().unwrap(), TicketFilter::InProgress);
        assert!("late".parse::<TicketFilter>().is_err());
    }

    #[test]
    fn test_ticket_view_serializes_derived_fields() {
        let mut store = store();
        let ticket = store
            .create(NewTicket::new("t").with_priority(Priority::Critical))
            .unwrap();
        let view = TicketView::at(&ticket, t0() + Duration::hours(6));
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["id"], ticket.id.as_str());
        assert_eq!(json["sla_hours"], 4);
        assert_eq!(json["breached"], true);
        assert_eq!(json["sla_clock"]["state"], "overdue");
        assert_eq!(json["sla_clock"]["hours"], 2);
        assert_eq!(json["sla_clock"]["minutes"], 0);
    }
}
