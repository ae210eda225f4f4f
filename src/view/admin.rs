//! Admin Dashboard Rendering
//!
//! Pure functions from a backend snapshot to the text of one region.
//! Identical snapshots always render to identical text.

use chrono::NaiveDate;
use std::fmt::Write;

use super::notice::Notice;
use crate::api::{AdminBooking, DashboardStats, Event, Guest, TablesResponse};
use crate::domain::time::parse_wall_clock;
use crate::domain::{admin_actions, table_status, NoticeTone};

pub fn render_stats(stats: &DashboardStats, table_count: u32) -> String {
    let mut out = String::from("Today\n");
    let _ = writeln!(out, "  Bookings:      {}", stats.total_bookings.unwrap_or(0));
    let _ = writeln!(out, "  In restaurant: {}", stats.now_in_restaurant.unwrap_or(0));
    let _ = writeln!(out, "  Expecting:     {}", stats.expecting.unwrap_or(0));
    let _ = writeln!(out, "  Free tables:   {}", stats.free_tables.unwrap_or(table_count));
    out
}

/// Tables grid for the selected date; tables without bookings are free
pub fn render_tables(tables: &TablesResponse, table_count: u32, date: NaiveDate) -> String {
    let mut out = format!("Tables on {}\n", date.format("%Y-%m-%d"));
    for table_no in 1..=table_count {
        let bookings = tables.bookings_for(table_no);
        let status = table_status(bookings);
        let _ = write!(out, "  Table {:>2}  {:<9}", table_no, status.label());
        if !bookings.is_empty() {
            let _ = write!(out, " ({} booking{})", bookings.len(), plural(bookings.len()));
        }
        out.push('\n');
    }
    out
}

/// Calendar of bookings for the selected date with the admin actions
/// offered for each
pub fn render_calendar(date: NaiveDate, bookings: &[AdminBooking]) -> String {
    let mut out = format!("Bookings for {}\n", date.format("%Y-%m-%d"));
    if bookings.is_empty() {
        out.push_str("  No bookings for this day\n");
        return out;
    }

    for b in bookings {
        let actions: Vec<&str> = admin_actions(&b.status).iter().map(|a| a.name()).collect();
        let _ = write!(
            out,
            "  #{:<5} {}  table {}  {} guest{}  {}  ({})",
            b.id,
            b.booking_at.format("%H:%M"),
            b.table_no,
            b.guests,
            plural(b.guests as usize),
            b.client_name.as_deref().filter(|n| !n.is_empty()).unwrap_or("Guest"),
            b.status.label(),
        );
        if !actions.is_empty() {
            let _ = write!(out, "  [{}]", actions.join(", "));
        }
        out.push('\n');
    }
    out
}

pub fn render_events(events: &[Event]) -> String {
    let mut out = String::from("Events\n");
    if events.is_empty() {
        out.push_str("  No events\n");
        return out;
    }

    for e in events {
        let when = parse_wall_clock(&e.datetime)
            .map(|dt| dt.format("%d.%m %H:%M").to_string())
            .unwrap_or_else(|| e.datetime.clone());
        let _ = writeln!(out, "  #{:<5} {}  {}", e.id, e.title, when);
        if let Some(description) = e.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = writeln!(out, "         {}", description);
        }
    }
    out
}

pub fn render_guests<'a, I>(guests: I) -> String
where
    I: IntoIterator<Item = &'a Guest>,
{
    let mut out = String::from("Guests\n");
    let mut any = false;
    for g in guests {
        any = true;
        let _ = writeln!(
            out,
            "  #{:<5} {}  {}  {} visit{}  discount {}",
            g.id,
            g.display_name(),
            g.phone.as_deref().filter(|p| !p.is_empty()).unwrap_or("—"),
            g.visits(),
            plural(g.visits() as usize),
            g.discount(),
        );
    }
    if !any {
        out.push_str("  No guests found\n");
    }
    out
}

pub fn render_notices(notices: &[Notice]) -> String {
    notices
        .iter()
        .map(|n| {
            let marker = match n.tone {
                NoticeTone::Success => "+",
                NoticeTone::Danger => "!",
                NoticeTone::Accent => "*",
            };
            format!("[{}] {}\n", marker, n.title)
        })
        .collect()
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}
