//! Guest Page Rendering
//!
//! Every guest region is derived from the one bootstrap snapshot.

use chrono::{Duration, NaiveDateTime};
use std::fmt::Write;

use crate::api::{Bootstrap, GuestBooking, MenuItem, Promotion};
use crate::config::VenueConfig;
use crate::domain::loyalty;
use crate::domain::{guest_can_cancel, BookingStatus};

pub fn render_home(data: &Bootstrap, venue: &VenueConfig) -> String {
    let visits = data.visits.unwrap_or(0);
    let discount = loyalty::personal_discount(data.notes.as_ref());

    let mut out = String::new();
    let _ = writeln!(out, "Visits: {}", visits);
    let _ = writeln!(
        out,
        "Until next bonus: {}",
        loyalty::visits_until_bonus(visits)
    );
    let _ = writeln!(
        out,
        "Loyalty: {}% ({}/{} to a free hookah)",
        loyalty::progress_percent(visits),
        visits,
        loyalty::FULL_REWARD_VISITS
    );
    if discount > 0 {
        let _ = writeln!(out, "Personal discount: {} RUB", discount);
    } else {
        out.push_str("No personal discount\n");
    }
    let schedule = data
        .schedule
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(&venue.schedule);
    let _ = writeln!(out, "Open: {}", schedule);
    out
}

pub fn render_promotions(promotions: &[Promotion]) -> String {
    if promotions.is_empty() {
        return "No promotions yet\n".to_string();
    }
    let mut out = String::new();
    for p in promotions {
        let _ = writeln!(out, "* {}", p.title);
        if let Some(description) = p.description.as_deref().filter(|d| !d.is_empty()) {
            let _ = writeln!(out, "  {}", description);
        }
    }
    out
}

pub fn render_menu(menu: &[MenuItem]) -> String {
    if menu.is_empty() {
        return "Menu is loading...\n".to_string();
    }
    menu.iter()
        .map(|m| match m.description.as_deref().filter(|d| !d.is_empty()) {
            Some(description) => format!("{}  {}\n", m.title, description),
            None => format!("{}\n", m.title),
        })
        .collect()
}

pub fn render_contacts(venue: &VenueConfig) -> String {
    let mut out = format!("{}\nPhone: {}\n", venue.name, venue.phone);
    if let Some(map_url) = &venue.map_url {
        let _ = writeln!(out, "Map: {}", map_url);
    }
    out
}

/// The guest's own bookings
///
/// A cancel marker is shown only where [`guest_can_cancel`] allows it
/// at `now`.
pub fn render_guest_bookings(
    bookings: &[GuestBooking],
    now: NaiveDateTime,
    threshold: Duration,
) -> String {
    if bookings.is_empty() {
        return "No bookings yet\n".to_string();
    }

    let mut out = String::new();
    for b in bookings {
        let _ = writeln!(out, "#{} | Table {}", b.id, b.table_no);
        let _ = writeln!(out, "  Booked for: {}", b.booking_at.format("%d.%m %H:%M"));
        if let Some(created) = b.created_at {
            let _ = writeln!(out, "  Created:    {}", created.format("%d.%m %H:%M"));
        }
        let _ = writeln!(out, "  {} {}", status_icon(&b.status), b.status.label());
        if guest_can_cancel(&b.status, b.booking_at, now, threshold) {
            let _ = writeln!(out, "  [cancel {}]", b.id);
        }
    }
    out
}

fn status_icon(status: &BookingStatus) -> &'static str {
    match status {
        BookingStatus::Confirmed => "[ok]",
        BookingStatus::Completed => "[done]",
        BookingStatus::Canceled => "[x]",
        _ => "[..]",
    }
}
