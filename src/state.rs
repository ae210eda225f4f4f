//! Application State
//!
//! The few values the views depend on besides backend snapshots. Every
//! change goes through a named operation so refreshes can read a
//! consistent copy.

use chrono::{Duration, NaiveDate};

use crate::api::{AdminBooking, Bootstrap, Guest};
use crate::host::HostUser;

/// Admin dashboard state
#[derive(Debug, Clone)]
pub struct AdminState {
    date: NaiveDate,
    guest_query: String,
    guests: Vec<Guest>,
    calendar: Vec<AdminBooking>,
}

impl AdminState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            guest_query: String::new(),
            guests: Vec::new(),
            calendar: Vec::new(),
        }
    }

    /// Date shown on the tables grid and the calendar
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
    }

    /// Move the selected date by whole days; out-of-range moves are ignored
    pub fn shift_date(&mut self, days: i64) -> NaiveDate {
        if let Some(date) = self.date.checked_add_signed(Duration::days(days)) {
            self.date = date;
        }
        self.date
    }

    pub fn guest_query(&self) -> &str {
        &self.guest_query
    }

    pub fn set_guest_query(&mut self, query: impl Into<String>) {
        self.guest_query = query.into().trim().to_string();
    }

    pub fn store_guests(&mut self, guests: Vec<Guest>) {
        self.guests = guests;
    }

    pub fn store_calendar(&mut self, bookings: Vec<AdminBooking>) {
        self.calendar = bookings;
    }

    pub fn calendar(&self) -> &[AdminBooking] {
        &self.calendar
    }

    pub fn guests(&self) -> &[Guest] {
        &self.guests
    }

    pub fn find_booking(&self, id: i64) -> Option<&AdminBooking> {
        self.calendar.iter().find(|b| b.id == id)
    }

    pub fn find_guest(&self, id: i64) -> Option<&Guest> {
        self.guests.iter().find(|g| g.id == id)
    }

    /// Guests matching the search query by name (case-insensitive) or phone
    pub fn filtered_guests(&self) -> Vec<&Guest> {
        if self.guest_query.is_empty() {
            return self.guests.iter().collect();
        }
        let needle = self.guest_query.to_lowercase();
        self.guests
            .iter()
            .filter(|g| {
                g.name
                    .as_deref()
                    .map(|n| n.to_lowercase().contains(&needle))
                    .unwrap_or(false)
                    || g.phone
                        .as_deref()
                        .map(|p| p.contains(&self.guest_query))
                        .unwrap_or(false)
            })
            .collect()
    }
}

/// Guest page state
#[derive(Debug, Clone, Default)]
pub struct GuestState {
    user: Option<HostUser>,
    bootstrap: Option<Bootstrap>,
}

impl GuestState {
    pub fn new(user: Option<HostUser>) -> Self {
        Self {
            user,
            bootstrap: None,
        }
    }

    pub fn user(&self) -> Option<&HostUser> {
        self.user.as_ref()
    }

    pub fn set_user(&mut self, user: Option<HostUser>) {
        self.user = user;
    }

    pub fn bootstrap(&self) -> Option<&Bootstrap> {
        self.bootstrap.as_ref()
    }

    pub fn store_bootstrap(&mut self, data: Bootstrap) {
        self.bootstrap = Some(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guest(id: i64, name: Option<&str>, phone: Option<&str>) -> Guest {
        Guest {
            id,
            name: name.map(str::to_string),
            phone: phone.map(str::to_string),
            visits: None,
            personal_discount: None,
        }
    }

    #[test]
    fn test_shift_date() {
        let mut state = AdminState::new(NaiveDate::from_ymd_opt(2026, 10, 31).unwrap());
        assert_eq!(state.shift_date(1), NaiveDate::from_ymd_opt(2026, 11, 1).unwrap());
        assert_eq!(state.shift_date(-2), NaiveDate::from_ymd_opt(2026, 10, 30).unwrap());

        let mut edge = AdminState::new(NaiveDate::MAX);
        assert_eq!(edge.shift_date(1), NaiveDate::MAX);
    }

    #[test]
    fn test_guest_filter() {
        let mut state = AdminState::new(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap());
        state.store_guests(vec![
            guest(1, Some("Anna Petrova"), Some("+79990001122")),
            guest(2, Some("Ivan"), None),
            guest(3, None, Some("+79995550000")),
        ]);

        assert_eq!(state.filtered_guests().len(), 3);

        state.set_guest_query("  anna ");
        let ids: Vec<i64> = state.filtered_guests().iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![1]);

        state.set_guest_query("555");
        let ids: Vec<i64> = state.filtered_guests().iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![3]);

        state.set_guest_query("nobody");
        assert!(state.filtered_guests().is_empty());
    }
}
