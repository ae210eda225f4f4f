//! Booking and Table Status Rules
//!
//! The derived view rules shared by the admin dashboard and the guest
//! pages: table status precedence, the admin action set per booking
//! status, and the guest cancellation window.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a booking
///
/// The backend sends English codes on admin endpoints and localized labels
/// on the guest bootstrap; both map onto the same variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Canceled,
    /// Any status string this client does not know
    Other(String),
}

impl BookingStatus {
    /// Wire code sent back to the backend
    pub fn code(&self) -> &str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Canceled => "canceled",
            BookingStatus::Other(s) => s,
        }
    }

    /// Human label used in rendered views
    pub fn label(&self) -> &str {
        match self {
            BookingStatus::Pending => "Awaiting",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Completed => "Closed",
            BookingStatus::Canceled => "Canceled",
            BookingStatus::Other(s) => s,
        }
    }

    /// Whether this booking still holds its table
    pub fn is_active(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    /// Strict lifecycle transitions
    ///
    /// Canceled is terminal. This is the state machine proper; the buttons
    /// actually offered on the admin calendar are [`admin_actions`].
    pub fn transitions(&self) -> Vec<BookingStatus> {
        match self {
            BookingStatus::Pending => vec![BookingStatus::Confirmed, BookingStatus::Canceled],
            BookingStatus::Confirmed => vec![BookingStatus::Canceled, BookingStatus::Completed],
            BookingStatus::Completed => vec![BookingStatus::Pending],
            BookingStatus::Canceled | BookingStatus::Other(_) => Vec::new(),
        }
    }
}

impl From<String> for BookingStatus {
    fn from(s: String) -> Self {
        let known = match s.trim() {
            "pending" | "Ожидает подтверждения" => Some(BookingStatus::Pending),
            "confirmed" | "Бронь подтверждена" => Some(BookingStatus::Confirmed),
            "completed" | "Выполнена" => Some(BookingStatus::Completed),
            "canceled" | "cancelled" | "Отменена" => Some(BookingStatus::Canceled),
            _ => None,
        };
        known.unwrap_or(BookingStatus::Other(s))
    }
}

impl From<&str> for BookingStatus {
    fn from(s: &str) -> Self {
        BookingStatus::from(s.to_string())
    }
}

impl From<BookingStatus> for String {
    fn from(status: BookingStatus) -> Self {
        status.code().to_string()
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Admin-side action on a calendar booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminAction {
    Confirm,
    Cancel,
    Complete,
    Reopen,
}

impl AdminAction {
    /// Status the booking moves to when the action is applied
    pub fn target_status(self) -> BookingStatus {
        match self {
            AdminAction::Confirm => BookingStatus::Confirmed,
            AdminAction::Cancel => BookingStatus::Canceled,
            AdminAction::Complete => BookingStatus::Completed,
            AdminAction::Reopen => BookingStatus::Pending,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AdminAction::Confirm => "confirm",
            AdminAction::Cancel => "cancel",
            AdminAction::Complete => "complete",
            AdminAction::Reopen => "reopen",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "confirm" => Some(AdminAction::Confirm),
            "cancel" => Some(AdminAction::Cancel),
            "complete" | "close" => Some(AdminAction::Complete),
            "reopen" => Some(AdminAction::Reopen),
            _ => None,
        }
    }
}

impl fmt::Display for AdminAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Actions offered on the admin calendar for a booking
///
/// Cancel is offered for every status except canceled, completed included.
/// That asymmetry with [`BookingStatus::transitions`] is kept on purpose.
pub fn admin_actions(status: &BookingStatus) -> Vec<AdminAction> {
    match status {
        BookingStatus::Pending => vec![AdminAction::Confirm, AdminAction::Cancel],
        BookingStatus::Confirmed => vec![AdminAction::Cancel, AdminAction::Complete],
        BookingStatus::Completed => vec![AdminAction::Cancel, AdminAction::Reopen],
        BookingStatus::Canceled => Vec::new(),
        BookingStatus::Other(_) => vec![AdminAction::Cancel],
    }
}

/// Display status of a table for the selected date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableStatus {
    Free,
    Booked,
    Occupied,
    Blocked,
}

impl TableStatus {
    pub fn label(self) -> &'static str {
        match self {
            TableStatus::Free => "Free",
            TableStatus::Booked => "Booked",
            TableStatus::Occupied => "Occupied",
            TableStatus::Blocked => "Blocked",
        }
    }
}

/// The per-booking facts a table status is derived from
pub trait TableMark {
    fn is_blocked(&self) -> bool;
    fn is_occupied(&self) -> bool;
    fn status(&self) -> &BookingStatus;
}

/// Derive a table's status: blocked > occupied > booked > free
///
/// Only pending and confirmed bookings mark a table as booked.
pub fn table_status<T: TableMark>(bookings: &[T]) -> TableStatus {
    if bookings.iter().any(|b| b.is_blocked()) {
        TableStatus::Blocked
    } else if bookings.iter().any(|b| b.is_occupied()) {
        TableStatus::Occupied
    } else if bookings.iter().any(|b| b.status().is_active()) {
        TableStatus::Booked
    } else {
        TableStatus::Free
    }
}

/// Whether a guest may cancel their own booking
///
/// Advisory UI gating only: the backend enforces the real rule.
pub fn guest_can_cancel(
    status: &BookingStatus,
    booking_at: NaiveDateTime,
    now: NaiveDateTime,
    threshold: Duration,
) -> bool {
    *status == BookingStatus::Pending && booking_at - now > threshold
}

/// Colour family for a live booking notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeTone {
    Success,
    Danger,
    Accent,
}

pub fn notice_tone(status: &BookingStatus) -> NoticeTone {
    match status {
        BookingStatus::Confirmed => NoticeTone::Success,
        BookingStatus::Canceled => NoticeTone::Danger,
        _ => NoticeTone::Accent,
    }
}
