//! Data Transfer Objects
//!
//! Request and response types for the booking backend REST API.
//! Snapshots are taken wholesale on every refresh; nothing here is merged.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::time;
use crate::domain::{BookingStatus, TableMark};

// ============================================
// Admin dashboard
// ============================================

/// Today's headline numbers
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_bookings: Option<u32>,
    #[serde(default)]
    pub now_in_restaurant: Option<u32>,
    #[serde(default)]
    pub expecting: Option<u32>,
    #[serde(default)]
    pub free_tables: Option<u32>,
}

/// Bookings touching each table on the selected date
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TablesResponse {
    #[serde(default)]
    pub tables: BTreeMap<u32, Vec<TableBooking>>,
}

impl TablesResponse {
    /// Bookings for one table (empty when the table has none)
    pub fn bookings_for(&self, table_no: u32) -> &[TableBooking] {
        self.tables.get(&table_no).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// A booking as seen from the tables grid
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TableBooking {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "time::deserialize_opt")]
    pub booking_at: Option<NaiveDateTime>,
    pub status: BookingStatus,
    #[serde(default)]
    pub is_occupied: bool,
    #[serde(default)]
    pub is_blocked: bool,
}

impl TableMark for TableBooking {
    fn is_blocked(&self) -> bool {
        self.is_blocked
    }

    fn is_occupied(&self) -> bool {
        self.is_occupied
    }

    fn status(&self) -> &BookingStatus {
        &self.status
    }
}

/// A booking as listed on the admin calendar
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AdminBooking {
    pub id: i64,
    #[serde(deserialize_with = "time::deserialize")]
    pub booking_at: NaiveDateTime,
    pub table_no: u32,
    pub guests: u32,
    #[serde(default)]
    pub client_name: Option<String>,
    pub status: BookingStatus,
}

/// A venue event (stored by the backend as a promotion)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub datetime: String,
}

/// Body for creating or editing an event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventInput {
    pub title: String,
    pub description: String,
    pub datetime: String,
}

/// A guest in the CRM list
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Guest {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub visits: Option<u32>,
    #[serde(default)]
    pub personal_discount: Option<i64>,
}

impl Guest {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or("Guest")
    }

    pub fn visits(&self) -> u32 {
        self.visits.unwrap_or(0)
    }

    pub fn discount(&self) -> i64 {
        self.personal_discount.unwrap_or(0)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminBookTableRequest<'a> {
    pub table_no: u32,
    pub datetime: &'a str,
    pub guests: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct OccupyTableRequest {
    pub table_no: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct FreeTableRequest {
    pub close_all: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusChangeRequest<'a> {
    pub status: &'a BookingStatus,
}

#[derive(Debug, Serialize)]
pub(crate) struct DiscountRequest {
    pub discount: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct NotesRequest<'a> {
    pub notes: &'a str,
}

// ============================================
// Guest pages
// ============================================

/// Everything the guest pages need, fetched once per page load
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Bootstrap {
    #[serde(default)]
    pub visits: Option<u32>,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub contacts: Option<String>,
    #[serde(default)]
    pub notes: Option<serde_json::Value>,
    #[serde(default)]
    pub promotions: Vec<Promotion>,
    #[serde(default)]
    pub menu: Vec<MenuItem>,
    #[serde(default)]
    pub bookings: Vec<GuestBooking>,
    #[serde(default)]
    pub loyalty_rule: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Promotion {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MenuItem {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One of the guest's own bookings
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GuestBooking {
    pub id: i64,
    #[serde(deserialize_with = "time::deserialize")]
    pub booking_at: NaiveDateTime,
    #[serde(default, deserialize_with = "time::deserialize_opt")]
    pub created_at: Option<NaiveDateTime>,
    pub table_no: u32,
    #[serde(default)]
    pub guests: Option<u32>,
    pub status: BookingStatus,
}

/// Guest booking form payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateBookingRequest {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub phone: String,
    pub date_time: String,
    pub table_no: u32,
    pub guests: u32,
    pub comment: Option<String>,
}

/// Backend reply to a created booking
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedBooking {
    pub id: i64,
    #[serde(default)]
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CancelBookingRequest {
    pub telegram_id: i64,
}

/// Error body returned by the backend
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Human-readable detail, if the backend sent one
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}
