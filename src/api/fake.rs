//! In-memory [`Backend`] for tests
//!
//! Serves whatever snapshots the test stored and records every call as a
//! short line such as `tables 2026-10-16` or `status 7 confirmed`.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::client::Backend;
use super::dto::*;
use super::error::{ApiError, ApiResult};
use crate::domain::BookingStatus;

#[derive(Default)]
pub struct FakeBackend {
    pub stats: Mutex<DashboardStats>,
    pub tables: Mutex<TablesResponse>,
    pub bookings: Mutex<Vec<AdminBooking>>,
    pub events: Mutex<Vec<Event>>,
    pub guests: Mutex<Vec<Guest>>,
    pub bootstrap: Mutex<Bootstrap>,
    fail_reads: AtomicBool,
    write_error: Mutex<Option<String>>,
    calls: Mutex<Vec<String>>,
}

const READS: &[&str] = &["stats", "tables", "bookings", "events", "guests", "bootstrap"];

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every read fail as if the backend were down
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every write fail with the given `detail`
    pub fn fail_writes(&self, detail: &str) {
        *self.write_error.lock().unwrap() = Some(detail.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that were not reads
    pub fn writes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !READS.contains(&c.split(' ').next().unwrap_or("")))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn read<T: Clone>(&self, call: String, value: &Mutex<T>) -> ApiResult<T> {
        self.calls.lock().unwrap().push(call);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ApiError::Unavailable);
        }
        Ok(value.lock().unwrap().clone())
    }

    fn write(&self, call: String) -> ApiResult<()> {
        self.calls.lock().unwrap().push(call);
        match self.write_error.lock().unwrap().clone() {
            Some(message) => Err(ApiError::Status {
                status: 400,
                message,
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn stats(&self) -> ApiResult<DashboardStats> {
        self.read("stats".into(), &self.stats)
    }

    async fn tables(&self, date: NaiveDate) -> ApiResult<TablesResponse> {
        self.read(format!("tables {}", date), &self.tables)
    }

    async fn bookings(&self, date: NaiveDate) -> ApiResult<Vec<AdminBooking>> {
        self.read(format!("bookings {}", date), &self.bookings)
    }

    async fn events(&self) -> ApiResult<Vec<Event>> {
        self.read("events".into(), &self.events)
    }

    async fn guests(&self) -> ApiResult<Vec<Guest>> {
        self.read("guests".into(), &self.guests)
    }

    async fn book_table(&self, table_no: u32, datetime: &str, guests: u32) -> ApiResult<()> {
        self.write(format!("book {} {} {}", table_no, datetime, guests))
    }

    async fn occupy_table(&self, table_no: u32) -> ApiResult<()> {
        self.write(format!("occupy {}", table_no))
    }

    async fn free_table(&self, table_no: u32, close_all: bool) -> ApiResult<()> {
        self.write(format!("free {} close_all={}", table_no, close_all))
    }

    async fn set_booking_status(&self, booking_id: i64, status: &BookingStatus) -> ApiResult<()> {
        self.write(format!("status {} {}", booking_id, status.code()))
    }

    async fn create_event(&self, input: &EventInput) -> ApiResult<()> {
        self.write(format!("create_event {}", input.title))
    }

    async fn update_event(&self, event_id: i64, input: &EventInput) -> ApiResult<()> {
        self.write(format!("update_event {} {}", event_id, input.title))
    }

    async fn delete_event(&self, event_id: i64) -> ApiResult<()> {
        self.write(format!("delete_event {}", event_id))
    }

    async fn set_guest_discount(&self, guest_id: i64, discount: i64) -> ApiResult<()> {
        self.write(format!("discount {} {}", guest_id, discount))
    }

    async fn save_guest_notes(&self, guest_id: i64, notes: &str) -> ApiResult<()> {
        self.write(format!("notes {} {}", guest_id, notes))
    }

    async fn bootstrap(
        &self,
        telegram_id: i64,
        _username: &str,
        _full_name: &str,
    ) -> ApiResult<Bootstrap> {
        self.read(format!("bootstrap {}", telegram_id), &self.bootstrap)
    }

    async fn create_booking(&self, request: &CreateBookingRequest) -> ApiResult<CreatedBooking> {
        self.write(format!(
            "create_booking {} table {} {}",
            request.phone, request.table_no, request.date_time
        ))?;
        Ok(CreatedBooking {
            id: 42,
            status: Some(BookingStatus::Pending),
        })
    }

    async fn cancel_booking(&self, booking_id: i64, telegram_id: i64) -> ApiResult<()> {
        self.write(format!("cancel_booking {} by {}", booking_id, telegram_id))
    }
}
