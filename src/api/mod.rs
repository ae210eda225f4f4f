//! Backend REST API
//!
//! Client side of the booking backend's JSON API.
//!
//! ## Endpoints
//!
//! - `GET /api/admin/stats`, `GET /api/admin/tables?date=`,
//!   `GET /api/admin/bookings?date=`, `GET /api/admin/events`,
//!   `GET /api/admin/guests`
//! - `POST /api/admin/tables/book`, `POST /api/admin/tables/occupy`,
//!   `POST /api/admin/tables/{no}/free`, `POST /api/admin/bookings/{id}/status`
//! - `POST|PUT|DELETE /api/admin/events[/{id}]`
//! - `POST /api/admin/guests/{id}/discount`, `POST /api/admin/guests/{id}/notes`
//! - `GET /api/bootstrap`, `POST /api/bookings`, `POST /api/bookings/{id}/cancel`

mod client;
pub mod dto;
mod error;
#[cfg(test)]
pub(crate) mod fake;

pub use client::{Backend, BackendClient};
pub use dto::{
    AdminBooking, Bootstrap, CreateBookingRequest, CreatedBooking, DashboardStats, Event,
    EventInput, Guest, GuestBooking, MenuItem, Promotion, TableBooking, TablesResponse,
};
pub use error::{ApiError, ApiResult};
