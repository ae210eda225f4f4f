//! Backend REST API Client
//!
//! [`Backend`] is the seam every view refresh and action goes through;
//! [`BackendClient`] implements it over HTTP with `reqwest`.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::dto::*;
use super::error::{ApiError, ApiResult};
use crate::config::BackendConfig;
use crate::domain::BookingStatus;

/// Operations the booking backend exposes to this client
#[async_trait]
pub trait Backend: Send + Sync {
    // Admin reads
    async fn stats(&self) -> ApiResult<DashboardStats>;
    async fn tables(&self, date: NaiveDate) -> ApiResult<TablesResponse>;
    async fn bookings(&self, date: NaiveDate) -> ApiResult<Vec<AdminBooking>>;
    async fn events(&self) -> ApiResult<Vec<Event>>;
    async fn guests(&self) -> ApiResult<Vec<Guest>>;

    // Admin writes
    async fn book_table(&self, table_no: u32, datetime: &str, guests: u32) -> ApiResult<()>;
    async fn occupy_table(&self, table_no: u32) -> ApiResult<()>;
    async fn free_table(&self, table_no: u32, close_all: bool) -> ApiResult<()>;
    async fn set_booking_status(&self, booking_id: i64, status: &BookingStatus) -> ApiResult<()>;
    async fn create_event(&self, input: &EventInput) -> ApiResult<()>;
    async fn update_event(&self, event_id: i64, input: &EventInput) -> ApiResult<()>;
    async fn delete_event(&self, event_id: i64) -> ApiResult<()>;
    async fn set_guest_discount(&self, guest_id: i64, discount: i64) -> ApiResult<()>;
    async fn save_guest_notes(&self, guest_id: i64, notes: &str) -> ApiResult<()>;

    // Guest pages
    async fn bootstrap(
        &self,
        telegram_id: i64,
        username: &str,
        full_name: &str,
    ) -> ApiResult<Bootstrap>;
    async fn create_booking(&self, request: &CreateBookingRequest) -> ApiResult<CreatedBooking>;
    async fn cancel_booking(&self, booking_id: i64, telegram_id: i64) -> ApiResult<()>;
}

/// HTTP implementation of [`Backend`]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    /// Create a new client with the given configuration
    pub fn new(config: &BackendConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.normalized_base(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> ApiResult<Response> {
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ApiError::from_transport)?;
        check_status(response).await
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<()> {
        self.send_json(Method::POST, &self.url(path), Some(body))
            .await
            .map(|_| ())
    }
}

/// Turn a non-success reply into [`ApiError::Status`], keeping the
/// backend's `detail` text when it sent one
async fn check_status(response: Response) -> ApiResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| body.message())
        .unwrap_or(text);

    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

fn date_param(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[async_trait]
impl Backend for BackendClient {
    async fn stats(&self) -> ApiResult<DashboardStats> {
        self.get_json(&self.url("/api/admin/stats")).await
    }

    async fn tables(&self, date: NaiveDate) -> ApiResult<TablesResponse> {
        let url = format!("{}?date={}", self.url("/api/admin/tables"), date_param(date));
        self.get_json(&url).await
    }

    async fn bookings(&self, date: NaiveDate) -> ApiResult<Vec<AdminBooking>> {
        let url = format!("{}?date={}", self.url("/api/admin/bookings"), date_param(date));
        self.get_json(&url).await
    }

    async fn events(&self) -> ApiResult<Vec<Event>> {
        self.get_json(&self.url("/api/admin/events")).await
    }

    async fn guests(&self) -> ApiResult<Vec<Guest>> {
        self.get_json(&self.url("/api/admin/guests")).await
    }

    async fn book_table(&self, table_no: u32, datetime: &str, guests: u32) -> ApiResult<()> {
        let body = AdminBookTableRequest {
            table_no,
            datetime,
            guests,
        };
        self.post("/api/admin/tables/book", &body).await
    }

    async fn occupy_table(&self, table_no: u32) -> ApiResult<()> {
        self.post("/api/admin/tables/occupy", &OccupyTableRequest { table_no })
            .await
    }

    async fn free_table(&self, table_no: u32, close_all: bool) -> ApiResult<()> {
        let path = format!("/api/admin/tables/{}/free", table_no);
        self.post(&path, &FreeTableRequest { close_all }).await
    }

    async fn set_booking_status(&self, booking_id: i64, status: &BookingStatus) -> ApiResult<()> {
        let path = format!("/api/admin/bookings/{}/status", booking_id);
        self.post(&path, &StatusChangeRequest { status }).await
    }

    async fn create_event(&self, input: &EventInput) -> ApiResult<()> {
        self.post("/api/admin/events", input).await
    }

    async fn update_event(&self, event_id: i64, input: &EventInput) -> ApiResult<()> {
        let url = self.url(&format!("/api/admin/events/{}", event_id));
        self.send_json(Method::PUT, &url, Some(input))
            .await
            .map(|_| ())
    }

    async fn delete_event(&self, event_id: i64) -> ApiResult<()> {
        let url = self.url(&format!("/api/admin/events/{}", event_id));
        self.send_json::<()>(Method::DELETE, &url, None)
            .await
            .map(|_| ())
    }

    async fn set_guest_discount(&self, guest_id: i64, discount: i64) -> ApiResult<()> {
        let path = format!("/api/admin/guests/{}/discount", guest_id);
        self.post(&path, &DiscountRequest { discount }).await
    }

    async fn save_guest_notes(&self, guest_id: i64, notes: &str) -> ApiResult<()> {
        let path = format!("/api/admin/guests/{}/notes", guest_id);
        self.post(&path, &NotesRequest { notes }).await
    }

    async fn bootstrap(
        &self,
        telegram_id: i64,
        username: &str,
        full_name: &str,
    ) -> ApiResult<Bootstrap> {
        let url = format!(
            "{}?telegram_id={}&username={}&full_name={}",
            self.url("/api/bootstrap"),
            telegram_id,
            urlencoding::encode(username),
            urlencoding::encode(full_name),
        );
        self.get_json(&url).await
    }

    async fn create_booking(&self, request: &CreateBookingRequest) -> ApiResult<CreatedBooking> {
        let response = self
            .send_json(Method::POST, &self.url("/api/bookings"), Some(request))
            .await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn cancel_booking(&self, booking_id: i64, telegram_id: i64) -> ApiResult<()> {
        let path = format!("/api/bookings/{}/cancel", booking_id);
        self.post(&path, &CancelBookingRequest { telegram_id }).await
    }
}
