//! Action Submitters
//!
//! Each action asks the user first, performs one write, and then refreshes
//! every region whose content the write could change. Booking creation and
//! note saving submit straight from their forms. Failures are shown to the
//! user and never retried.

use chrono::NaiveDate;
use regex::Regex;
use serde_json::json;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

use crate::api::{ApiError, CreateBookingRequest, EventInput};
use crate::domain::time::{now_local, parse_wall_clock};
use crate::domain::{admin_actions, guest_can_cancel, AdminAction};
use crate::host::{Haptic, HostBridge};
use crate::modal::Prompter;
use crate::refresh::Dispatcher;
use crate::view::Region;

const PHONE_PATTERN: &str = r"^\+7\d{10}$";

static PHONE_RE: OnceLock<Option<Regex>> = OnceLock::new();

/// Regions that depend on table occupancy
const TABLE_REGIONS: [Region; 3] = [Region::Tables, Region::Calendar, Region::Stats];

/// Result of one user action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The write succeeded and the affected regions were refreshed
    Done,
    /// The user said no or dismissed the dialog
    Declined,
    /// Input was rejected before any request was made
    Invalid(String),
    /// The backend refused the write or could not be reached
    Failed(String),
}

/// Writes available on the admin dashboard
pub struct AdminActions {
    dispatcher: Arc<Dispatcher>,
    prompter: Arc<dyn Prompter>,
}

impl AdminActions {
    pub fn new(dispatcher: Arc<Dispatcher>, prompter: Arc<dyn Prompter>) -> Self {
        Self {
            dispatcher,
            prompter,
        }
    }

    pub async fn book_table(&self, table_no: u32) -> ActionOutcome {
        let default = now_local().format("%Y-%m-%d %H:%M").to_string();
        let Some(datetime) = self
            .prompter
            .prompt("Booking date and time (YYYY-MM-DD HH:MM):", &default)
            .await
        else {
            return ActionOutcome::Declined;
        };
        let datetime = datetime.trim().to_string();
        if datetime.is_empty() {
            return ActionOutcome::Declined;
        }
        let Some(datetime) = parse_wall_clock(&datetime)
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        else {
            return self
                .invalid("Enter the date and time as YYYY-MM-DD HH:MM")
                .await;
        };

        let guests = self
            .prompter
            .prompt("Number of guests:", "2")
            .await
            .and_then(|g| g.trim().parse::<u32>().ok())
            .filter(|g| *g > 0)
            .unwrap_or(2);

        let backend = self.dispatcher.backend();
        if let Err(e) = backend.book_table(table_no, &datetime, guests).await {
            return self.failed("Failed to book the table", e).await;
        }

        info!(table_no, %datetime, guests, "Table booked");
        self.dispatcher.refresh_many(&TABLE_REGIONS).await;
        self.prompter
            .alert(&format!("Table {} booked for {}", table_no, datetime))
            .await;
        ActionOutcome::Done
    }

    pub async fn occupy_table(&self, table_no: u32) -> ActionOutcome {
        let question = format!("Mark table {} as occupied (walk-in guests)?", table_no);
        if !self.prompter.confirm(&question).await {
            return ActionOutcome::Declined;
        }

        if let Err(e) = self.dispatcher.backend().occupy_table(table_no).await {
            return self.failed("Failed to mark the table", e).await;
        }

        info!(table_no, "Table occupied");
        self.dispatcher.refresh_many(&TABLE_REGIONS).await;
        self.prompter
            .alert(&format!("Table {} marked as occupied", table_no))
            .await;
        ActionOutcome::Done
    }

    /// Free a table either by closing its bookings (guests left) or by
    /// canceling its future bookings
    pub async fn free_table(&self, table_no: u32) -> ActionOutcome {
        let question = format!("Free table {}?", table_no);
        let options = ["Guests left (close bookings)", "Cancel future bookings"];
        let close_all = match self.prompter.choose(&question, &options).await {
            Some(0) => true,
            Some(_) => false,
            None => return ActionOutcome::Declined,
        };

        if let Err(e) = self.dispatcher.backend().free_table(table_no, close_all).await {
            return self.failed("Failed to free the table", e).await;
        }

        info!(table_no, close_all, "Table freed");
        self.dispatcher.refresh_many(&TABLE_REGIONS).await;
        self.prompter
            .alert(&format!("Table {} is free", table_no))
            .await;
        ActionOutcome::Done
    }

    /// Apply a calendar action to a booking on the selected date
    pub async fn change_booking_status(&self, booking_id: i64, action: AdminAction) -> ActionOutcome {
        let current = self
            .dispatcher
            .admin_state()
            .find_booking(booking_id)
            .map(|b| b.status.clone());
        let Some(current) = current else {
            return self
                .invalid(&format!("Booking #{} is not on the calendar", booking_id))
                .await;
        };
        if !admin_actions(&current).contains(&action) {
            return self
                .invalid(&format!(
                    "Cannot {} booking #{} ({})",
                    action,
                    booking_id,
                    current.label()
                ))
                .await;
        }

        let target = action.target_status();
        let question = format!("Change booking #{} status to {}?", booking_id, target);
        if !self.prompter.confirm(&question).await {
            return ActionOutcome::Declined;
        }

        let backend = self.dispatcher.backend();
        if let Err(e) = backend.set_booking_status(booking_id, &target).await {
            return self.failed("Failed to update the status", e).await;
        }

        info!(booking_id, status = %target, "Booking status changed");
        self.dispatcher
            .refresh_many(&[Region::Calendar, Region::Tables, Region::Stats])
            .await;
        ActionOutcome::Done
    }

    /// Create an event, or edit it when `event_id` is given
    pub async fn save_event(&self, event_id: Option<i64>, input: EventInput) -> ActionOutcome {
        if input.title.trim().is_empty() {
            return self.invalid("Event title is required").await;
        }
        if parse_wall_clock(&input.datetime).is_none() {
            return self
                .invalid("Enter the event time as YYYY-MM-DD HH:MM")
                .await;
        }
        if !self
            .prompter
            .confirm(&format!("Save event \"{}\"?", input.title))
            .await
        {
            return ActionOutcome::Declined;
        }

        let backend = self.dispatcher.backend();
        let result = match event_id {
            Some(id) => backend.update_event(id, &input).await,
            None => backend.create_event(&input).await,
        };
        if let Err(e) = result {
            return self.failed("Failed to save the event", e).await;
        }

        info!(?event_id, title = %input.title, "Event saved");
        self.dispatcher.refresh(Region::Events).await;
        ActionOutcome::Done
    }

    pub async fn delete_event(&self, event_id: i64) -> ActionOutcome {
        if !self.prompter.confirm("Delete this event?").await {
            return ActionOutcome::Declined;
        }

        if let Err(e) = self.dispatcher.backend().delete_event(event_id).await {
            return self.failed("Failed to delete the event", e).await;
        }

        info!(event_id, "Event deleted");
        self.dispatcher.refresh(Region::Events).await;
        ActionOutcome::Done
    }

    /// Ask for a new personal discount; unparsable amounts are saved as 0
    pub async fn set_guest_discount(&self, guest_id: i64) -> ActionOutcome {
        let guest = self.dispatcher.admin_state().find_guest(guest_id).cloned();
        let Some(guest) = guest else {
            return self
                .invalid(&format!("Guest #{} is not in the list", guest_id))
                .await;
        };

        let current = guest.discount();
        let question = format!(
            "Personal discount for {} (current: {} RUB). New amount in RUB:",
            guest.display_name(),
            current
        );
        let Some(answer) = self.prompter.prompt(&question, &current.to_string()).await else {
            return ActionOutcome::Declined;
        };
        let amount = answer.trim().parse::<i64>().unwrap_or(0);

        let backend = self.dispatcher.backend();
        if let Err(e) = backend.set_guest_discount(guest_id, amount).await {
            return self.failed("Failed to set the discount", e).await;
        }

        info!(guest_id, amount, "Guest discount set");
        self.dispatcher.refresh(Region::Guests).await;
        self.prompter
            .alert(&format!(
                "Discount {} RUB set for {}",
                amount,
                guest.display_name()
            ))
            .await;
        ActionOutcome::Done
    }

    pub async fn save_guest_notes(&self, guest_id: i64, notes: &str) -> ActionOutcome {
        if let Err(e) = self.dispatcher.backend().save_guest_notes(guest_id, notes).await {
            return self.failed("Failed to save the note", e).await;
        }

        info!(guest_id, "Guest note saved");
        self.dispatcher.refresh(Region::Guests).await;
        self.prompter.alert("Note saved").await;
        ActionOutcome::Done
    }

    /// Move the selected date and reload what depends on it
    pub async fn change_date(&self, days: i64) -> NaiveDate {
        let date = self.dispatcher.update_admin(|s| s.shift_date(days));
        self.dispatcher
            .refresh_many(&[Region::Calendar, Region::Tables])
            .await;
        date
    }

    pub async fn set_date(&self, date: NaiveDate) {
        self.dispatcher.update_admin(|s| s.set_date(date));
        self.dispatcher
            .refresh_many(&[Region::Calendar, Region::Tables])
            .await;
    }

    /// Filter the guest list locally
    pub fn search_guests(&self, query: &str) {
        self.dispatcher.update_admin(|s| s.set_guest_query(query));
        self.dispatcher.rerender_guests();
    }

    async fn invalid(&self, message: &str) -> ActionOutcome {
        self.prompter.alert(message).await;
        ActionOutcome::Invalid(message.to_string())
    }

    async fn failed(&self, context: &str, error: ApiError) -> ActionOutcome {
        warn!(error = %error, "{}", context);
        let message = format!("{}: {}", context, error.user_message());
        self.prompter.alert(&message).await;
        ActionOutcome::Failed(message)
    }
}

/// Fields of the guest booking form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingForm {
    pub phone: String,
    pub date_time: String,
    pub table_no: u32,
    pub guests: u32,
    pub comment: Option<String>,
}

/// Writes available on the guest pages
pub struct GuestActions {
    dispatcher: Arc<Dispatcher>,
    prompter: Arc<dyn Prompter>,
    host: Arc<dyn HostBridge>,
    admin_url: String,
}

impl GuestActions {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        prompter: Arc<dyn Prompter>,
        host: Arc<dyn HostBridge>,
        base_url: &str,
    ) -> Self {
        Self {
            dispatcher,
            prompter,
            host,
            admin_url: format!("{}/admin", base_url.trim_end_matches('/')),
        }
    }

    /// Submit the booking form
    ///
    /// Progress and errors are written to the form's status line.
    pub async fn create_booking(&self, form: BookingForm) -> ActionOutcome {
        let Some(user) = self.host.user() else {
            return self.form_invalid("Error: a Telegram account is required");
        };
        let phone = form.phone.trim().to_string();
        if !valid_phone(&phone) {
            return self.form_invalid("Enter the phone as +7XXXXXXXXXX");
        }

        self.form_status("Creating booking...");
        let full_name = user.full_name();
        let request = CreateBookingRequest {
            telegram_id: user.id,
            username: user.username.clone(),
            full_name: (!full_name.is_empty()).then_some(full_name),
            phone,
            date_time: form.date_time,
            table_no: form.table_no,
            guests: form.guests,
            comment: form.comment.filter(|c| !c.trim().is_empty()),
        };

        match self.dispatcher.backend().create_booking(&request).await {
            Ok(created) => {
                info!(booking_id = created.id, table_no = request.table_no, "Booking created");
                self.form_status(&format!("Booking #{} created!", created.id));
                self.host.haptic(Haptic::Success);
                self.host.send_data(&json!({
                    "action": "booking_created",
                    "booking_id": created.id,
                }));
                self.dispatcher.refresh_guest().await;
                ActionOutcome::Done
            }
            Err(e) => {
                warn!(error = %e, "Booking creation failed");
                let message = format!("Error: {}", e.user_message());
                self.form_status(&message);
                self.host.haptic(Haptic::Error);
                ActionOutcome::Failed(message)
            }
        }
    }

    /// Cancel one of the guest's own bookings
    pub async fn cancel_booking(&self, booking_id: i64) -> ActionOutcome {
        let Some(user) = self.host.user() else {
            return self.invalid("A Telegram account is required").await;
        };
        let booking = self
            .dispatcher
            .guest_state()
            .bootstrap()
            .and_then(|data| data.bookings.iter().find(|b| b.id == booking_id).cloned());
        let Some(booking) = booking else {
            return self
                .invalid(&format!("Booking #{} not found", booking_id))
                .await;
        };
        if !guest_can_cancel(
            &booking.status,
            booking.booking_at,
            now_local(),
            self.dispatcher.cancel_threshold(),
        ) {
            return self
                .invalid("This booking can no longer be canceled here")
                .await;
        }

        let question = format!(
            "Cancel booking #{}? It will be canceled immediately.",
            booking_id
        );
        if !self.prompter.confirm(&question).await {
            return ActionOutcome::Declined;
        }

        let backend = self.dispatcher.backend();
        if let Err(e) = backend.cancel_booking(booking_id, user.id).await {
            warn!(booking_id, error = %e, "Booking cancel failed");
            let message = format!("Error: {}", e.user_message());
            self.prompter.alert(&message).await;
            return ActionOutcome::Failed(message);
        }

        info!(booking_id, "Booking canceled by guest");
        self.host.send_data(&json!({
            "action": "booking_canceled",
            "booking_id": booking_id,
        }));
        self.prompter.alert("Booking canceled!").await;
        self.host.haptic(Haptic::Success);
        self.dispatcher.refresh_guest().await;
        ActionOutcome::Done
    }

    pub fn open_admin(&self) {
        self.host.open_link(&self.admin_url);
    }

    fn form_status(&self, text: &str) {
        self.dispatcher
            .regions()
            .replace(Region::BookingForm, text.to_string());
    }

    fn form_invalid(&self, message: &str) -> ActionOutcome {
        self.form_status(message);
        ActionOutcome::Invalid(message.to_string())
    }

    async fn invalid(&self, message: &str) -> ActionOutcome {
        self.prompter.alert(message).await;
        ActionOutcome::Invalid(message.to_string())
    }
}

fn valid_phone(phone: &str) -> bool {
    PHONE_RE
        .get_or_init(|| Regex::new(PHONE_PATTERN).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(phone))
}
