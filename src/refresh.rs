//! View Refresh Dispatcher
//!
//! Fetches the snapshot behind a region, renders it, and replaces the
//! region wholesale. Failures are logged and leave the region as it was;
//! callers never see them.

use chrono::{Duration, NaiveDate};
use futures_util::future::join_all;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::api::{ApiError, Backend};
use crate::config::{Config, VenueConfig};
use crate::domain::time::now_local;
use crate::host::HostUser;
use crate::state::{AdminState, GuestState};
use crate::view::{admin, guest, Region, RegionStore};

pub struct Dispatcher {
    backend: Arc<dyn Backend>,
    regions: Arc<RegionStore>,
    admin: Mutex<AdminState>,
    guest: Mutex<GuestState>,
    venue: VenueConfig,
    cancel_threshold: Duration,
}

impl Dispatcher {
    pub fn new(
        backend: Arc<dyn Backend>,
        regions: Arc<RegionStore>,
        config: &Config,
        date: NaiveDate,
    ) -> Self {
        Self {
            backend,
            regions,
            admin: Mutex::new(AdminState::new(date)),
            guest: Mutex::new(GuestState::default()),
            venue: config.venue.clone(),
            cancel_threshold: config.guest.cancel_threshold(),
        }
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn regions(&self) -> &Arc<RegionStore> {
        &self.regions
    }

    pub fn venue(&self) -> &VenueConfig {
        &self.venue
    }

    pub fn cancel_threshold(&self) -> Duration {
        self.cancel_threshold
    }

    /// Apply a change to the admin state
    pub fn update_admin<R>(&self, f: impl FnOnce(&mut AdminState) -> R) -> R {
        f(&mut lock(&self.admin))
    }

    /// Copy of the admin state as it is now
    pub fn admin_state(&self) -> AdminState {
        lock(&self.admin).clone()
    }

    pub fn update_guest<R>(&self, f: impl FnOnce(&mut GuestState) -> R) -> R {
        f(&mut lock(&self.guest))
    }

    pub fn guest_state(&self) -> GuestState {
        lock(&self.guest).clone()
    }

    /// Refresh one region; returns whether new content was rendered
    pub async fn refresh(&self, region: Region) -> bool {
        if !region.is_admin() {
            return match region {
                Region::BookingForm => true,
                _ => self.refresh_guest().await,
            };
        }

        match self.render_admin(region).await {
            Ok(None) => true,
            Ok(Some(content)) => {
                self.regions.replace(region, content);
                debug!(region = %region, "Region refreshed");
                true
            }
            Err(e) => {
                warn!(region = %region, error = %e, "Refresh failed, keeping previous content");
                false
            }
        }
    }

    /// Refresh several regions concurrently, in no particular order
    ///
    /// Guest regions share a single bootstrap fetch.
    pub async fn refresh_many(&self, regions: &[Region]) {
        let admin_regions = regions.iter().filter(|r| r.is_admin()).map(|r| self.refresh(*r));
        let any_guest = regions
            .iter()
            .any(|r| !r.is_admin() && *r != Region::BookingForm);

        if any_guest {
            let (_, _) = tokio::join!(join_all(admin_regions), self.refresh_guest());
        } else {
            join_all(admin_regions).await;
        }
    }

    /// Fetch the guest bootstrap once and re-render every guest region
    pub async fn refresh_guest(&self) -> bool {
        let Some(user) = self.guest_state().user().cloned() else {
            warn!("No host identity, guest pages not loaded");
            return false;
        };

        match self.fetch_bootstrap(&user).await {
            Ok(data) => {
                self.update_guest(|s| s.store_bootstrap(data));
                self.render_guest_regions();
                true
            }
            Err(e) => {
                warn!(telegram_id = user.id, error = %e, "Bootstrap failed, keeping guest pages");
                false
            }
        }
    }

    /// Re-render the Guests region from the last snapshot without fetching
    pub fn rerender_guests(&self) {
        let state = lock(&self.admin);
        let content = admin::render_guests(state.filtered_guests());
        drop(state);
        self.regions.replace(Region::Guests, content);
    }

    async fn render_admin(&self, region: Region) -> Result<Option<String>, ApiError> {
        let date = lock(&self.admin).date();
        let content = match region {
            Region::Stats => {
                let stats = self.backend.stats().await?;
                admin::render_stats(&stats, self.venue.table_count)
            }
            Region::Tables => {
                let tables = self.backend.tables(date).await?;
                admin::render_tables(&tables, self.venue.table_count, date)
            }
            Region::Calendar => {
                let bookings = self.backend.bookings(date).await?;
                let content = admin::render_calendar(date, &bookings);
                lock(&self.admin).store_calendar(bookings);
                content
            }
            Region::Events => {
                let events = self.backend.events().await?;
                admin::render_events(&events)
            }
            Region::Guests => {
                let guests = self.backend.guests().await?;
                let mut state = lock(&self.admin);
                state.store_guests(guests);
                admin::render_guests(state.filtered_guests())
            }
            _ => return Ok(None),
        };
        Ok(Some(content))
    }

    async fn fetch_bootstrap(&self, user: &HostUser) -> Result<crate::api::Bootstrap, ApiError> {
        let username = user.username.clone().unwrap_or_default();
        self.backend
            .bootstrap(user.id, &username, &user.full_name())
            .await
    }

    fn render_guest_regions(&self) {
        let state = self.guest_state();
        let Some(data) = state.bootstrap() else {
            return;
        };
        let now = now_local();
        let rendered = [
            (Region::Home, guest::render_home(data, &self.venue)),
            (Region::Promotions, guest::render_promotions(&data.promotions)),
            (Region::Menu, guest::render_menu(&data.menu)),
            (Region::Contacts, guest::render_contacts(&self.venue)),
            (
                Region::GuestBookings,
                guest::render_guest_bookings(&data.bookings, now, self.cancel_threshold),
            ),
        ];
        for (region, content) in rendered {
            self.regions.replace(region, content);
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeBackend;
    use crate::api::{AdminBooking, Bootstrap, DashboardStats, Guest, TableBooking, TablesResponse};
    use crate::domain::BookingStatus;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn dispatcher(backend: Arc<FakeBackend>) -> Dispatcher {
        Dispatcher::new(backend, Arc::new(RegionStore::new()), &Config::default(), date())
    }

    fn booking(id: i64) -> AdminBooking {
        AdminBooking {
            id,
            booking_at: date().and_hms_opt(20, 0, 0).unwrap(),
            table_no: 2,
            guests: 2,
            client_name: None,
            status: crate::domain::BookingStatus::Confirmed,
        }
    }

    #[tokio::test]
    async fn test_refresh_is_idempotent() {
        let backend = Arc::new(FakeBackend::new());
        *backend.bookings.lock().unwrap() = vec![booking(1), booking(2)];
        let d = dispatcher(backend.clone());

        assert!(d.refresh(Region::Calendar).await);
        let first = d.regions().get(Region::Calendar);
        assert!(d.refresh(Region::Calendar).await);
        assert_eq!(d.regions().get(Region::Calendar), first);
        assert_eq!(d.admin_state().calendar().len(), 2);
    }

    #[tokio::test]
    async fn test_tables_refresh_is_byte_identical() {
        let backend = Arc::new(FakeBackend::new());
        let mark = |id, status, is_occupied| TableBooking {
            id: Some(id),
            booking_at: date().and_hms_opt(19, 0, 0),
            status,
            is_occupied,
            is_blocked: false,
        };
        let mut tables = TablesResponse::default();
        tables.tables.insert(1, vec![mark(1, BookingStatus::Confirmed, false)]);
        tables.tables.insert(3, vec![mark(2, BookingStatus::Pending, true), mark(3, BookingStatus::Canceled, false)]);
        *backend.tables.lock().unwrap() = tables;
        let d = dispatcher(backend.clone());

        assert!(d.refresh(Region::Tables).await);
        let first = d.regions().get(Region::Tables);
        assert!(first.as_deref().is_some_and(|text| text.contains("Table  3")));
        assert!(d.refresh(Region::Tables).await);
        assert_eq!(d.regions().get(Region::Tables), first);
        assert_eq!(backend.calls(), vec!["tables 2026-10-16", "tables 2026-10-16"]);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_content() {
        let backend = Arc::new(FakeBackend::new());
        *backend.stats.lock().unwrap() = DashboardStats {
            total_bookings: Some(4),
            ..Default::default()
        };
        let d = dispatcher(backend.clone());
        assert!(d.refresh(Region::Stats).await);
        let before = d.regions().get(Region::Stats);

        backend.fail_reads(true);
        assert!(!d.refresh(Region::Stats).await);
        assert_eq!(d.regions().get(Region::Stats), before);
        assert_eq!(d.regions().version(), 1);
    }

    #[tokio::test]
    async fn test_refresh_uses_selected_date() {
        let backend = Arc::new(FakeBackend::new());
        let d = dispatcher(backend.clone());
        d.update_admin(|s| s.shift_date(1));

        d.refresh_many(&[Region::Tables, Region::Calendar]).await;
        let mut calls = backend.calls();
        calls.sort();
        assert_eq!(calls, vec!["bookings 2026-10-17", "tables 2026-10-17"]);
    }

    #[tokio::test]
    async fn test_guest_regions_share_one_fetch() {
        let backend = Arc::new(FakeBackend::new());
        *backend.bootstrap.lock().unwrap() = Bootstrap {
            visits: Some(2),
            ..Default::default()
        };
        let d = dispatcher(backend.clone());
        d.update_guest(|s| {
            s.set_user(Some(HostUser {
                id: 77,
                ..Default::default()
            }))
        });

        d.refresh_many(&Region::GUEST).await;
        assert_eq!(backend.calls(), vec!["bootstrap 77"]);
        for region in Region::GUEST {
            assert!(d.regions().get(region).is_some(), "{} not rendered", region);
        }
    }

    #[tokio::test]
    async fn test_guest_refresh_without_identity() {
        let backend = Arc::new(FakeBackend::new());
        let d = dispatcher(backend.clone());
        assert!(!d.refresh(Region::Home).await);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_rerender_guests_filters_without_fetch() {
        let backend = Arc::new(FakeBackend::new());
        *backend.guests.lock().unwrap() = vec![
            Guest {
                id: 1,
                name: Some("Anna".to_string()),
                phone: None,
                visits: None,
                personal_discount: None,
            },
            Guest {
                id: 2,
                name: Some("Boris".to_string()),
                phone: None,
                visits: None,
                personal_discount: None,
            },
        ];
        let d = dispatcher(backend.clone());
        d.refresh(Region::Guests).await;
        backend.clear_calls();

        d.update_admin(|s| s.set_guest_query("bor"));
        d.rerender_guests();
        let text = d.regions().get(Region::Guests).unwrap();
        assert!(text.contains("Boris"));
        assert!(!text.contains("Anna"));
        assert!(backend.calls().is_empty());
    }
}
