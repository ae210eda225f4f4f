//! Admin Dashboard
//!
//! Ties the live channel to the dispatcher: every booking update posts a
//! notice and refreshes the regions a booking change can affect.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::domain::{notice_tone, NoticeTone};
use crate::live::{BookingUpdate, LiveEventHandler};
use crate::refresh::Dispatcher;
use crate::view::{Notice, NoticeBoard, Region};

/// Regions refetched after a pushed booking update
pub const LIVE_REGIONS: [Region; 3] = [Region::Tables, Region::Calendar, Region::Stats];

pub struct AdminDashboard {
    dispatcher: Arc<Dispatcher>,
    notices: NoticeBoard,
}

impl AdminDashboard {
    pub fn new(dispatcher: Arc<Dispatcher>, notice_ttl: Duration) -> Self {
        Self {
            dispatcher,
            notices: NoticeBoard::new(notice_ttl),
        }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Render every admin region once
    pub async fn load(&self) {
        self.dispatcher.refresh_many(&Region::ADMIN).await;
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.active()
    }

    /// When the screen must be redrawn to drop an expired notice
    pub fn next_notice_expiry(&self) -> Option<Instant> {
        self.notices.next_expiry()
    }
}

#[async_trait]
impl LiveEventHandler for AdminDashboard {
    async fn on_booking_update(&self, update: BookingUpdate) {
        let tone = update
            .status
            .as_ref()
            .map(notice_tone)
            .unwrap_or(NoticeTone::Accent);
        self.notices.post(Notice {
            title: format!("Booking #{}: {}", update.booking_id, update.action),
            tone,
        });
        self.dispatcher.refresh_many(&LIVE_REGIONS).await;
    }
}
