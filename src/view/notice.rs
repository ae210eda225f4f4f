//! Transient Notices
//!
//! Short-lived banners raised by live booking updates. Expired notices are
//! pruned whenever the board is read; `next_expiry` tells front ends when
//! to redraw.

use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use crate::domain::NoticeTone;

/// A banner summarizing a live update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub tone: NoticeTone,
}

/// Notices currently on screen
pub struct NoticeBoard {
    ttl: Duration,
    notices: Mutex<Vec<(Instant, Notice)>>,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            notices: Mutex::new(Vec::new()),
        }
    }

    pub fn post(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push((Instant::now() + self.ttl, notice));
        }
    }

    /// When the earliest live notice expires, if any are live
    pub fn next_expiry(&self) -> Option<Instant> {
        let now = Instant::now();
        let notices = self.notices.lock().ok()?;
        notices
            .iter()
            .map(|(expires, _)| *expires)
            .filter(|expires| *expires > now)
            .min()
    }

    /// Notices that have not expired yet, oldest first
    pub fn active(&self) -> Vec<Notice> {
        let now = Instant::now();
        match self.notices.lock() {
            Ok(mut notices) => {
                notices.retain(|(expires, _)| *expires > now);
                notices.iter().map(|(_, n)| n.clone()).collect()
            }
            Err(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_notice_expires() {
        let board = NoticeBoard::new(Duration::from_millis(3000));
        board.post(Notice {
            title: "Booking #1: confirmed".to_string(),
            tone: NoticeTone::Success,
        });

        tokio::time::advance(Duration::from_millis(2999)).await;
        assert_eq!(board.active().len(), 1);

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(board.active().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_expiry_tracks_earliest_notice() {
        let board = NoticeBoard::new(Duration::from_millis(3000));
        assert!(board.next_expiry().is_none());

        let start = Instant::now();
        board.post(Notice {
            title: "Booking #1: confirmed".to_string(),
            tone: NoticeTone::Success,
        });
        tokio::time::advance(Duration::from_millis(1000)).await;
        board.post(Notice {
            title: "Booking #2: canceled".to_string(),
            tone: NoticeTone::Danger,
        });
        assert_eq!(board.next_expiry(), Some(start + Duration::from_millis(3000)));

        tokio::time::sleep_until(start + Duration::from_millis(3000)).await;
        assert_eq!(board.active().len(), 1);
        assert_eq!(board.next_expiry(), Some(start + Duration::from_millis(4000)));

        tokio::time::advance(Duration::from_millis(1000)).await;
        assert!(board.next_expiry().is_none());
    }
}
