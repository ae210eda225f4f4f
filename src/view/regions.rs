//! View Regions
//!
//! Every screen area is a named region holding fully rendered text. A
//! refresh replaces a region wholesale; nothing is patched in place and
//! the last writer wins.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::RwLock;
use tokio::sync::watch;

/// A screen area refreshed as one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Region {
    // Admin dashboard
    Stats,
    Tables,
    Calendar,
    Events,
    Guests,
    // Guest pages
    Home,
    Promotions,
    Menu,
    Contacts,
    GuestBookings,
    BookingForm,
}

impl Region {
    /// Regions of the admin dashboard, in display order
    pub const ADMIN: [Region; 5] = [
        Region::Stats,
        Region::Tables,
        Region::Calendar,
        Region::Events,
        Region::Guests,
    ];

    /// Regions filled from the guest bootstrap snapshot
    pub const GUEST: [Region; 5] = [
        Region::Home,
        Region::Promotions,
        Region::Menu,
        Region::Contacts,
        Region::GuestBookings,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Region::Stats => "stats",
            Region::Tables => "tables",
            Region::Calendar => "calendar",
            Region::Events => "events",
            Region::Guests => "guests",
            Region::Home => "home",
            Region::Promotions => "promotions",
            Region::Menu => "menu",
            Region::Contacts => "contacts",
            Region::GuestBookings => "bookings",
            Region::BookingForm => "booking-form",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        [Region::ADMIN.as_slice(), Region::GUEST.as_slice(), &[Region::BookingForm]]
            .concat()
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(s.trim()))
    }

    pub fn is_admin(self) -> bool {
        Region::ADMIN.contains(&self)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rendered content of every region
pub struct RegionStore {
    regions: RwLock<BTreeMap<Region, String>>,
    version: watch::Sender<u64>,
}

impl Default for RegionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionStore {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            regions: RwLock::new(BTreeMap::new()),
            version,
        }
    }

    /// Replace a region's content entirely
    pub fn replace(&self, region: Region, content: String) {
        match self.regions.write() {
            Ok(mut regions) => {
                regions.insert(region, content);
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(region, content);
            }
        }
        self.version.send_modify(|v| *v += 1);
    }

    /// Current content of a region
    pub fn get(&self, region: Region) -> Option<String> {
        self.regions
            .read()
            .ok()
            .and_then(|regions| regions.get(&region).cloned())
    }

    /// All rendered regions in display order
    pub fn snapshot(&self) -> Vec<(Region, String)> {
        self.regions
            .read()
            .map(|regions| regions.iter().map(|(r, c)| (*r, c.clone())).collect())
            .unwrap_or_default()
    }

    /// Number of replacements so far
    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    /// Receiver notified after every replacement
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }
}
