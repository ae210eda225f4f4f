//! # Tablebook
//!
//! Client for a restaurant table-booking backend: the staff dashboard with
//! live booking updates and the guest booking pages.
//!
//! ## Features
//!
//! - **Live updates**: Reconnecting push channel that refreshes the dashboard
//! - **Full-replace views**: Every region is re-rendered from a fresh snapshot
//! - **Confirmed writes**: Each action asks first, writes once, then refreshes
//!
//! ## Modules
//!
//! - [`api`]: REST client for the booking backend
//! - [`domain`]: Booking statuses, table status, loyalty rules
//! - [`view`]: Region store and renderers
//! - [`refresh`]: View refresh dispatcher
//! - [`live`]: Notification listener for the admin push channel
//! - [`actions`]: Action submitters for staff and guests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tablebook::{BackendClient, Config, Dispatcher, Region, RegionStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let backend = Arc::new(BackendClient::new(&config.backend)?);
//!     let regions = Arc::new(RegionStore::new());
//!
//!     let today = chrono::Local::now().date_naive();
//!     let dispatcher = Dispatcher::new(backend, regions.clone(), &config, today);
//!     dispatcher.refresh(Region::Tables).await;
//!
//!     if let Some(tables) = regions.get(Region::Tables) {
//!         println!("{}", tables);
//!     }
//!     Ok(())
//! }
//! ```

pub mod actions;
pub mod api;
pub mod config;
pub mod console;
pub mod dashboard;
pub mod domain;
pub mod export;
pub mod host;
pub mod live;
pub mod logging;
pub mod modal;
pub mod refresh;
pub mod state;
pub mod view;

pub use actions::{ActionOutcome, AdminActions, BookingForm, GuestActions};

pub use api::{ApiError, ApiResult, Backend, BackendClient};

pub use config::{Config, ConfigError, LoggingConfig};

pub use dashboard::AdminDashboard;

pub use domain::{AdminAction, BookingStatus, TableStatus};

pub use live::{ConnectionState, LiveEventHandler, NotificationListener, WsConnector};

pub use refresh::Dispatcher;

pub use view::{Region, RegionStore};
