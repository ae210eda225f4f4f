//! View Layer
//!
//! Region store, notices, and the pure renderers that fill regions.

pub mod admin;
pub mod guest;
mod notice;
mod regions;

pub use notice::{Notice, NoticeBoard};
pub use regions::{Region, RegionStore};
