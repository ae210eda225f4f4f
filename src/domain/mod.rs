//! Booking Domain Rules
//!
//! Pure rules the views are derived from. Nothing here performs I/O.

pub mod loyalty;
pub mod status;
pub mod time;

pub use status::{
    admin_actions, guest_can_cancel, notice_tone, table_status, AdminAction, BookingStatus,
    NoticeTone, TableMark, TableStatus,
};
