//! Live Channel Messages
//!
//! JSON frames exchanged on the admin push channel, tagged by `type`.

use serde::{Deserialize, Serialize};

use crate::domain::BookingStatus;

/// A booking changed somewhere; the dashboard should refetch
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookingUpdate {
    pub booking_id: i64,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub status: Option<BookingStatus>,
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inbound {
    BookingUpdate(BookingUpdate),
    Ping,
    Pong,
}

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    /// Keepalive
    Ping,
}

impl Outbound {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Parse one text frame
pub fn parse_inbound(text: &str) -> Result<Inbound, serde_json::Error> {
    serde_json::from_str(text)
}
