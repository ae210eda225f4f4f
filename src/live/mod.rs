//! Live Updates
//!
//! Client side of the admin push channel: frame types, the transport
//! seam, and the reconnecting listener.

mod connection;
mod listener;
pub mod messages;
pub mod transport;

pub use connection::ConnectionState;
pub use listener::{LiveEventHandler, NotificationListener};
pub use messages::{parse_inbound, BookingUpdate, Inbound, Outbound};
pub use transport::{Connector, LiveSocket, TransportError, WsConnector};
