//! Notification Listener
//!
//! Keeps one live connection to the admin push channel for as long as the
//! process runs. Every close, error, or failed handshake is followed by a
//! reconnect after exactly the configured retry delay, with no backoff and
//! no attempt cap. While open, a ping is sent every heartbeat interval.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::connection::ConnectionState;
use super::messages::{parse_inbound, BookingUpdate, Inbound, Outbound};
use super::transport::{Connector, LiveSocket, TransportError};
use crate::config::LiveConfig;

/// Receives booking updates pushed by the server
#[async_trait]
pub trait LiveEventHandler: Send + Sync {
    async fn on_booking_update(&self, update: BookingUpdate);
}

pub struct NotificationListener {
    url: String,
    retry_delay: Duration,
    heartbeat_interval: Duration,
    connector: Arc<dyn Connector>,
    handler: Arc<dyn LiveEventHandler>,
    state: watch::Sender<ConnectionState>,
}

impl NotificationListener {
    pub fn new(
        url: impl Into<String>,
        config: &LiveConfig,
        connector: Arc<dyn Connector>,
        handler: Arc<dyn LiveEventHandler>,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Closed);
        Self {
            url: url.into(),
            retry_delay: config.retry_delay(),
            heartbeat_interval: config.heartbeat_interval(),
            connector,
            handler,
            state,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Watch the connection state
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Run the listener on a background task
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    /// Connect, listen, and reconnect forever
    pub async fn run(&self) {
        let mut attempt: u64 = 0;
        loop {
            attempt += 1;
            self.state.send_replace(ConnectionState::Connecting);
            debug!(url = %self.url, attempt, "Connecting to live channel");

            match self.connector.connect(&self.url).await {
                Ok(socket) => {
                    self.state.send_replace(ConnectionState::Open);
                    info!(url = %self.url, attempt, "Live channel open");
                    match self.session(socket).await {
                        Some(e) => warn!(error = %e, "Live channel dropped"),
                        None => info!("Live channel closed by server"),
                    }
                }
                Err(e) => warn!(url = %self.url, attempt, error = %e, "Live channel unavailable"),
            }

            self.state.send_replace(ConnectionState::Closed);
            info!(
                delay_ms = self.retry_delay.as_millis() as u64,
                "Reconnecting to live channel"
            );
            tokio::time::sleep(self.retry_delay).await;
        }
    }

    /// Serve one open connection until it closes
    async fn session(&self, mut socket: Box<dyn LiveSocket>) -> Option<TransportError> {
        let ping = match Outbound::Ping.to_json() {
            Ok(ping) => ping,
            Err(e) => return Some(TransportError::Lost(e.to_string())),
        };
        let mut heartbeat = interval_at(
            Instant::now() + self.heartbeat_interval,
            self.heartbeat_interval,
        );
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                frame = socket.next_text() => match frame {
                    Some(Ok(text)) => self.dispatch(&text),
                    Some(Err(e)) => return Some(e),
                    None => return None,
                },
                _ = heartbeat.tick() => {
                    if let Err(e) = socket.send_text(ping.clone()).await {
                        return Some(e);
                    }
                    debug!("Heartbeat sent");
                }
            }
        }
    }

    fn dispatch(&self, text: &str) {
        match parse_inbound(text) {
            Ok(Inbound::BookingUpdate(update)) => {
                debug!(booking_id = update.booking_id, action = %update.action, "Booking update");
                let handler = Arc::clone(&self.handler);
                tokio::spawn(async move { handler.on_booking_update(update).await });
            }
            Ok(Inbound::Ping) | Ok(Inbound::Pong) => {}
            Err(e) => warn!(error = %e, payload = text, "Discarding malformed live message"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    type Incoming = mpsc::UnboundedSender<Result<String, TransportError>>;

    struct FakeSocket {
        incoming: mpsc::UnboundedReceiver<Result<String, TransportError>>,
        sent: Arc<Mutex<Vec<(Instant, String)>>>,
    }

    #[async_trait]
    impl LiveSocket for FakeSocket {
        async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
            self.sent.lock().unwrap().push((Instant::now(), text));
            Ok(())
        }

        async fn next_text(&mut self) -> Option<Result<String, TransportError>> {
            self.incoming.recv().await
        }
    }

    /// Hands out prepared sockets in order, then refuses every handshake
    #[derive(Default)]
    struct FakeConnector {
        sockets: Mutex<VecDeque<FakeSocket>>,
        attempts: Mutex<Vec<Instant>>,
        sent: Arc<Mutex<Vec<(Instant, String)>>>,
    }

    impl FakeConnector {
        fn with_socket(&self) -> Incoming {
            let (tx, rx) = mpsc::unbounded_channel();
            self.sockets.lock().unwrap().push_back(FakeSocket {
                incoming: rx,
                sent: Arc::clone(&self.sent),
            });
            tx
        }

        fn attempts(&self) -> Vec<Instant> {
            self.attempts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Connector for FakeConnector {
        async fn connect(&self, _url: &str) -> Result<Box<dyn LiveSocket>, TransportError> {
            self.attempts.lock().unwrap().push(Instant::now());
            match self.sockets.lock().unwrap().pop_front() {
                Some(socket) => Ok(Box::new(socket)),
                None => Err(TransportError::Connect("connection refused".to_string())),
            }
        }
    }

    struct ChannelHandler(mpsc::UnboundedSender<BookingUpdate>);

    #[async_trait]
    impl LiveEventHandler for ChannelHandler {
        async fn on_booking_update(&self, update: BookingUpdate) {
            let _ = self.0.send(update);
        }
    }

    fn listener(
        connector: Arc<FakeConnector>,
    ) -> (Arc<NotificationListener>, mpsc::UnboundedReceiver<BookingUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let listener = NotificationListener::new(
            "ws://localhost:10000/ws/admin",
            &LiveConfig::default(),
            connector,
            Arc::new(ChannelHandler(tx)),
        );
        (Arc::new(listener), rx)
    }

    fn gaps(instants: &[Instant]) -> Vec<Duration> {
        instants.windows(2).map(|w| w[1] - w[0]).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_handshakes_retry_at_fixed_delay() {
        let connector = Arc::new(FakeConnector::default());
        let (listener, _rx) = listener(connector.clone());
        let handle = listener.spawn();

        tokio::time::sleep(Duration::from_millis(20_001)).await;
        let attempts = connector.attempts();
        assert_eq!(attempts.len(), 5);
        assert!(gaps(&attempts)
            .iter()
            .all(|gap| *gap == Duration::from_millis(5000)));

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_after_server_close() {
        let connector = Arc::new(FakeConnector::default());
        let incoming = connector.with_socket();
        let (listener, _rx) = listener(connector.clone());
        let mut state = listener.state();
        let handle = listener.spawn();

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(*state.borrow_and_update(), ConnectionState::Open);

        drop(incoming);
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(*state.borrow_and_update(), ConnectionState::Closed);

        tokio::time::sleep(Duration::from_millis(5000)).await;
        let attempts = connector.attempts();
        assert_eq!(attempts.len(), 2);
        assert_eq!(gaps(&attempts), vec![Duration::from_millis(6000)]);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_while_open() {
        let connector = Arc::new(FakeConnector::default());
        let _incoming = connector.with_socket();
        let (listener, _rx) = listener(connector.clone());
        let start = Instant::now();
        let handle = listener.spawn();

        tokio::time::sleep(Duration::from_millis(90_001)).await;
        let sent = connector.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 3);
        for (i, (at, text)) in sent.iter().enumerate() {
            assert_eq!(text, r#"{"type":"ping"}"#);
            assert_eq!(*at - start, Duration::from_millis(30_000 * (i as u64 + 1)));
        }
        assert_eq!(connector.attempts().len(), 1);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_payloads_are_dropped() {
        let connector = Arc::new(FakeConnector::default());
        let incoming = connector.with_socket();
        let (listener, mut rx) = listener(connector.clone());
        let handle = listener.spawn();

        for frame in [
            "not json",
            r#"{"type": "table_moved"}"#,
            r#"{"type": "booking_update"}"#,
            r#"{"type": "pong"}"#,
            r#"{"type": "booking_update", "booking_id": 9, "action": "created", "status": "pending"}"#,
        ] {
            incoming.send(Ok(frame.to_string())).unwrap();
        }

        let update = rx.recv().await.unwrap();
        assert_eq!(update.booking_id, 9);
        assert_eq!(update.action, "created");
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(connector.attempts().len(), 1);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_reconnects() {
        let connector = Arc::new(FakeConnector::default());
        let incoming = connector.with_socket();
        let _second = connector.with_socket();
        let (listener, _rx) = listener(connector.clone());
        let mut state = listener.state();
        let handle = listener.spawn();

        tokio::time::sleep(Duration::from_millis(10)).await;
        incoming
            .send(Err(TransportError::Lost("reset by peer".to_string())))
            .unwrap();

        tokio::time::sleep(Duration::from_millis(5100)).await;
        assert_eq!(connector.attempts().len(), 2);
        assert_eq!(*state.borrow_and_update(), ConnectionState::Open);

        handle.abort();
    }
}
