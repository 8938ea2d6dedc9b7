//! Message-bus ingestion boundary
//!
//! The positioning core never talks to the bus directly: the ingestor
//! decodes each publish into observation batches and hands them to a
//! [`ScanHandler`]. The bundled [`ChannelHandler`] forwards batches into a
//! bounded channel so the estimation loop runs decoupled from bus I/O.

use crate::core::ObservationBatch;
use std::fmt;
use tokio::sync::mpsc;
use tracing::warn;

pub mod mqtt;

pub use mqtt::MqttIngestor;

/// Errors raised by the ingestion transport
#[derive(Debug, Clone)]
pub enum TransportError {
    /// Subscribing to the scan topic failed
    Subscription { topic: String, details: String },
    /// The client request channel to the bus broke down
    Connection { details: String },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Subscription { topic, details } => {
                write!(f, "failed to subscribe to {}: {}", topic, details)
            }
            TransportError::Connection { details } => {
                write!(f, "bus connection failure: {}", details)
            }
        }
    }
}

impl std::error::Error for TransportError {}

/// Handler invoked once per decoded observation batch
pub trait ScanHandler: Send {
    fn on_batch(&mut self, batch: ObservationBatch);
}

/// [`ScanHandler`] that forwards batches into a bounded mpsc channel.
///
/// A full channel drops the batch: observations are periodic, and a
/// stalled consumer is better served by the next cycle than by a growing
/// backlog of stale ones.
pub struct ChannelHandler {
    sender: mpsc::Sender<ObservationBatch>,
}

impl ChannelHandler {
    pub fn new(sender: mpsc::Sender<ObservationBatch>) -> Self {
        Self { sender }
    }
}

impl ScanHandler for ChannelHandler {
    fn on_batch(&mut self, batch: ObservationBatch) {
        if let Err(e) = self.sender.try_send(batch) {
            warn!("dropping observation batch: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AnchorReading;

    fn create_test_batch(tag_id: &str) -> ObservationBatch {
        ObservationBatch::new(tag_id, vec![AnchorReading::new("ESP32-01", -70)])
    }

    #[test]
    fn test_channel_handler_forwards_batches() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut handler = ChannelHandler::new(tx);

        handler.on_batch(create_test_batch("tag-a"));
        handler.on_batch(create_test_batch("tag-b"));

        assert_eq!(rx.try_recv().unwrap().tag_id, "tag-a");
        assert_eq!(rx.try_recv().unwrap().tag_id, "tag-b");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_handler_drops_when_full() {
        let (tx, mut rx) = mpsc::channel(1);
        let mut handler = ChannelHandler::new(tx);

        handler.on_batch(create_test_batch("tag-a"));
        handler.on_batch(create_test_batch("tag-b"));

        assert_eq!(rx.try_recv().unwrap().tag_id, "tag-a");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_handler_survives_closed_receiver() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let mut handler = ChannelHandler::new(tx);

        // Must not panic; the loop shutting down is not the bus's problem.
        handler.on_batch(create_test_batch("tag-a"));
    }
}
