//! MQTT scan-topic ingestor

use crate::processing::ScanDecoder;
use crate::transport::{ScanHandler, TransportError};
use crate::utils::config::MqttSettings;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Subscribes to the wildcard scan topic and feeds decoded batches to a
/// [`ScanHandler`].
///
/// Connection errors and malformed messages are logged and retried or
/// discarded; one bad message or dropped connection never stops the loop.
pub struct MqttIngestor {
    client: AsyncClient,
    eventloop: EventLoop,
    topic: String,
    decoder: ScanDecoder,
}

impl MqttIngestor {
    /// Configure the client; the connection is established once the event
    /// loop starts polling in [`run`](Self::run).
    pub fn connect(settings: &MqttSettings) -> Self {
        let mut options = MqttOptions::new(&settings.client_id, &settings.broker, settings.port);
        options.set_keep_alive(Duration::from_secs(settings.keep_alive_secs));
        options.set_clean_session(true);

        let (client, eventloop) = AsyncClient::new(options, 10);
        Self {
            client,
            eventloop,
            topic: settings.topic.clone(),
            decoder: ScanDecoder::new(),
        }
    }

    /// Drive the event loop until the process shuts down.
    ///
    /// Scan subscriptions use QoS 1, matching what the anchor firmware
    /// publishes at. Clean sessions lose their subscriptions on
    /// reconnect, so every connection acknowledgement after the first
    /// triggers a resubscribe.
    pub async fn run<H: ScanHandler>(mut self, mut handler: H) -> Result<(), TransportError> {
        Self::subscribe(&self.client, &self.topic).await?;
        info!(topic = %self.topic, "subscribed to scan topic");

        let mut first_connack = true;
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    info!("connected to MQTT broker");
                    if first_connack {
                        first_connack = false;
                    } else {
                        Self::subscribe(&self.client, &self.topic).await?;
                        info!(topic = %self.topic, "resubscribed after reconnect");
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    match self.decoder.decode(&publish.payload) {
                        Ok(batches) => {
                            debug!(
                                topic = %publish.topic,
                                batches = batches.len(),
                                "decoded scan message"
                            );
                            for batch in batches {
                                handler.on_batch(batch);
                            }
                        }
                        Err(e) => {
                            warn!(topic = %publish.topic, "discarding scan message: {}", e);
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("MQTT connection error: {}, retrying", e);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    async fn subscribe(client: &AsyncClient, topic: &str) -> Result<(), TransportError> {
        client
            .subscribe(topic, QoS::AtLeastOnce)
            .await
            .map_err(|e| TransportError::Subscription {
                topic: topic.to_string(),
                details: e.to_string(),
            })
    }
}
