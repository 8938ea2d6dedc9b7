use anyhow::Context;
use ble_locator::algorithms::PositionEstimator;
use ble_locator::core::{AnchorRegistry, ObservationBatch, PositionRecord};
use ble_locator::securer::OutputSecurer;
use ble_locator::telemetry::TelemetryLog;
use ble_locator::transport::{ChannelHandler, MqttIngestor};
use ble_locator::utils::config::SystemConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => SystemConfig::load_from_file(&path)
            .with_context(|| format!("loading configuration from {}", path))?,
        None => SystemConfig::default(),
    };
    config.validate().context("validating configuration")?;

    let registry = Arc::new(AnchorRegistry::from_entries(
        config
            .positioning
            .anchors
            .iter()
            .map(|anchor| (anchor.id.clone(), anchor.coordinate())),
    ));
    info!(
        anchors = registry.len(),
        window = config.positioning.history_window,
        "anchor registry loaded"
    );

    let securer = Arc::new(
        OutputSecurer::from_pem_file(
            &config.security.public_key_path,
            config.security.digest_iterations,
        )
        .context("loading sealing key")?,
    );
    if let Some(der_path) = &config.security.der_export_path {
        securer
            .export_der(der_path)
            .context("exporting DER public key")?;
        info!(path = %der_path.display(), "public key exported as DER");
    }
    info!(bits = securer.key_bits(), "output sealing ready");

    let mut telemetry = if config.telemetry.enabled {
        Some(TelemetryLog::open(&config.telemetry).context("opening telemetry logs")?)
    } else {
        None
    };

    let (tx, mut rx) = mpsc::channel::<ObservationBatch>(64);
    let ingestor = MqttIngestor::connect(&config.mqtt);
    info!(
        broker = %config.mqtt.broker,
        port = config.mqtt.port,
        topic = %config.mqtt.topic,
        "starting MQTT ingestor"
    );
    tokio::spawn(async move {
        if let Err(e) = ingestor.run(ChannelHandler::new(tx)).await {
            error!("ingestor stopped: {}", e);
        }
    });

    // One estimator per tag id: histories are tag-relative smoothing
    // windows and must never be shared across tags. Batches are processed
    // to completion in arrival order.
    let window = config.positioning.history_window;
    let mut estimators: HashMap<String, PositionEstimator> = HashMap::new();

    while let Some(batch) = rx.recv().await {
        let timestamp_ms = now_ms();

        if let Some(log) = telemetry.as_mut() {
            if let Err(e) = log.record_observations(timestamp_ms, &batch) {
                warn!("observation telemetry failed: {}", e);
            }
        }

        let estimator = estimators
            .entry(batch.tag_id.clone())
            .or_insert_with(|| PositionEstimator::with_window(Arc::clone(&registry), window));

        let estimate = match estimator.estimate(&batch) {
            Ok(estimate) => estimate,
            Err(e) => {
                warn!(tag = %batch.tag_id, "no estimate this cycle: {}", e);
                continue;
            }
        };
        info!(
            tag = %batch.tag_id,
            x = estimate.x,
            y = estimate.y,
            "position calculated"
        );

        // The digest chain is CPU-bound; keep it off the runtime threads.
        let record = PositionRecord::from_estimate(&batch.tag_id, timestamp_ms, estimate);
        let sealer = Arc::clone(&securer);
        let sealed = match tokio::task::spawn_blocking(move || sealer.seal_record(&record)).await {
            Ok(Ok(sealed)) => sealed,
            Ok(Err(e)) => {
                error!(tag = %batch.tag_id, "sealing failed: {}", e);
                continue;
            }
            Err(e) => {
                error!(tag = %batch.tag_id, "sealing task failed: {}", e);
                continue;
            }
        };

        if let Some(log) = telemetry.as_mut() {
            if let Err(e) = log.record_position(timestamp_ms, &batch.tag_id, &sealed) {
                warn!("position telemetry failed: {}", e);
            }
        }
    }

    Ok(())
}
