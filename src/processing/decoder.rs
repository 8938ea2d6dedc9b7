//! Scan message decoding

use crate::core::{AnchorReading, ObservationBatch};
use serde::Deserialize;
use std::fmt;

/// Errors raised while decoding a scan payload
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Payload is not valid JSON
    InvalidJson { details: String },
    /// Payload is valid JSON but not shaped like a scan report
    InvalidPayload { details: String },
    /// Payload carries no tag entries at all
    EmptyPayload,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidJson { details } => write!(f, "invalid JSON payload: {}", details),
            DecodeError::InvalidPayload { details } => {
                write!(f, "malformed scan payload: {}", details)
            }
            DecodeError::EmptyPayload => write!(f, "scan payload contains no tag entries"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// One per-anchor entry as published by the scanners
#[derive(Debug, Deserialize)]
struct RawReading {
    id: String,
    rssi: i16,
}

/// Decoder for scan-topic publishes.
///
/// A payload is a JSON object keyed by tag identifier, each value an
/// ordered array of `{"id": ..., "rssi": ...}` readings collected by the
/// anchors during one reporting cycle:
///
/// ```json
/// {"ESP32C3": [{"id": "ESP32-01", "rssi": -71}, {"id": "ESP32-02", "rssi": -63}]}
/// ```
///
/// Each tag key becomes its own [`ObservationBatch`]. Malformed payloads
/// are rejected here; the positioning core only ever sees well-typed
/// batches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanDecoder;

impl ScanDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode one publish into per-tag observation batches
    pub fn decode(&self, payload: &[u8]) -> Result<Vec<ObservationBatch>, DecodeError> {
        let value: serde_json::Value =
            serde_json::from_slice(payload).map_err(|e| DecodeError::InvalidJson {
                details: e.to_string(),
            })?;

        let entries = value.as_object().ok_or_else(|| DecodeError::InvalidPayload {
            details: "top level is not an object".to_string(),
        })?;

        if entries.is_empty() {
            return Err(DecodeError::EmptyPayload);
        }

        let mut batches = Vec::with_capacity(entries.len());
        for (tag_id, readings_value) in entries {
            let raw: Vec<RawReading> = serde_json::from_value(readings_value.clone()).map_err(
                |e| DecodeError::InvalidPayload {
                    details: format!("readings for tag {}: {}", tag_id, e),
                },
            )?;

            let readings = raw
                .into_iter()
                .map(|reading| AnchorReading::new(reading.id, reading.rssi))
                .collect();
            batches.push(ObservationBatch::new(tag_id.clone(), readings));
        }

        Ok(batches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_single_tag() {
        let payload = br#"{"ESP32C3": [
            {"id": "ESP32-01", "rssi": -71},
            {"id": "ESP32-02", "rssi": -63}
        ]}"#;

        let batches = ScanDecoder::new().decode(payload).unwrap();

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].tag_id, "ESP32C3");
        assert_eq!(
            batches[0].readings,
            vec![
                AnchorReading::new("ESP32-01", -71),
                AnchorReading::new("ESP32-02", -63),
            ]
        );
    }

    #[test]
    fn test_decode_multiple_tags() {
        let payload = br#"{
            "tag-a": [{"id": "ESP32-01", "rssi": -70}],
            "tag-b": [{"id": "ESP32-02", "rssi": -55}]
        }"#;

        let batches = ScanDecoder::new().decode(payload).unwrap();

        assert_eq!(batches.len(), 2);
        let tags: Vec<&str> = batches.iter().map(|b| b.tag_id.as_str()).collect();
        assert!(tags.contains(&"tag-a"));
        assert!(tags.contains(&"tag-b"));
    }

    #[test]
    fn test_decode_ignores_extra_reading_fields() {
        let payload =
            br#"{"ESP32C3": [{"id": "ESP32-01", "rssi": -71, "channel": 37, "mac": "aa:bb"}]}"#;

        let batches = ScanDecoder::new().decode(payload).unwrap();
        assert_eq!(batches[0].readings[0].rssi, -71);
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        let error = ScanDecoder::new().decode(b"not json").unwrap_err();
        assert!(matches!(error, DecodeError::InvalidJson { .. }));
    }

    #[test]
    fn test_decode_rejects_non_object_top_level() {
        let error = ScanDecoder::new().decode(b"[1, 2, 3]").unwrap_err();
        assert!(matches!(error, DecodeError::InvalidPayload { .. }));
    }

    #[test]
    fn test_decode_rejects_missing_rssi() {
        let payload = br#"{"ESP32C3": [{"id": "ESP32-01"}]}"#;

        let error = ScanDecoder::new().decode(payload).unwrap_err();
        assert!(matches!(error, DecodeError::InvalidPayload { .. }));
    }

    #[test]
    fn test_decode_rejects_empty_object() {
        let error = ScanDecoder::new().decode(b"{}").unwrap_err();
        assert_eq!(error, DecodeError::EmptyPayload);
    }

    #[test]
    fn test_decode_allows_empty_reading_list() {
        // An empty cycle is well-formed; the estimator reports it as a
        // no-estimate cycle downstream.
        let batches = ScanDecoder::new().decode(br#"{"ESP32C3": []}"#).unwrap();
        assert!(batches[0].readings.is_empty());
    }
}
