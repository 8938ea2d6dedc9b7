//! Static anchor registry

use crate::core::types::Coordinate;
use std::collections::HashMap;

/// Read-only mapping from anchor identifier to its fixed coordinate.
///
/// Populated once at startup from configuration. Observations that
/// reference an identifier absent from the registry are excluded from
/// positioning; runtime reconfiguration replaces the registry wholesale.
#[derive(Debug, Clone, Default)]
pub struct AnchorRegistry {
    anchors: HashMap<String, Coordinate>,
}

impl AnchorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from (id, coordinate) pairs. A repeated id keeps
    /// the last coordinate given; configuration validation rejects
    /// duplicates before they reach this point.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Coordinate)>,
        S: Into<String>,
    {
        Self {
            anchors: entries
                .into_iter()
                .map(|(id, coordinate)| (id.into(), coordinate))
                .collect(),
        }
    }

    /// Look up the coordinate registered for an anchor
    pub fn coordinate_of(&self, anchor_id: &str) -> Option<Coordinate> {
        self.anchors.get(anchor_id).copied()
    }

    /// Whether an anchor id is registered
    pub fn contains(&self, anchor_id: &str) -> bool {
        self.anchors.contains_key(anchor_id)
    }

    /// Number of registered anchors
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Iterate over registered anchor ids
    pub fn anchor_ids(&self) -> impl Iterator<Item = &str> {
        self.anchors.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_registry() -> AnchorRegistry {
        AnchorRegistry::from_entries([
            ("ESP32-01", Coordinate::new(0.0, 0.0)),
            ("ESP32-02", Coordinate::new(8.0, 0.0)),
            ("ESP32-03", Coordinate::new(4.0, 4.0)),
        ])
    }

    #[test]
    fn test_lookup_registered_anchor() {
        let registry = create_test_registry();

        let coordinate = registry.coordinate_of("ESP32-02").unwrap();
        assert_eq!(coordinate, Coordinate::new(8.0, 0.0));
        assert!(registry.contains("ESP32-02"));
    }

    #[test]
    fn test_lookup_unknown_anchor() {
        let registry = create_test_registry();

        assert!(registry.coordinate_of("ESP32-99").is_none());
        assert!(!registry.contains("ESP32-99"));
    }

    #[test]
    fn test_registry_size() {
        let registry = create_test_registry();

        assert_eq!(registry.len(), 3);
        assert!(!registry.is_empty());
        assert!(AnchorRegistry::new().is_empty());
    }

    #[test]
    fn test_duplicate_entry_keeps_last() {
        let registry = AnchorRegistry::from_entries([
            ("ESP32-01", Coordinate::new(0.0, 0.0)),
            ("ESP32-01", Coordinate::new(2.0, 2.0)),
        ]);

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.coordinate_of("ESP32-01").unwrap(),
            Coordinate::new(2.0, 2.0)
        );
    }
}
