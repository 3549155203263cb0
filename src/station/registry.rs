//! # Station Directory
//!
//! The engine-owned registry of known stations, seen through a read seam.
//!
//! The facade never mutates station state on its own; directory writes
//! belong to whatever feeds it (the engine bridge, or the demo feed).

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use super::snapshot::{ConnectorSnapshot, StationSnapshot};

/// Read access to the set of known stations
pub trait StationDirectory: Send + Sync {
    /// Identifiers of every known station, in stable order
    fn charge_box_ids(&self) -> Vec<String>;

    /// Snapshot of one station
    fn snapshot(&self, charge_box_id: &str) -> Option<StationSnapshot>;

    /// Snapshots of every known station, in stable order
    fn snapshots(&self) -> Vec<StationSnapshot>;
}

/// Thread-safe in-memory directory.
///
/// Keyed by charge box id in a `BTreeMap` so listings come out in a
/// stable lexicographic order.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    stations: RwLock<BTreeMap<String, StationSnapshot>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a station snapshot
    pub fn upsert(&self, snapshot: StationSnapshot) {
        let mut stations = self.write_stations();
        stations.insert(snapshot.charge_box_id.clone(), snapshot);
    }

    /// Update the last-heartbeat time of a known station
    pub fn record_heartbeat(&self, charge_box_id: &str, at: DateTime<Utc>) {
        let mut stations = self.write_stations();
        if let Some(station) = stations.get_mut(charge_box_id) {
            station.last_heartbeat = Some(at);
        }
    }

    /// Update one connector of a known station
    pub fn set_connector(&self, charge_box_id: &str, connector: ConnectorSnapshot) {
        let mut stations = self.write_stations();
        if let Some(station) = stations.get_mut(charge_box_id) {
            station.set_connector(connector);
        }
    }

    /// Number of known stations
    pub fn len(&self) -> usize {
        self.read_stations().len()
    }

    /// True when no station is known
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_stations(&self) -> RwLockReadGuard<'_, BTreeMap<String, StationSnapshot>> {
        self.stations.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_stations(&self) -> RwLockWriteGuard<'_, BTreeMap<String, StationSnapshot>> {
        self.stations.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StationDirectory for MemoryDirectory {
    fn charge_box_ids(&self) -> Vec<String> {
        self.read_stations().keys().cloned().collect()
    }

    fn snapshot(&self, charge_box_id: &str) -> Option<StationSnapshot> {
        self.read_stations().get(charge_box_id).cloned()
    }

    fn snapshots(&self) -> Vec<StationSnapshot> {
        self.read_stations().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station::snapshot::ChargePointStatus;
    use std::sync::Arc;

    #[test]
    fn test_ids_come_out_sorted() {
        let directory = MemoryDirectory::new();
        directory.upsert(StationSnapshot::new("CP-0002"));
        directory.upsert(StationSnapshot::new("CP-0001"));
        directory.upsert(StationSnapshot::new("ALPHA"));

        assert_eq!(
            directory.charge_box_ids(),
            vec!["ALPHA", "CP-0001", "CP-0002"]
        );
    }

    #[test]
    fn test_upsert_replaces() {
        let directory = MemoryDirectory::new();
        directory.upsert(StationSnapshot::new("CP-0001"));
        directory.upsert(StationSnapshot::new("CP-0001").with_identity("Acme", "X", "1.0"));

        assert_eq!(directory.len(), 1);
        let station = directory.snapshot("CP-0001").unwrap();
        assert_eq!(station.vendor.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_unknown_station_is_none() {
        let directory = MemoryDirectory::new();
        assert!(directory.snapshot("CP-9999").is_none());
    }

    #[test]
    fn test_record_heartbeat() {
        let directory = MemoryDirectory::new();
        directory.upsert(StationSnapshot::new("CP-0001"));

        let at = Utc::now();
        directory.record_heartbeat("CP-0001", at);
        // Unknown ids are ignored
        directory.record_heartbeat("CP-9999", at);

        let station = directory.snapshot("CP-0001").unwrap();
        assert_eq!(station.last_heartbeat, Some(at));
    }

    #[test]
    fn test_set_connector() {
        let directory = MemoryDirectory::new();
        directory.upsert(StationSnapshot::new("CP-0001"));
        directory.set_connector(
            "CP-0001",
            ConnectorSnapshot::new(1, ChargePointStatus::Preparing),
        );

        let station = directory.snapshot("CP-0001").unwrap();
        assert_eq!(station.connectors.len(), 1);
        assert_eq!(station.connectors[0].status, ChargePointStatus::Preparing);
    }

    #[test]
    fn test_usable_as_trait_object() {
        let directory: Arc<dyn StationDirectory> = Arc::new(MemoryDirectory::new());
        assert!(directory.charge_box_ids().is_empty());
        assert!(directory.snapshots().is_empty());
    }
}
