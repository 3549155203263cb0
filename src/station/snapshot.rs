//! # Station Snapshots
//!
//! Read-only view of a charge station as the engine last reported it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OCPP 1.6 charge point status, reported per connector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargePointStatus {
    Available,
    Preparing,
    Charging,
    #[serde(rename = "SuspendedEVSE")]
    SuspendedEvse,
    #[serde(rename = "SuspendedEV")]
    SuspendedEv,
    Finishing,
    Reserved,
    Unavailable,
    Faulted,
}

/// OCPP 1.6 registration status from the boot notification exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationStatus {
    Accepted,
    Pending,
    Rejected,
}

/// State of one connector
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorSnapshot {
    /// Connector id as reported by the station (0 means the whole station)
    pub connector_id: u32,

    /// Last reported status
    pub status: ChargePointStatus,

    /// OCPP error code when the connector is faulted
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub error_code: Option<String>,

    /// Running transaction id, if a session is active
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub transaction_id: Option<i32>,
}

impl ConnectorSnapshot {
    /// A connector in the given status with no error and no transaction
    pub fn new(connector_id: u32, status: ChargePointStatus) -> Self {
        Self {
            connector_id,
            status,
            error_code: None,
            transaction_id: None,
        }
    }
}

/// Snapshot of one charge station
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationSnapshot {
    /// Station identifier
    pub charge_box_id: String,

    /// Vendor from the boot notification
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub vendor: Option<String>,

    /// Model from the boot notification
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub model: Option<String>,

    /// Firmware version from the boot notification
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub firmware_version: Option<String>,

    /// Outcome of the latest boot notification exchange
    pub registration_status: RegistrationStatus,

    /// Time of the last heartbeat
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub last_heartbeat: Option<DateTime<Utc>>,

    /// Connector states, ordered by connector id
    pub connectors: Vec<ConnectorSnapshot>,
}

impl StationSnapshot {
    /// A freshly seen station with nothing reported yet
    pub fn new(charge_box_id: impl Into<String>) -> Self {
        Self {
            charge_box_id: charge_box_id.into(),
            vendor: None,
            model: None,
            firmware_version: None,
            registration_status: RegistrationStatus::Pending,
            last_heartbeat: None,
            connectors: Vec::new(),
        }
    }

    /// Record the identity fields from a boot notification
    pub fn with_identity(
        mut self,
        vendor: impl Into<String>,
        model: impl Into<String>,
        firmware_version: impl Into<String>,
    ) -> Self {
        self.vendor = Some(vendor.into());
        self.model = Some(model.into());
        self.firmware_version = Some(firmware_version.into());
        self
    }

    /// Mark the station accepted by the central system
    pub fn accepted(mut self) -> Self {
        self.registration_status = RegistrationStatus::Accepted;
        self
    }

    /// Replace or insert one connector's state, keeping id order
    pub fn set_connector(&mut self, connector: ConnectorSnapshot) {
        match self
            .connectors
            .binary_search_by_key(&connector.connector_id, |c| c.connector_id)
        {
            Ok(i) => self.connectors[i] = connector,
            Err(i) => self.connectors.insert(i, connector),
        }
    }
}
