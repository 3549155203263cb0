//! # OCPP Operation Table
//!
//! Declarative registry of every OCPP 1.6 operation the monitor records.
//!
//! One table entry per operation replaces a hand-written registration per
//! notification hook. Event names derive from the action name:
//! `<Action>Request` and `<Action>Response`.

use serde::Serialize;

/// Which side of the OCPP link initiates an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Initiator {
    /// Sent by the charge point to the central system
    ChargePoint,
    /// Sent by the central system to the charge point
    CentralSystem,
}

/// One OCPP 1.6 operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Operation {
    /// OCPP action name, e.g. "BootNotification"
    pub action: &'static str,

    /// Initiating side
    pub initiator: Initiator,
}

impl Operation {
    /// Event name for the request notification
    pub fn request_event(&self) -> String {
        format!("{}Request", self.action)
    }

    /// Event name for the response notification
    pub fn response_event(&self) -> String {
        format!("{}Response", self.action)
    }
}

const fn charge_point(action: &'static str) -> Operation {
    Operation {
        action,
        initiator: Initiator::ChargePoint,
    }
}

const fn central_system(action: &'static str) -> Operation {
    Operation {
        action,
        initiator: Initiator::CentralSystem,
    }
}

/// Every OCPP 1.6 operation, charge-point-initiated first.
///
/// DataTransfer appears once per direction; OCPP defines it for both.
pub const OPERATIONS: &[Operation] = &[
    // Charge point → central system
    charge_point("Authorize"),
    charge_point("BootNotification"),
    charge_point("DataTransfer"),
    charge_point("DiagnosticsStatusNotification"),
    charge_point("FirmwareStatusNotification"),
    charge_point("Heartbeat"),
    charge_point("MeterValues"),
    charge_point("StartTransaction"),
    charge_point("StatusNotification"),
    charge_point("StopTransaction"),
    // Central system → charge point
    central_system("CancelReservation"),
    central_system("ChangeAvailability"),
    central_system("ChangeConfiguration"),
    central_system("ClearCache"),
    central_system("ClearChargingProfile"),
    central_system("DataTransfer"),
    central_system("GetCompositeSchedule"),
    central_system("GetConfiguration"),
    central_system("GetDiagnostics"),
    central_system("GetLocalListVersion"),
    central_system("RemoteStartTransaction"),
    central_system("RemoteStopTransaction"),
    central_system("ReserveNow"),
    central_system("Reset"),
    central_system("SendLocalList"),
    central_system("SetChargingProfile"),
    central_system("TriggerMessage"),
    central_system("UnlockConnector"),
    central_system("UpdateFirmware"),
];

/// Find an operation by action name and initiating side
pub fn find(action: &str, initiator: Initiator) -> Option<&'static Operation> {
    OPERATIONS
        .iter()
        .find(|op| op.action == action && op.initiator == initiator)
}
