//! # Demo Feed
//!
//! Synthetic charge point traffic for exercising the monitor without a
//! central system attached. Started by `serve --demo`.
//!
//! Three stations boot and report their connectors, then loop through
//! heartbeats and charging sessions with meter values.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::ocpp::operation::find;
use crate::ocpp::{EventRecorder, Initiator};
use crate::station::{ChargePointStatus, ConnectorSnapshot, MemoryDirectory, StationSnapshot};

/// Charge box ids the feed simulates
const STATIONS: &[&str] = &["CP-0001", "CP-0002", "CP-0003"];

/// Spawn the background feed task.
///
/// Runs until the serve runtime is dropped.
pub fn spawn_feed(recorder: EventRecorder, directory: Arc<MemoryDirectory>) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(stations = STATIONS.len(), "demo feed starting");
        boot_all(&recorder, &directory).await;

        let mut transaction_id = 1000_i32;
        let mut cycle = 0_usize;
        loop {
            for charge_box_id in STATIONS {
                heartbeat(&recorder, &directory, charge_box_id).await;
            }

            let station = STATIONS[cycle % STATIONS.len()];
            charging_session(&recorder, &directory, station, &mut transaction_id).await;

            cycle += 1;
            sleep(Duration::from_secs(2)).await;
        }
    })
}

/// Record one request/response pair for a charge-point-initiated action
async fn exchange(
    recorder: &EventRecorder,
    action: &str,
    charge_box_id: &str,
    request: Value,
    response: Value,
) {
    if let Some(operation) = find(action, Initiator::ChargePoint) {
        let token = recorder.request(operation, charge_box_id, request);
        sleep(Duration::from_millis(20)).await;
        recorder.response(token, response);
    }
}

/// Boot every station and mark its connector available
async fn boot_all(recorder: &EventRecorder, directory: &MemoryDirectory) {
    for (i, charge_box_id) in STATIONS.iter().enumerate() {
        let firmware = format!("1.4.{}", i);

        exchange(
            recorder,
            "BootNotification",
            charge_box_id,
            json!({
                "chargePointVendor": "Acme",
                "chargePointModel": "FastCharge 22",
                "firmwareVersion": firmware,
            }),
            json!({
                "status": "Accepted",
                "currentTime": Utc::now(),
                "interval": 300,
            }),
        )
        .await;

        directory.upsert(
            StationSnapshot::new(*charge_box_id)
                .with_identity("Acme", "FastCharge 22", firmware)
                .accepted(),
        );

        exchange(
            recorder,
            "StatusNotification",
            charge_box_id,
            json!({
                "connectorId": 1,
                "status": "Available",
                "errorCode": "NoError",
            }),
            json!({}),
        )
        .await;

        directory.set_connector(
            charge_box_id,
            ConnectorSnapshot::new(1, ChargePointStatus::Available),
        );
    }
}

/// One heartbeat exchange, mirrored into the directory
async fn heartbeat(recorder: &EventRecorder, directory: &MemoryDirectory, charge_box_id: &str) {
    exchange(
        recorder,
        "Heartbeat",
        charge_box_id,
        json!({}),
        json!({"currentTime": Utc::now()}),
    )
    .await;

    directory.record_heartbeat(charge_box_id, Utc::now());
}

/// A full charging session: authorize, start, meter values, stop
async fn charging_session(
    recorder: &EventRecorder,
    directory: &MemoryDirectory,
    charge_box_id: &str,
    transaction_id: &mut i32,
) {
    *transaction_id += 1;
    let transaction = *transaction_id;

    exchange(
        recorder,
        "Authorize",
        charge_box_id,
        json!({"idTag": "DEADBEEF"}),
        json!({"idTagInfo": {"status": "Accepted"}}),
    )
    .await;

    exchange(
        recorder,
        "StartTransaction",
        charge_box_id,
        json!({
            "connectorId": 1,
            "idTag": "DEADBEEF",
            "meterStart": 0,
            "timestamp": Utc::now(),
        }),
        json!({
            "transactionId": transaction,
            "idTagInfo": {"status": "Accepted"},
        }),
    )
    .await;

    let mut charging = ConnectorSnapshot::new(1, ChargePointStatus::Charging);
    charging.transaction_id = Some(transaction);
    directory.set_connector(charge_box_id, charging);

    for sample in 1..=3 {
        exchange(
            recorder,
            "MeterValues",
            charge_box_id,
            json!({
                "connectorId": 1,
                "transactionId": transaction,
                "meterValue": [{
                    "timestamp": Utc::now(),
                    "sampledValue": [{"value": (sample * 700).to_string(), "unit": "Wh"}],
                }],
            }),
            json!({}),
        )
        .await;

        sleep(Duration::from_millis(150)).await;
    }

    exchange(
        recorder,
        "StopTransaction",
        charge_box_id,
        json!({
            "transactionId": transaction,
            "meterStop": 2100,
            "timestamp": Utc::now(),
        }),
        json!({"idTagInfo": {"status": "Accepted"}}),
    )
    .await;

    directory.set_connector(
        charge_box_id,
        ConnectorSnapshot::new(1, ChargePointStatus::Available),
    );
}
