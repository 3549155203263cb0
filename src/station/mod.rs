//! # Station Module
//!
//! Read-only station state: the snapshot model, the directory seam the
//! HTTP layer queries, and charge box id validation.

pub mod registry;
pub mod snapshot;

pub use registry::{MemoryDirectory, StationDirectory};
pub use snapshot::{ChargePointStatus, ConnectorSnapshot, RegistrationStatus, StationSnapshot};

/// Longest accepted charge box id, per OCPP 1.6 CiString20
pub const MAX_CHARGE_BOX_ID_LEN: usize = 20;

/// True when `id` is a well-formed charge box identifier.
///
/// Well-formed means non-empty, at most [`MAX_CHARGE_BOX_ID_LEN`] bytes,
/// and only ASCII alphanumerics plus `.`, `_`, `:`, `-`.
pub fn is_valid_charge_box_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_CHARGE_BOX_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b':' | b'-'))
}
