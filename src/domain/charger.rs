//! Charger-facing status vocabulary.
//!
//! `ChargerAvailability` is the coarse status the control plane reports;
//! OCPP's `StatusNotification.status` is a finer-grained wire value that the
//! session engine folds down into one of these.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargerAvailability {
    Available,
    Preparing,
    Charging,
    Unavailable,
    Faulted,
}

impl ChargerAvailability {
    /// Maps an OCPP 1.6 `ChargePointStatus` wire value to the coarse
    /// availability the control plane exposes. Unknown values fold to
    /// `Unavailable` rather than panicking -- chargers occasionally send
    /// vendor extensions here.
    pub fn from_ocpp_status(status: &str) -> Self {
        match status {
            "Available" => ChargerAvailability::Available,
            "Preparing" => ChargerAvailability::Preparing,
            "Charging" => ChargerAvailability::Charging,
            "SuspendedEVSE" | "SuspendedEV" | "Finishing" => ChargerAvailability::Preparing,
            "Reserved" | "Unavailable" => ChargerAvailability::Unavailable,
            "Faulted" => ChargerAvailability::Faulted,
            _ => ChargerAvailability::Unavailable,
        }
    }

    /// Whether a connector in this availability state is considered idle
    /// for the purpose of terminalizing a stale placeholder session.
    pub fn is_idle(self) -> bool {
        matches!(self, ChargerAvailability::Available | ChargerAvailability::Preparing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultType {
    Overcurrent,
    GroundFault,
    CpError,
}

impl FaultType {
    pub fn from_ocpp_error_code(code: &str) -> Self {
        match code {
            "OverCurrentFailure" => FaultType::Overcurrent,
            "GroundFailure" => FaultType::GroundFault,
            _ => FaultType::CpError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suspended_statuses_fold_to_preparing() {
        assert_eq!(ChargerAvailability::from_ocpp_status("SuspendedEVSE"), ChargerAvailability::Preparing);
        assert_eq!(ChargerAvailability::from_ocpp_status("SuspendedEV"), ChargerAvailability::Preparing);
        assert_eq!(ChargerAvailability::from_ocpp_status("Finishing"), ChargerAvailability::Preparing);
    }

    #[test]
    fn unknown_status_is_unavailable_not_a_panic() {
        assert_eq!(ChargerAvailability::from_ocpp_status("SomeVendorValue"), ChargerAvailability::Unavailable);
    }

    #[test]
    fn fault_code_mapping_defaults_to_cp_error() {
        assert_eq!(FaultType::from_ocpp_error_code("OverCurrentFailure"), FaultType::Overcurrent);
        assert_eq!(FaultType::from_ocpp_error_code("GroundFailure"), FaultType::GroundFault);
        assert_eq!(FaultType::from_ocpp_error_code("OtherError"), FaultType::CpError);
        assert_eq!(FaultType::from_ocpp_error_code("WeirdVendorCode"), FaultType::CpError);
    }
}
