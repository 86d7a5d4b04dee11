//! Outbound OCPP 1.6 action vocabulary.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OcppAction {
    RemoteStartTransaction,
    RemoteStopTransaction,
    GetConfiguration,
    ChangeConfiguration,
    ChangeAvailability,
    ClearCache,
    Reset,
    UnlockConnector,
    GetDiagnostics,
    UpdateFirmware,
    ReserveNow,
    CancelReservation,
    DataTransfer,
    GetLocalListVersion,
    SendLocalList,
    TriggerMessage,
    GetCompositeSchedule,
    ClearChargingProfile,
    SetChargingProfile,
}

impl OcppAction {
    pub fn as_str(self) -> &'static str {
        match self {
            OcppAction::RemoteStartTransaction => "RemoteStartTransaction",
            OcppAction::RemoteStopTransaction => "RemoteStopTransaction",
            OcppAction::GetConfiguration => "GetConfiguration",
            OcppAction::ChangeConfiguration => "ChangeConfiguration",
            OcppAction::ChangeAvailability => "ChangeAvailability",
            OcppAction::ClearCache => "ClearCache",
            OcppAction::Reset => "Reset",
            OcppAction::UnlockConnector => "UnlockConnector",
            OcppAction::GetDiagnostics => "GetDiagnostics",
            OcppAction::UpdateFirmware => "UpdateFirmware",
            OcppAction::ReserveNow => "ReserveNow",
            OcppAction::CancelReservation => "CancelReservation",
            OcppAction::DataTransfer => "DataTransfer",
            OcppAction::GetLocalListVersion => "GetLocalListVersion",
            OcppAction::SendLocalList => "SendLocalList",
            OcppAction::TriggerMessage => "TriggerMessage",
            OcppAction::GetCompositeSchedule => "GetCompositeSchedule",
            OcppAction::ClearChargingProfile => "ClearChargingProfile",
            OcppAction::SetChargingProfile => "SetChargingProfile",
        }
    }

    /// GetDiagnostics and UpdateFirmware can take much longer than a normal
    /// round trip (the charger may be uploading/downloading a file before
    /// it acks), so they get the long timeout.
    pub fn uses_long_timeout(self) -> bool {
        matches!(self, OcppAction::GetDiagnostics | OcppAction::UpdateFirmware)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn firmware_and_diagnostics_get_the_long_timeout() {
        assert!(OcppAction::GetDiagnostics.uses_long_timeout());
        assert!(OcppAction::UpdateFirmware.uses_long_timeout());
        assert!(!OcppAction::RemoteStartTransaction.uses_long_timeout());
    }
}
