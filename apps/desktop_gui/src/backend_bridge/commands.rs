//! Backend commands queued from UI to backend worker.

use shared::domain::{CinemaField, CinemaId, CinemaRecord};

#[derive(Debug)]
pub enum BackendCommand {
    Refresh,
    SetField { field: CinemaField, value: String },
    BeginEdit(CinemaRecord),
    CancelEdit,
    Submit,
    Delete { id: CinemaId },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Refresh => "refresh",
            BackendCommand::SetField { .. } => "set_field",
            BackendCommand::BeginEdit(_) => "begin_edit",
            BackendCommand::CancelEdit => "cancel_edit",
            BackendCommand::Submit => "submit",
            BackendCommand::Delete { .. } => "delete",
        }
    }

    /// Draft-only commands never touch the network and must be applied in queue order.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            BackendCommand::SetField { .. }
                | BackendCommand::BeginEdit(_)
                | BackendCommand::CancelEdit
        )
    }
}
