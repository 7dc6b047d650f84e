//! Backend-to-UI events and error modeling for the desktop GUI.

use client_core::{ControllerError, ControllerSnapshot, StoreError, StoreOp};

pub enum UiEvent {
    Snapshot(ControllerSnapshot),
    Info(String),
    /// Blocking alert; the rest of the window is disabled until dismissed.
    Alert(String),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    NotFound,
    Rejected,
    Server,
    Busy,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Load,
    Create,
    Update,
    Delete,
    General,
}

impl UiErrorContext {
    pub fn for_op(op: &StoreOp) -> Self {
        match op {
            StoreOp::List => UiErrorContext::Load,
            StoreOp::Create => UiErrorContext::Create,
            StoreOp::Update(_) => UiErrorContext::Update,
            StoreOp::Delete(_) => UiErrorContext::Delete,
        }
    }

    fn action(self) -> &'static str {
        match self {
            UiErrorContext::BackendStartup => "start the backend worker",
            UiErrorContext::Load => "load cinema records",
            UiErrorContext::Create => "add the cinema",
            UiErrorContext::Update => "update the cinema",
            UiErrorContext::Delete => "delete the cinema",
            UiErrorContext::General => "complete the request",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn new(
        category: UiErrorCategory,
        context: UiErrorContext,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            context,
            message: message.into(),
        }
    }

    pub fn from_store(context: UiErrorContext, err: &StoreError) -> Self {
        let category = match err {
            StoreError::Transport { .. } => UiErrorCategory::Transport,
            _ => match err.status() {
                Some(404) => UiErrorCategory::NotFound,
                Some(status) if status >= 500 => UiErrorCategory::Server,
                Some(status) if status >= 400 => UiErrorCategory::Rejected,
                _ => UiErrorCategory::Unknown,
            },
        };
        Self::new(category, context, err.to_string())
    }

    pub fn from_controller(err: &ControllerError) -> Self {
        match err {
            ControllerError::Request { op, source } => {
                Self::from_store(UiErrorContext::for_op(op), source)
            }
            ControllerError::InFlight(op) => Self::new(
                UiErrorCategory::Busy,
                UiErrorContext::for_op(op),
                err.to_string(),
            ),
            other => Self::new(
                UiErrorCategory::Unknown,
                UiErrorContext::General,
                other.to_string(),
            ),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn user_message(&self) -> String {
        let action = self.context.action();
        match self.category {
            UiErrorCategory::Transport => format!(
                "Could not {action}: cinema service unreachable; \
                 check the URL or network and retry."
            ),
            UiErrorCategory::NotFound => {
                format!("Could not {action}: the record no longer exists. Reload the list.")
            }
            UiErrorCategory::Rejected => {
                format!("Could not {action}: the service rejected the request.")
            }
            UiErrorCategory::Server => {
                format!("Could not {action}: the service failed; try again later.")
            }
            UiErrorCategory::Busy => format!("Still waiting to {action}; please wait."),
            UiErrorCategory::Unknown => format!("Could not {action}: {}", self.message),
        }
    }
}
