use shared::error::{UnknownFieldError, ValidationError};
use thiserror::Error;

use crate::controller::{DraftKind, StoreOp};

/// Longest response body kept on a [`StoreError::Status`].
pub(crate) const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request {method} {url} failed: {source}")]
    Transport {
        method: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {url} returned HTTP {status}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },
    #[error("failed to decode response of {method} {url}: {source}")]
    Decode {
        method: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl StoreError {
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Status { status, .. } => Some(*status),
            StoreError::Transport { source, .. } | StoreError::Decode { source, .. } => {
                source.status().map(|status| status.as_u16())
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{op} failed: {source}")]
    Request {
        op: StoreOp,
        #[source]
        source: StoreError,
    },
    #[error("{0} is already in flight")]
    InFlight(StoreOp),
    #[error("expected {expected} draft but {actual} draft is active")]
    DraftMismatch {
        expected: DraftKind,
        actual: DraftKind,
    },
    #[error(transparent)]
    UnknownField(#[from] UnknownFieldError),
}

impl ControllerError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ControllerError::Validation(_))
    }
}
