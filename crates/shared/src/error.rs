use thiserror::Error;

use crate::domain::CinemaField;

/// A record was submitted with at least one empty content field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{}", ValidationError::ALERT, missing_suffix(.missing))]
pub struct ValidationError {
    pub missing: Vec<CinemaField>,
}

impl ValidationError {
    /// Text of the blocking alert shown to the user.
    pub const ALERT: &'static str = "All fields are required!";
}

fn missing_suffix(missing: &[CinemaField]) -> String {
    if missing.is_empty() {
        return String::new();
    }
    let names: Vec<&str> = missing.iter().map(|field| field.as_str()).collect();
    format!(" (missing: {})", names.join(", "))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown cinema field `{0}`")]
pub struct UnknownFieldError(pub String);
