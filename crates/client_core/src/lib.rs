//! Client side of the cinema collection: the REST store client and the
//! form-and-list controller that front ends drive.

pub mod config;
pub mod controller;
pub mod error;
pub mod store;

pub use config::{load_settings, parse_api_url, ClientSettings};
pub use controller::{
    CinemaController, ControllerEvent, ControllerSnapshot, Draft, DraftKind, MutationOutcome,
    PreparedSubmit, RefreshOutcome, StoreOp,
};
pub use error::{ControllerError, StoreError};
pub use store::{CinemaStore, HttpCinemaStore};
