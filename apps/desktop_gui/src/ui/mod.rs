//! UI layer for desktop GUI: app shell and panels.

pub mod app;
pub mod panels;

pub use app::CinemaApp;
