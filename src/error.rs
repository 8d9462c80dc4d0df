//! Error types for the flow-field visualization.
//!
//! The simulation core is purely numeric and cannot fail. The only fallible
//! edges are parsing control input coming from a UI and starting the
//! desktop window.

use thiserror::Error;

/// Errors produced when a raw control value cannot be turned into a
/// parameter change. A rejected value leaves the previous parameter in place.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlError {
    #[error("unknown control `{0}`")]
    UnknownControl(String),

    #[error("`{value}` is not a valid integer for {control}")]
    InvalidInteger { control: &'static str, value: String },

    #[error("`{value}` is not a valid number for {control}")]
    InvalidFloat { control: &'static str, value: String },

    #[error("{control} must be finite, got `{value}`")]
    NonFinite { control: &'static str, value: String },

    #[error("unknown color mode `{0}` (expected rainbow, monochrome or complementary)")]
    UnknownColorMode(String),
}

/// Errors surfaced by the desktop host.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to run window: {0}")]
    Window(#[from] eframe::Error),
}
