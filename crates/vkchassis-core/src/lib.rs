//! Shared building blocks of the handle-wrapping dispatch layer: the
//! outer/inner handle translator, layer configuration and the core error type.

pub mod config;
pub mod error;
pub mod handle_map;

pub use config::{ChassisConfig, LayerSettings, UnknownHandlePolicy};
pub use error::CoreError;
pub use handle_map::HandleTranslator;
