//! Domain-level building blocks shared across the SDK crates: publisher and
//! wallet vocabulary types, the cached-session model with its store contract,
//! environment configuration, and telemetry wiring.

pub mod config;
pub mod model;
pub mod services;
pub mod session;

pub use config::*;
pub use model::*;
pub use session::*;
