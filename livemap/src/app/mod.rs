//! Application assembly.
//!
//! Configuration constants, the bootstrap helper wiring the default
//! collaborators together, and the bootstrap-time error type.

mod bootstrap;
mod config;
mod error;

pub use bootstrap::build_session;
pub use config::{
    AppConfig, DEFAULT_FRAME_INTERVAL, DEFAULT_POLL_INTERVAL, MOVEMENT_EPSILON_DEG,
    SNAP_EPSILON_DEG,
};
pub use error::AppError;
