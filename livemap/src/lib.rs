//! LiveMap - live transit vehicle tracking for a map surface.
//!
//! This library keeps a set of on-map vehicle markers synchronized with a
//! polled snapshot endpoint. It owns the tracking and animation state
//! machine together with heading inference, the hover/pin label
//! interaction, and the line-selection filter; the map surface itself
//! (tiles, projection, widgets) is an external collaborator behind the
//! [`surface::RenderSurface`] trait.
//!
//! # Architecture
//!
//! ```text
//! runtime (tokio timers, fetch)  ──►  session (reconciliation)
//!                                        │
//!                 ┌──────────────┬───────┼────────────┬───────────┐
//!              selection       heading  track       label      surface
//!              (filter)      (bearing) (animation) (hover/pin) (markers)
//! ```
//!
//! The session is mutated from a single task; all timing is injected, so
//! the whole core is testable without real delays.

pub mod app;
pub mod coord;
pub mod feed;
pub mod heading;
pub mod label;
pub mod line;
pub mod runtime;
pub mod selection;
pub mod session;
pub mod surface;
pub mod telemetry;
pub mod track;

pub use app::{build_session, AppConfig, AppError};
pub use session::{LiveSession, SelectionCommand, UiEvent};
