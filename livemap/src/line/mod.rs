//! Line classification.
//!
//! Normalizes raw line identifiers into canonical codes and maps them to
//! display colors and mode groups. Buses are identified by the GTFS route
//! type on the vehicle record, never by code membership.

mod mode;
mod normalize;
mod palette;

pub use mode::{mode_for_line, TransitMode};
pub use normalize::normalize;
pub use palette::{color_for_line, BUS_COLOR, DEFAULT_LINE_COLOR};

/// GTFS route type identifying a bus vehicle.
pub const BUS_ROUTE_TYPE: u16 = 700;
