//! Fixed line colors.
//!
//! Canonical codes map to the operator's published line colors. Unknown
//! codes fall back to one default. Buses share a single color regardless of
//! line and are distinguished upstream by vehicle type.

use super::normalize;

/// Color used for all bus markers and labels.
pub const BUS_COLOR: &str = "#020224";

/// Fallback color for codes outside the known palette.
pub const DEFAULT_LINE_COLOR: &str = "#111827";

/// Look up the display color for a rail line.
///
/// The input is normalized first, so raw identifiers are accepted.
pub fn color_for_line(line: &str) -> &'static str {
    match normalize(line).as_str() {
        "7" => "#878C85",
        "10" | "11" => "#0091D2",
        "12" => "#738BA4",
        "13" | "14" => "#E31F26",
        "17" | "18" | "19" => "#00B259",
        "21" => "#B76934",
        "25" | "26" => "#21B6BA",
        "27" | "27S" | "28" | "28S" | "29" => "#A86DAE",
        "30" | "31" => "#E08A32",
        "40" | "41" | "43" | "43X" | "48" => "#ED66A5",
        _ => DEFAULT_LINE_COLOR,
    }
}
