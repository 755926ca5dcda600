//! Hover and pinned label interaction.
//!
//! One controller per session arbitrates the two label slots: a hover label
//! following the pointer and a pinned label toggled by click. At most one of
//! each exists at any time, and a pinned vehicle is never displaced by hover
//! traffic. The pointer-over flag backs a global pointer-move fallback that
//! clears hover labels left behind by missed leave events.

use crate::coord::LatLon;
use crate::feed::VehicleId;
use crate::surface::{MarkerIcon, MarkerId, RenderSurface};

/// Pointer and click events consumed by the label state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelEvent {
    /// Pointer entered a vehicle marker.
    PointerEnter(VehicleId),
    /// Pointer left a vehicle marker.
    PointerLeave(VehicleId),
    /// Click on a vehicle marker.
    Click(VehicleId),
    /// Click anywhere that is not a vehicle.
    BackgroundClick,
    /// Pointer moved somewhere over the map.
    PointerMove,
}

/// Everything needed to build and place a label for one vehicle.
#[derive(Debug, Clone)]
pub struct LabelAnchor {
    pub vehicle: VehicleId,
    pub position: LatLon,
    pub text: String,
    pub color: &'static str,
}

/// Label text: `line[ → headsign]` plus an optional speed suffix.
pub fn label_text(line: &str, headsign: Option<&str>, speed_kmh: Option<f64>) -> String {
    let mut text = match headsign {
        Some(headsign) => format!("{line} → {headsign}"),
        None => line.to_string(),
    };
    if let Some(speed) = speed_kmh {
        if speed.is_finite() && speed >= 0.0 {
            text.push_str(&format!(" • {} km/h", speed.round() as i64));
        }
    }
    text
}

/// One placed label.
#[derive(Debug, Clone)]
struct ActiveLabel {
    vehicle: VehicleId,
    marker: MarkerId,
}

/// Current shape of the label state, for inspection.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelMode<'a> {
    Idle,
    Hovering(&'a str),
    Pinned(&'a str),
    PinnedAndHovering { pinned: &'a str, hover: &'a str },
}

/// The label state machine.
///
/// Invariants: at most one hover and one pinned label exist; when both
/// exist they belong to different vehicles.
#[derive(Debug, Default)]
pub struct LabelController {
    hover: Option<ActiveLabel>,
    pinned: Option<ActiveLabel>,
    pointer_over_vehicle: bool,
}

impl LabelController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derived state, for inspection and tests.
    pub fn mode(&self) -> LabelMode<'_> {
        match (&self.hover, &self.pinned) {
            (None, None) => LabelMode::Idle,
            (Some(h), None) => LabelMode::Hovering(&h.vehicle),
            (None, Some(p)) => LabelMode::Pinned(&p.vehicle),
            (Some(h), Some(p)) => LabelMode::PinnedAndHovering {
                pinned: &p.vehicle,
                hover: &h.vehicle,
            },
        }
    }

    /// Vehicle currently hovered, if any.
    pub fn hovered_vehicle(&self) -> Option<&str> {
        self.hover.as_ref().map(|label| label.vehicle.as_str())
    }

    /// Vehicle currently pinned, if any.
    pub fn pinned_vehicle(&self) -> Option<&str> {
        self.pinned.as_ref().map(|label| label.vehicle.as_str())
    }

    /// Whether the pointer is currently flagged as over a vehicle marker.
    pub fn pointer_over_vehicle(&self) -> bool {
        self.pointer_over_vehicle
    }

    /// Pointer entered a vehicle marker.
    ///
    /// Replaces any hover label belonging to a different vehicle. A pinned
    /// vehicle gets no hover label on top of its pin.
    pub fn pointer_enter<S: RenderSurface>(&mut self, surface: &mut S, anchor: &LabelAnchor) {
        self.pointer_over_vehicle = true;

        if self.pinned_vehicle() == Some(anchor.vehicle.as_str()) {
            return;
        }

        if let Some(hover) = &self.hover {
            if hover.vehicle != anchor.vehicle {
                surface.remove_marker(hover.marker);
                self.hover = None;
            }
        }

        match &self.hover {
            Some(hover) => {
                surface.move_marker(hover.marker, anchor.position);
                surface.set_marker_icon(hover.marker, Self::icon(anchor, false));
            }
            None => {
                let marker = surface.add_marker(anchor.position, Self::icon(anchor, false));
                self.hover = Some(ActiveLabel {
                    vehicle: anchor.vehicle.clone(),
                    marker,
                });
            }
        }
    }

    /// Pointer left a vehicle marker.
    ///
    /// Clears the hover label only if it belongs to this vehicle and the
    /// vehicle is not pinned.
    pub fn pointer_leave<S: RenderSurface>(&mut self, surface: &mut S, vehicle: &str) {
        self.pointer_over_vehicle = false;

        if self.hovered_vehicle() != Some(vehicle) {
            return;
        }
        if self.pinned_vehicle() == Some(vehicle) {
            return;
        }

        if let Some(hover) = self.hover.take() {
            surface.remove_marker(hover.marker);
        }
    }

    /// Click on a vehicle marker: clear hover, then toggle the pin.
    pub fn click<S: RenderSurface>(&mut self, surface: &mut S, anchor: &LabelAnchor) {
        if let Some(hover) = self.hover.take() {
            surface.remove_marker(hover.marker);
        }
        self.pointer_over_vehicle = false;

        if self.pinned_vehicle() == Some(anchor.vehicle.as_str()) {
            if let Some(pinned) = self.pinned.take() {
                surface.remove_marker(pinned.marker);
            }
            return;
        }

        if let Some(pinned) = self.pinned.take() {
            surface.remove_marker(pinned.marker);
        }

        let marker = surface.add_marker(anchor.position, Self::icon(anchor, true));
        self.pinned = Some(ActiveLabel {
            vehicle: anchor.vehicle.clone(),
            marker,
        });
    }

    /// Click somewhere that is not a vehicle: clear both labels.
    pub fn background_click<S: RenderSurface>(&mut self, surface: &mut S) {
        self.clear_all(surface);
    }

    /// Global pointer-move fallback.
    ///
    /// If the pointer is not over any vehicle but a hover label survives
    /// (a leave event was missed), force-clear it, unless the hovered
    /// vehicle is pinned.
    pub fn pointer_moved<S: RenderSurface>(&mut self, surface: &mut S) {
        if self.pointer_over_vehicle {
            return;
        }
        let Some(hover) = &self.hover else {
            return;
        };
        if self.pinned_vehicle() == Some(hover.vehicle.as_str()) {
            return;
        }

        if let Some(hover) = self.hover.take() {
            surface.remove_marker(hover.marker);
        }
    }

    /// Refresh the label content for an updated vehicle.
    pub fn vehicle_updated<S: RenderSurface>(&mut self, surface: &mut S, anchor: &LabelAnchor) {
        let vehicle = anchor.vehicle.as_str();

        if self.pinned_vehicle() == Some(vehicle) {
            let marker = self.pinned.as_ref().map(|p| p.marker);
            if let Some(marker) = marker {
                surface.set_marker_icon(marker, Self::icon(anchor, true));
            }
            return;
        }

        if self.hovered_vehicle() == Some(vehicle) {
            let marker = self.hover.as_ref().map(|h| h.marker);
            if let Some(marker) = marker {
                surface.set_marker_icon(marker, Self::icon(anchor, false));
            }
        }
    }

    /// Reposition any label attached to a vehicle; called once per
    /// animation frame so labels move in lock-step with their marker.
    pub fn follow_position<S: RenderSurface>(
        &mut self,
        surface: &mut S,
        vehicle: &str,
        position: LatLon,
    ) {
        if self.pinned_vehicle() == Some(vehicle) {
            if let Some(pinned) = &self.pinned {
                surface.move_marker(pinned.marker, position);
            }
            return;
        }

        if self.hovered_vehicle() == Some(vehicle) {
            if let Some(hover) = &self.hover {
                surface.move_marker(hover.marker, position);
            }
        }
    }

    /// A vehicle left the map: tear down any label referencing it.
    pub fn vehicle_evicted<S: RenderSurface>(&mut self, surface: &mut S, vehicle: &str) {
        if self.hovered_vehicle() == Some(vehicle) {
            if let Some(hover) = self.hover.take() {
                surface.remove_marker(hover.marker);
            }
        }
        if self.pinned_vehicle() == Some(vehicle) {
            if let Some(pinned) = self.pinned.take() {
                surface.remove_marker(pinned.marker);
            }
        }
    }

    /// Remove both labels and reset the pointer flag.
    pub fn clear_all<S: RenderSurface>(&mut self, surface: &mut S) {
        if let Some(hover) = self.hover.take() {
            surface.remove_marker(hover.marker);
        }
        if let Some(pinned) = self.pinned.take() {
            surface.remove_marker(pinned.marker);
        }
        self.pointer_over_vehicle = false;
    }

    fn icon(anchor: &LabelAnchor, pinned: bool) -> MarkerIcon {
        MarkerIcon::Label {
            text: anchor.text.clone(),
            color: anchor.color,
            pinned,
        }
    }
}
