//! The live map session.
//!
//! One [`LiveSession`] owns all mutable state of the tracking core: the
//! per-vehicle table, the selection, the label controller, and the set of
//! line codes seen so far. The reconciliation of a snapshot into that state
//! happens here; fetching and timers live in the [`runtime`](crate::runtime)
//! module so every method on the session can be driven with injected
//! timestamps in tests.
//!
//! Ordering discipline within a tick: the filter decides before render
//! state is touched, and labels are cleared before track state is dropped,
//! so labels never dangle on evicted vehicles.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::app::AppConfig;
use crate::feed::{enrich, RawVehicle, TripLookup, Vehicle, VehicleId};
use crate::heading::HeadingTracker;
use crate::label::{label_text, LabelAnchor, LabelController, LabelEvent};
use crate::line::{color_for_line, BUS_COLOR};
use crate::selection::{self, SelectionState, SelectionStore};
use crate::surface::{MarkerIcon, RenderSurface};
use crate::telemetry::SessionMetrics;
use crate::track::{duration_for_pixels, Retarget, VehicleTrackState};

/// Commands mutating the selection. Every one of them is persisted through
/// the selection store after it is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionCommand {
    ToggleLine(String),
    ToggleBus,
    SelectAll,
    Clear,
    Search(String),
}

/// Events from the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Label(LabelEvent),
    Selection(SelectionCommand),
}

/// All state of one live map, mutated from a single task.
pub struct LiveSession<S: RenderSurface> {
    config: AppConfig,
    surface: S,
    lookup: Box<dyn TripLookup>,
    store: Box<dyn SelectionStore>,
    selection: SelectionState,
    vehicles: HashMap<VehicleId, VehicleTrackState>,
    labels: LabelController,
    known_lines: BTreeSet<String>,
    metrics: Arc<SessionMetrics>,
}

impl<S: RenderSurface> LiveSession<S> {
    /// Create a session. The persisted selection is loaded immediately,
    /// failing soft to showing all lines.
    pub fn new(
        surface: S,
        lookup: Box<dyn TripLookup>,
        store: Box<dyn SelectionStore>,
        config: AppConfig,
    ) -> Self {
        let selection = selection::load_or_default(&*store);
        Self {
            config,
            surface,
            lookup,
            store,
            selection,
            vehicles: HashMap::new(),
            labels: LabelController::new(),
            known_lines: BTreeSet::new(),
            metrics: Arc::new(SessionMetrics::new()),
        }
    }

    /// Reconcile one snapshot into the session.
    ///
    /// After this returns, the tracked-id set equals exactly the admitted
    /// ids of the snapshot: new vehicles are created, known ones are fed
    /// through heading inference and animation, and everything absent or
    /// filtered out is evicted.
    pub fn apply_snapshot(&mut self, records: &[RawVehicle], now: Instant) {
        if self.selection.is_none() {
            self.evict_all();
            self.metrics.tick_applied();
            self.metrics.set_tracked(0);
            return;
        }

        for state in self.vehicles.values_mut() {
            state.visible = false;
        }

        for raw in records {
            let Some(vehicle) = enrich(raw, &*self.lookup) else {
                continue;
            };
            self.known_lines.insert(vehicle.line.clone());

            if !self.selection.is_visible(&vehicle.line, vehicle.is_bus()) {
                self.evict(&vehicle.id);
                continue;
            }

            self.upsert_vehicle(vehicle, now);
        }

        let gone: Vec<VehicleId> = self
            .vehicles
            .iter()
            .filter(|(_, state)| !state.visible)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &gone {
            self.evict(id);
        }

        self.metrics.tick_applied();
        self.metrics.set_tracked(self.vehicles.len() as u64);
        debug!(tracked = self.vehicles.len(), "Snapshot applied");
    }

    /// Advance all in-flight animations one frame.
    ///
    /// Returns whether any animation is still running afterwards, so the
    /// driver can disarm its frame timer when the map is at rest.
    pub fn advance_animations(&mut self, now: Instant) -> bool {
        let mut active = false;

        for (id, state) in self.vehicles.iter_mut() {
            let Some(position) = state.advance(now) else {
                continue;
            };
            self.surface.move_marker(state.marker, position);
            self.labels.follow_position(&mut self.surface, id, position);
            if state.animation.is_some() {
                active = true;
            }
        }

        active
    }

    /// Whether any marker animation is in flight.
    pub fn has_active_animations(&self) -> bool {
        self.vehicles.values().any(|state| state.animation.is_some())
    }

    /// Dispatch one UI event.
    pub fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Label(event) => self.handle_label_event(event),
            UiEvent::Selection(command) => self.apply_selection(command),
        }
    }

    /// Apply a selection command and persist the result.
    ///
    /// A selection that ends up hiding everything evicts all tracked
    /// vehicles immediately rather than waiting for the next tick.
    pub fn apply_selection(&mut self, command: SelectionCommand) {
        match command {
            SelectionCommand::ToggleLine(code) => self.selection.toggle_line(&code),
            SelectionCommand::ToggleBus => self.selection.toggle_bus(),
            SelectionCommand::SelectAll => self.selection.select_all(),
            SelectionCommand::Clear => self.selection.clear(),
            SelectionCommand::Search(text) => self.selection.set_from_search(&text),
        }
        selection::save_or_log(&mut *self.store, &self.selection);

        if self.selection.is_none() {
            self.evict_all();
            self.metrics.set_tracked(0);
        }
    }

    /// Feed one pointer/click event into the label state machine.
    pub fn handle_label_event(&mut self, event: LabelEvent) {
        match event {
            LabelEvent::PointerEnter(id) => {
                let Some(anchor) = self.anchor_for(&id) else {
                    return;
                };
                self.labels.pointer_enter(&mut self.surface, &anchor);
            }
            LabelEvent::PointerLeave(id) => {
                self.labels.pointer_leave(&mut self.surface, &id);
            }
            LabelEvent::Click(id) => {
                let Some(anchor) = self.anchor_for(&id) else {
                    return;
                };
                self.labels.click(&mut self.surface, &anchor);
            }
            LabelEvent::BackgroundClick => {
                self.labels.background_click(&mut self.surface);
            }
            LabelEvent::PointerMove => {
                self.labels.pointer_moved(&mut self.surface);
            }
        }
    }

    /// Current selection.
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Label state, for inspection.
    pub fn labels(&self) -> &LabelController {
        &self.labels
    }

    /// Number of tracked vehicles.
    pub fn tracked_count(&self) -> usize {
        self.vehicles.len()
    }

    /// Whether a vehicle id is currently tracked.
    pub fn is_tracked(&self, id: &str) -> bool {
        self.vehicles.contains_key(id)
    }

    /// Ids of all tracked vehicles.
    pub fn tracked_ids(&self) -> impl Iterator<Item = &str> {
        self.vehicles.keys().map(|id| id.as_str())
    }

    /// Every canonical line code observed this session.
    pub fn known_lines(&self) -> &BTreeSet<String> {
        &self.known_lines
    }

    /// Shared metrics handle.
    pub fn metrics(&self) -> Arc<SessionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Session configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The render surface, for inspection.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    fn upsert_vehicle(&mut self, vehicle: Vehicle, now: Instant) {
        let epsilon = self.config.movement_epsilon_deg;

        if let Some(state) = self.vehicles.get_mut(&vehicle.id) {
            let update = state
                .heading
                .observe(vehicle.position, vehicle.bearing, epsilon);
            let icon = marker_icon(&vehicle, update.bearing(), update.is_first_established());
            self.surface.set_marker_icon(state.marker, icon);

            let from = self.surface.project(state.position_at(now));
            let to = self.surface.project(vehicle.position);
            let duration = duration_for_pixels(from.distance_to(&to), &self.config.animation);

            let outcome = state.retarget(
                vehicle.position,
                duration,
                self.config.snap_epsilon_deg,
                now,
            );
            if outcome == Retarget::Snapped {
                self.surface.move_marker(state.marker, vehicle.position);
            }

            state.visible = true;
            state.last = vehicle;

            let anchor = anchor_from(&state.last);
            self.labels.vehicle_updated(&mut self.surface, &anchor);
        } else {
            let mut heading = HeadingTracker::new();
            let update = heading.observe(vehicle.position, vehicle.bearing, epsilon);
            // A brand-new marker never gets the appearance cue.
            let icon = marker_icon(&vehicle, update.bearing(), false);
            let marker = self.surface.add_marker(vehicle.position, icon);

            self.vehicles.insert(
                vehicle.id.clone(),
                VehicleTrackState::new(marker, heading, vehicle),
            );
        }

        self.metrics.vehicle_upserted();
    }

    /// Tear down one vehicle: labels first, then render state.
    fn evict(&mut self, id: &str) {
        let Some(state) = self.vehicles.remove(id) else {
            return;
        };
        self.labels.vehicle_evicted(&mut self.surface, id);
        self.surface.remove_marker(state.marker);
        self.metrics.vehicle_evicted();
    }

    fn evict_all(&mut self) {
        let ids: Vec<VehicleId> = self.vehicles.keys().cloned().collect();
        for id in &ids {
            self.evict(id);
        }
        self.labels.clear_all(&mut self.surface);
    }

    fn anchor_for(&self, id: &str) -> Option<LabelAnchor> {
        self.vehicles.get(id).map(|state| anchor_from(&state.last))
    }
}

/// Label content for a vehicle's latest state.
fn anchor_from(vehicle: &Vehicle) -> LabelAnchor {
    LabelAnchor {
        vehicle: vehicle.id.clone(),
        position: vehicle.position,
        text: label_text(&vehicle.line, vehicle.headsign.as_deref(), vehicle.speed_kmh),
        color: if vehicle.is_bus() {
            BUS_COLOR
        } else {
            color_for_line(&vehicle.line)
        },
    }
}

/// Marker icon for a vehicle and rendering bearing.
fn marker_icon(vehicle: &Vehicle, bearing: Option<f64>, appear: bool) -> MarkerIcon {
    if vehicle.is_bus() {
        MarkerIcon::Bus {
            bearing_deg: bearing,
        }
    } else {
        let color = color_for_line(&vehicle.line);
        match bearing {
            Some(bearing_deg) => MarkerIcon::RailArrow {
                color,
                bearing_deg,
                appear,
            },
            None => MarkerIcon::RailDot { color },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{StaticTripLookup, TripInfo};
    use crate::line::BUS_ROUTE_TYPE;
    use crate::selection::MemoryStore;
    use crate::surface::tests::RecordingSurface;
    use std::time::Duration;

    fn lookup() -> StaticTripLookup {
        StaticTripLookup::from_entries([
            (
                "trip-14".to_string(),
                TripInfo {
                    line: "14".to_string(),
                    headsign: Some("Fruängen".to_string()),
                    vehicle_type: Some(401),
                },
            ),
            (
                "trip-17".to_string(),
                TripInfo {
                    line: "17".to_string(),
                    headsign: None,
                    vehicle_type: Some(401),
                },
            ),
            (
                "trip-bus-4".to_string(),
                TripInfo {
                    line: "4".to_string(),
                    headsign: Some("Radiohuset".to_string()),
                    vehicle_type: Some(BUS_ROUTE_TYPE),
                },
            ),
        ])
    }

    fn make_session() -> LiveSession<RecordingSurface> {
        make_session_with_store(MemoryStore::new())
    }

    fn make_session_with_store(store: MemoryStore) -> LiveSession<RecordingSurface> {
        LiveSession::new(
            RecordingSurface::new(),
            Box::new(lookup()),
            Box::new(store),
            AppConfig::new("https://example.test/vehicles"),
        )
    }

    fn raw(id: &str, trip: &str, lat: f64, lon: f64) -> RawVehicle {
        RawVehicle {
            id: Some(id.to_string()),
            lat: Some(lat),
            lon: Some(lon),
            trip_id: Some(trip.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_snapshot_creates_and_converges() {
        let mut session = make_session();
        let now = Instant::now();

        session.apply_snapshot(
            &[
                raw("a", "trip-14", 59.33, 18.07),
                raw("b", "trip-17", 59.34, 18.08),
            ],
            now,
        );
        assert_eq!(session.tracked_count(), 2);

        // Second snapshot without "a": it is evicted, "c" appears.
        session.apply_snapshot(
            &[
                raw("b", "trip-17", 59.34, 18.08),
                raw("c", "trip-14", 59.35, 18.09),
            ],
            now + Duration::from_secs(3),
        );

        let mut ids: Vec<&str> = session.tracked_ids().collect();
        ids.sort_unstable();
        assert_eq!(ids, ["b", "c"]);
        assert_eq!(session.surface().marker_count(), 2);
    }

    #[test]
    fn test_unknown_trip_is_dropped() {
        let mut session = make_session();
        session.apply_snapshot(&[raw("a", "trip-unknown", 59.33, 18.07)], Instant::now());
        assert_eq!(session.tracked_count(), 0);
    }

    #[test]
    fn test_selection_none_evicts_everything() {
        let mut session = make_session();
        let now = Instant::now();
        session.apply_snapshot(&[raw("a", "trip-14", 59.33, 18.07)], now);
        assert_eq!(session.tracked_count(), 1);

        session.apply_selection(SelectionCommand::Clear);
        assert_eq!(session.tracked_count(), 0);
        assert_eq!(session.surface().marker_count(), 0);

        // Subsequent snapshots stay empty while cleared.
        session.apply_snapshot(&[raw("a", "trip-14", 59.33, 18.07)], now);
        assert_eq!(session.tracked_count(), 0);
    }

    #[test]
    fn test_deselecting_last_line_evicts_immediately() {
        let mut session = make_session();
        let now = Instant::now();

        session.apply_selection(SelectionCommand::ToggleLine("14".to_string()));
        session.apply_snapshot(&[raw("a", "trip-14", 59.33, 18.07)], now);
        assert_eq!(session.tracked_count(), 1);

        session.apply_selection(SelectionCommand::ToggleLine("14".to_string()));
        assert!(session.selection().is_none());
        assert_eq!(session.tracked_count(), 0);
    }

    #[test]
    fn test_filtered_vehicle_is_evicted_on_tick() {
        let mut session = make_session();
        let now = Instant::now();

        session.apply_snapshot(
            &[
                raw("a", "trip-14", 59.33, 18.07),
                raw("b", "trip-17", 59.34, 18.08),
            ],
            now,
        );
        assert_eq!(session.tracked_count(), 2);

        // Restrict to line 14; next tick drops the 17.
        session.apply_selection(SelectionCommand::ToggleLine("14".to_string()));
        session.apply_snapshot(
            &[
                raw("a", "trip-14", 59.33, 18.07),
                raw("b", "trip-17", 59.34, 18.08),
            ],
            now + Duration::from_secs(3),
        );

        assert!(session.is_tracked("a"));
        assert!(!session.is_tracked("b"));
    }

    #[test]
    fn test_search_admits_bus_by_code() {
        let mut session = make_session();
        let now = Instant::now();

        session.apply_selection(SelectionCommand::Search("14,4".to_string()));

        session.apply_snapshot(
            &[
                raw("a", "trip-14", 59.33, 18.07),
                raw("bus4", "trip-bus-4", 59.35, 18.09),
                raw("b", "trip-17", 59.34, 18.08),
            ],
            now,
        );

        // Rail 14 passes, bus line 4 passes on its code, rail 17 is hidden.
        assert!(session.is_tracked("a"));
        assert!(session.is_tracked("bus4"));
        assert!(!session.is_tracked("b"));
    }

    #[test]
    fn test_zero_bearing_renders_dot() {
        let mut session = make_session();
        let mut record = raw("a", "trip-14", 59.33, 18.07);
        record.bearing = Some(0.0);

        session.apply_snapshot(&[record], Instant::now());

        let surface = session.surface();
        let (_, icon) = surface.markers.values().next().unwrap();
        assert!(matches!(icon, MarkerIcon::RailDot { .. }));
    }

    #[test]
    fn test_movement_establishes_arrow_with_appear_cue() {
        let mut session = make_session();
        let now = Instant::now();

        session.apply_snapshot(&[raw("a", "trip-14", 59.330, 18.070)], now);
        session.apply_snapshot(
            &[raw("a", "trip-14", 59.331, 18.073)],
            now + Duration::from_secs(3),
        );

        let surface = session.surface();
        let (_, icon) = surface.markers.values().next().unwrap();
        let MarkerIcon::RailArrow {
            bearing_deg,
            appear,
            ..
        } = icon
        else {
            panic!("expected arrow, got {:?}", icon);
        };
        assert!(*appear);
        assert!((20.0..70.0).contains(bearing_deg));

        // The cue is one-shot: the next establishing tick clears it.
        session.apply_snapshot(
            &[raw("a", "trip-14", 59.332, 18.076)],
            now + Duration::from_secs(6),
        );
        let surface = session.surface();
        let (_, icon) = surface.markers.values().next().unwrap();
        assert!(matches!(
            icon,
            MarkerIcon::RailArrow { appear: false, .. }
        ));
    }

    #[test]
    fn test_bus_marker_is_always_arrow() {
        let mut session = make_session();
        session.apply_snapshot(&[raw("bus", "trip-bus-4", 59.33, 18.07)], Instant::now());

        let surface = session.surface();
        let (_, icon) = surface.markers.values().next().unwrap();
        assert!(matches!(icon, MarkerIcon::Bus { bearing_deg: None }));
    }

    #[test]
    fn test_update_animates_towards_new_position() {
        let mut session = make_session();
        let now = Instant::now();

        session.apply_snapshot(&[raw("a", "trip-14", 59.330, 18.070)], now);
        session.apply_snapshot(
            &[raw("a", "trip-14", 59.340, 18.080)],
            now + Duration::from_secs(3),
        );
        assert!(session.has_active_animations());

        // Long after the clamp maximum the marker has arrived.
        let done = session.advance_animations(now + Duration::from_secs(10));
        assert!(!done);
        let surface = session.surface();
        let (position, _) = surface.markers.values().next().unwrap();
        assert_eq!(*position, crate::coord::LatLon::new(59.340, 18.080));
    }

    #[test]
    fn test_eviction_clears_labels() {
        let mut session = make_session();
        let now = Instant::now();

        session.apply_snapshot(&[raw("a", "trip-14", 59.33, 18.07)], now);
        session.handle_label_event(LabelEvent::Click("a".to_string()));
        assert_eq!(session.labels().pinned_vehicle(), Some("a"));

        session.apply_snapshot(&[], now + Duration::from_secs(3));
        assert_eq!(session.labels().pinned_vehicle(), None);
        assert_eq!(session.surface().marker_count(), 0);
    }

    #[test]
    fn test_label_events_for_unknown_vehicle_are_ignored() {
        let mut session = make_session();
        session.handle_label_event(LabelEvent::PointerEnter("ghost".to_string()));
        session.handle_label_event(LabelEvent::Click("ghost".to_string()));
        assert_eq!(session.surface().marker_count(), 0);
    }

    #[test]
    fn test_selection_is_persisted_after_every_mutation() {
        use crate::selection::StoreError;
        use std::sync::Mutex;

        struct SharedStore(Arc<Mutex<Option<Vec<String>>>>);

        impl SelectionStore for SharedStore {
            fn load(&self) -> Result<Option<Vec<String>>, StoreError> {
                Ok(self.0.lock().unwrap().clone())
            }

            fn save(&mut self, tokens: &[String]) -> Result<(), StoreError> {
                *self.0.lock().unwrap() = Some(tokens.to_vec());
                Ok(())
            }
        }

        let stored = Arc::new(Mutex::new(None));
        let mut session = LiveSession::new(
            RecordingSurface::new(),
            Box::new(lookup()),
            Box::new(SharedStore(Arc::clone(&stored))),
            AppConfig::new("https://example.test/vehicles"),
        );

        session.apply_selection(SelectionCommand::ToggleLine("14".to_string()));
        session.apply_selection(SelectionCommand::ToggleBus);

        let tokens = stored.lock().unwrap().clone().unwrap();
        assert!(tokens.contains(&"14".to_string()));
        assert!(tokens.contains(&"__BUS__".to_string()));
    }

    #[test]
    fn test_selection_loaded_at_startup() {
        let store = MemoryStore::with_tokens(vec!["14".to_string()]);
        let session = make_session_with_store(store);
        assert!(session.selection().line_selected("14"));
        assert!(!session.selection().line_selected("17"));
    }

    #[test]
    fn test_known_lines_accumulate() {
        let mut session = make_session();
        session.apply_selection(SelectionCommand::ToggleLine("14".to_string()));

        // Filtered-out vehicles still register their line.
        session.apply_snapshot(&[raw("b", "trip-17", 59.34, 18.08)], Instant::now());
        assert!(session.known_lines().contains("17"));
        assert_eq!(session.tracked_count(), 0);
    }

    #[test]
    fn test_metrics_track_reconciliation() {
        let mut session = make_session();
        let now = Instant::now();

        session.apply_snapshot(&[raw("a", "trip-14", 59.33, 18.07)], now);
        session.apply_snapshot(&[], now + Duration::from_secs(3));

        let snapshot = session.metrics().snapshot();
        assert_eq!(snapshot.ticks_applied, 2);
        assert_eq!(snapshot.vehicles_upserted, 1);
        assert_eq!(snapshot.vehicles_evicted, 1);
        assert_eq!(snapshot.vehicles_tracked, 0);
    }
}
