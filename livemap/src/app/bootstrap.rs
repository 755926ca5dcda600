//! Session bootstrap.
//!
//! Wires the default collaborators together: the static trip table from
//! disk, the HTTP snapshot feed, and the file-backed selection store
//! (falling back to an in-memory store when no data directory exists). The
//! render surface is always supplied by the caller.

use std::path::Path;

use tracing::info;

use crate::feed::{HttpSnapshotFeed, StaticTripLookup};
use crate::selection::{JsonFileStore, MemoryStore, SelectionStore};
use crate::session::LiveSession;
use crate::surface::RenderSurface;

use super::{AppConfig, AppError};

/// Build a session and its snapshot feed from configuration.
pub fn build_session<S: RenderSurface>(
    surface: S,
    config: AppConfig,
    trip_table_path: impl AsRef<Path>,
) -> Result<(LiveSession<S>, HttpSnapshotFeed), AppError> {
    if config.endpoint.is_empty() {
        return Err(AppError::Config("snapshot endpoint is empty".to_string()));
    }

    let lookup = StaticTripLookup::from_file(trip_table_path.as_ref())?;
    info!(trips = lookup.len(), "Trip table loaded");

    let store: Box<dyn SelectionStore> = match JsonFileStore::default_location() {
        Some(store) => {
            info!(path = %store.path().display(), "Using persisted selection store");
            Box::new(store)
        }
        None => {
            info!("No data directory available, selection will not persist");
            Box::new(MemoryStore::new())
        }
    };

    let feed = HttpSnapshotFeed::new(&config.endpoint)?;
    let session = LiveSession::new(surface, Box::new(lookup), store, config);

    Ok((session, feed))
}
