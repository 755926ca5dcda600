//! Line selection and visibility filtering.
//!
//! One [`SelectionState`] exists per session. It decides which vehicles are
//! admitted to the map and is persisted through a key-value store after
//! every mutation. All decision functions are pure: visibility depends only
//! on the current state and the vehicle's line and kind, never on call
//! history.

mod model;
mod store;

pub use model::{SelectionState, BUS_TOKEN, NONE_TOKEN};
pub use store::{JsonFileStore, MemoryStore, SelectionStore, StoreError, STORAGE_KEY};

pub(crate) use store::{load_or_default, save_or_log};
