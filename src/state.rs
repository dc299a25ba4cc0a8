//! Shared application state for request handlers.

use crate::zone::Zone;

/// Shared application state, cloned into every handler.
///
/// Holds only immutable data resolved at startup, so requests never coordinate.
#[derive(Clone, Debug)]
pub struct AppState {
    pub zone: Zone,
}

impl AppState {
    /// Creates a new application state reporting the given zone.
    pub fn new(zone: Zone) -> Self {
        Self { zone }
    }
}
