//! The zone value this instance reports.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// A validated, immutable zone identifier.
///
/// Cloning is cheap; all request handlers share the same allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone(Arc<str>);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ZoneError {
    #[error("zone must not be empty")]
    Empty,
    #[error("zone looks like an unresolved placeholder: {0}")]
    UnresolvedPlaceholder(String),
}

impl Zone {
    /// Validate and wrap a zone value. The value is kept verbatim.
    pub fn new(value: impl Into<String>) -> Result<Self, ZoneError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ZoneError::Empty);
        }
        if is_placeholder(&value) {
            return Err(ZoneError::UnresolvedPlaceholder(value));
        }
        Ok(Self(Arc::from(value)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `${...}` left behind by a config source that failed to interpolate.
fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.starts_with("${") && value.ends_with('}')
}

/// Body of `GET /zone`.
#[derive(Debug, Serialize)]
pub struct ZoneResponse<'a> {
    pub zone: &'a str,
}

impl<'a> From<&'a Zone> for ZoneResponse<'a> {
    fn from(zone: &'a Zone) -> Self {
        Self {
            zone: zone.as_str(),
        }
    }
}
