//! ID types for crops and visual assets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a crop type in the catalog.
///
/// Opaque to the simulation; "no crop" is expressed as `Option::None`
/// rather than a sentinel value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CropId(u32);

impl CropId {
    /// Creates a crop ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CropId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "crop#{}", self.0)
    }
}

/// Well-known crop IDs.
pub mod crops {
    use super::CropId;

    /// Wheat, the built-in fallback crop.
    pub const WHEAT: CropId = CropId::new(1);
    /// Corn.
    pub const CORN: CropId = CropId::new(2);
    /// Carrot.
    pub const CARROT: CropId = CropId::new(3);
}

/// Opaque reference to a visual asset (prefab, sprite, mesh key).
///
/// The simulation only stores and forwards it; resolving it is the
/// presentation layer's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisualRef(String);

impl VisualRef {
    /// Creates a visual reference from an asset key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the asset key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks whether the reference points at nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for VisualRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
