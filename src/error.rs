//! Error types for track seeding.

use crate::types::LayerId;
use std::fmt;
use thiserror::Error;

/// Per-event input that the seeder requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventInput {
    Geometry,
    Clusters,
    Vertex,
}

impl fmt::Display for EventInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventInput::Geometry => write!(f, "layer geometry"),
            EventInput::Clusters => write!(f, "cluster container"),
            EventInput::Vertex => write!(f, "vertex estimate"),
        }
    }
}

/// Errors raised while assembling the layer geometry table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Two sources report different radii for the same layer.
    #[error("conflicting radius for layer {layer}: {existing} vs {incoming}")]
    ConflictingRadius {
        layer: LayerId,
        existing: f64,
        incoming: f64,
    },

    /// A radius that is not finite and positive.
    #[error("invalid radius {radius} for layer {layer}")]
    InvalidRadius { layer: LayerId, radius: f64 },
}

/// Errors that abort seeding of an event.
///
/// Rejected chains are not errors; they only lower the track count.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeedingError {
    /// A required per-event input is absent; the event is aborted and nothing is emitted.
    #[error("event aborted: missing {0}")]
    MissingInput(EventInput),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = SeedingError::MissingInput(EventInput::Vertex);
        assert_eq!(err.to_string(), "event aborted: missing vertex estimate");

        let err: SeedingError = GeometryError::ConflictingRadius {
            layer: 40,
            existing: 31.0,
            incoming: 32.5,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "conflicting radius for layer 40: 31 vs 32.5"
        );
    }
}
