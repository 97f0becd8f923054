//! Layer geometry: logical layer id to radius.
//!
//! Built once per event from up to three detector sources. Each source
//! contributes `(layer, radius, thickness)` records; the effective radius
//! depends on the sensor kind.

use crate::error::GeometryError;
use crate::types::LayerId;
use std::collections::BTreeMap;

/// Two records for the same layer must agree to within this distance.
pub const RADIUS_CONFLICT_TOLERANCE: f64 = 1e-6;

/// Sensor technology of a geometry source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// Monolithic pixel layers; the nominal radius is used as is.
    Pixel,
    /// Silicon strip ladders.
    Strip,
    /// Continuous-readout (drift) layers.
    ContinuousReadout,
}

impl SensorKind {
    /// Radius at which hits of this layer are assumed to sit.
    #[inline]
    pub fn effective_radius(self, radius: f64, thickness: f64) -> f64 {
        match self {
            SensorKind::Pixel => radius,
            SensorKind::Strip | SensorKind::ContinuousReadout => radius + 0.5 * thickness,
        }
    }
}

/// One layer as reported by a geometry source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerRecord {
    pub layer: LayerId,
    pub radius: f64,
    pub thickness: f64,
}

impl LayerRecord {
    pub const fn new(layer: LayerId, radius: f64, thickness: f64) -> Self {
        Self {
            layer,
            radius,
            thickness,
        }
    }
}

/// Resolved `layer -> radius` table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryTable {
    radii: BTreeMap<LayerId, f64>,
}

impl GeometryTable {
    pub fn builder() -> GeometryTableBuilder {
        GeometryTableBuilder::default()
    }

    /// Table from already-resolved radii.
    pub fn from_radii<I>(radii: I) -> Result<Self, GeometryError>
    where
        I: IntoIterator<Item = (LayerId, f64)>,
    {
        let mut table = Self::default();
        for (layer, radius) in radii {
            table.insert(layer, radius)?;
        }
        Ok(table)
    }

    fn insert(&mut self, layer: LayerId, radius: f64) -> Result<(), GeometryError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(GeometryError::InvalidRadius { layer, radius });
        }
        match self.radii.get(&layer) {
            Some(&existing) if (existing - radius).abs() > RADIUS_CONFLICT_TOLERANCE => {
                Err(GeometryError::ConflictingRadius {
                    layer,
                    existing,
                    incoming: radius,
                })
            }
            Some(_) => Ok(()),
            None => {
                self.radii.insert(layer, radius);
                Ok(())
            }
        }
    }

    /// Radius of `layer`, or `None` for an unconfigured layer.
    #[inline]
    pub fn radius(&self, layer: LayerId) -> Option<f64> {
        self.radii.get(&layer).copied()
    }

    #[inline]
    pub fn contains(&self, layer: LayerId) -> bool {
        self.radii.contains_key(&layer)
    }

    pub fn len(&self) -> usize {
        self.radii.len()
    }

    pub fn is_empty(&self) -> bool {
        self.radii.is_empty()
    }

    /// `(layer, radius)` pairs in layer-id order.
    pub fn iter(&self) -> impl Iterator<Item = (LayerId, f64)> + '_ {
        self.radii.iter().map(|(&l, &r)| (l, r))
    }

    /// Layer ids ordered by increasing radius.
    pub fn layers_by_radius(&self) -> Vec<LayerId> {
        let mut layers: Vec<(LayerId, f64)> = self.iter().collect();
        layers.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        layers.into_iter().map(|(l, _)| l).collect()
    }
}

/// Collects geometry sources in order and resolves them into a [`GeometryTable`].
#[derive(Debug, Clone, Default)]
pub struct GeometryTableBuilder {
    sources: Vec<(SensorKind, Vec<LayerRecord>)>,
}

impl GeometryTableBuilder {
    pub fn with_source<I>(mut self, kind: SensorKind, layers: I) -> Self
    where
        I: IntoIterator<Item = LayerRecord>,
    {
        self.sources.push((kind, layers.into_iter().collect()));
        self
    }

    pub fn build(self) -> Result<GeometryTable, GeometryError> {
        let mut table = GeometryTable::default();
        for (kind, layers) in &self.sources {
            for rec in layers {
                table.insert(rec.layer, kind.effective_radius(rec.radius, rec.thickness))?;
            }
        }
        Ok(table)
    }
}
