use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::location::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum GeometryType {
    Polygon,
}

/// A GeoJSON polygon with a single, explicitly closed ring. Coordinate
/// pairs are longitude first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClosedRing {
    #[serde(rename = "type")]
    pub geometry_type: GeometryType,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

impl ClosedRing {
    pub fn polygon(ring: Vec<[f64; 2]>) -> Self {
        Self {
            geometry_type: GeometryType::Polygon,
            coordinates: vec![ring],
        }
    }

    /// The outer (and only) ring.
    pub fn ring(&self) -> &[[f64; 2]] {
        self.coordinates.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_closed(&self) -> bool {
        let ring = self.ring();
        match (ring.first(), ring.last()) {
            (Some(first), Some(last)) => first == last,
            _ => false,
        }
    }

    /// Converts the ring back into points, without the closing pair.
    pub fn points(&self) -> Vec<GeoPoint> {
        let ring = self.ring();
        let open = if self.is_closed() {
            &ring[..ring.len() - 1]
        } else {
            ring
        };
        open.iter()
            .map(|[longitude, latitude]| GeoPoint {
                latitude: *latitude,
                longitude: *longitude,
            })
            .collect()
    }
}
