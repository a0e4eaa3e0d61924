use std::{error::Error, fmt};

use model::location::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DuplicatePointError {
    pub distance_degrees: f64,
    pub threshold_degrees: f64,
}

impl fmt::Display for DuplicatePointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "point is only {:.7}° away from the last captured point (minimum is {:.7}°)",
            self.distance_degrees, self.threshold_degrees
        )
    }
}

impl Error for DuplicatePointError {}

/// The ordered vertices of the paddock that is being walked. Consecutive
/// vertices are always at least `min_movement_degrees` apart.
#[derive(Debug, Clone)]
pub struct PolygonBuilder {
    vertices: Vec<GeoPoint>,
    min_movement_degrees: f64,
}

impl PolygonBuilder {
    pub fn new(min_movement_degrees: f64) -> Self {
        Self {
            vertices: Vec::new(),
            min_movement_degrees: min_movement_degrees.max(0.0),
        }
    }

    pub fn add_point(&mut self, point: GeoPoint) -> Result<(), DuplicatePointError> {
        if let Some(last) = self.vertices.last() {
            let distance = last.planar_distance_to(&point);
            if distance < self.min_movement_degrees {
                return Err(DuplicatePointError {
                    distance_degrees: distance,
                    threshold_degrees: self.min_movement_degrees,
                });
            }
        }
        self.vertices.push(point);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    pub fn vertices(&self) -> &[GeoPoint] {
        &self.vertices
    }

    pub fn count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn min_movement_degrees(&self) -> f64 {
        self.min_movement_degrees
    }
}
