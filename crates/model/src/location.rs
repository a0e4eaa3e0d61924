use std::{error::Error, fmt};

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::geo;

use crate::ExampleData;

/// A single WGS84 coordinate as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        let point = Self {
            latitude,
            longitude,
        };
        point.validate()
    }

    /// Checks the ranges of a point that was not built through `new`,
    /// e.g. one that was deserialized from a request body.
    pub fn validate(self) -> Result<Self, CoordinateError> {
        if geo::is_valid_coordinate(self.latitude, self.longitude) {
            Ok(self)
        } else {
            Err(CoordinateError {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }

    /// Distance in decimal degrees, without geodesic correction.
    pub fn planar_distance_to(&self, other: &GeoPoint) -> f64 {
        geo::planar_distance_degrees(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }

    pub fn haversine_distance_m(&self, other: &GeoPoint) -> f64 {
        geo::haversine_distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        ) * 1000.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateError {
    pub latitude: f64,
    pub longitude: f64,
}

impl fmt::Display for CoordinateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "coordinate ({}, {}) is outside of the valid latitude/longitude range",
            self.latitude, self.longitude
        )
    }
}

impl Error for CoordinateError {}

/// What the location provider currently knows about the device position.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationState {
    pub fix: Option<GeoPoint>,
    #[serde(default)]
    pub acquiring: bool,
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl LocationState {
    pub fn is_usable(&self) -> bool {
        self.fix.is_some() && !self.acquiring
    }
}

impl ExampleData for LocationState {
    fn example_data() -> Self {
        Self {
            fix: Some(GeoPoint {
                latitude: -24.497,
                longitude: -47.842,
            }),
            acquiring: false,
            error: None,
            updated_at: None,
        }
    }
}
