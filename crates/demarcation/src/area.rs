//! Area and perimeter of a demarcated polygon.
//!
//! The area works directly on decimal degrees and scales the result by a
//! fixed factor. There is no latitude dependent correction of the longitude
//! axis, so the value is an approximation that only holds for small
//! paddocks. Records that were already persisted were computed the same way.

use itertools::Itertools;
use model::location::GeoPoint;

/// Converts square degrees into the square meters reported to the api.
pub const DEGREES_SQUARED_TO_M2: f64 = 1_000_000.0;

/// Signed shoelace area in square degrees. The ring is closed implicitly,
/// so the first vertex must not be repeated at the end.
pub fn signed_area_degrees(vertices: &[GeoPoint]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let sum: f64 = vertices
        .iter()
        .circular_tuple_windows::<(&GeoPoint, &GeoPoint)>()
        .map(|(a, b)| a.longitude * b.latitude - b.longitude * a.latitude)
        .sum();
    0.5 * sum
}

/// Area of the polygon, `0` for anything with fewer than three vertices.
pub fn compute_area_m2(vertices: &[GeoPoint]) -> f64 {
    signed_area_degrees(vertices).abs() * DEGREES_SQUARED_TO_M2
}

/// Length of the closed ring in meters.
pub fn perimeter_m(vertices: &[GeoPoint]) -> f64 {
    if vertices.len() < 2 {
        return 0.0;
    }
    vertices
        .iter()
        .circular_tuple_windows::<(&GeoPoint, &GeoPoint)>()
        .map(|(a, b)| a.haversine_distance_m(b))
        .sum()
}
