pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const MAX_LATITUDE: f64 = 90.0;
pub const MAX_LONGITUDE: f64 = 180.0;

fn to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

/// Returns true if the coordinate is finite and inside the WGS84 ranges.
pub fn is_valid_coordinate(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && latitude.abs() <= MAX_LATITUDE
        && longitude.abs() <= MAX_LONGITUDE
}

/// Straight line distance in decimal degree space. Only meaningful for
/// points that are close to each other, e.g. to detect a device that did
/// not move between two captures.
pub fn planar_distance_degrees(
    latitude_1: f64,
    longitude_1: f64,
    latitude_2: f64,
    longitude_2: f64,
) -> f64 {
    let dlat = latitude_2 - latitude_1;
    let dlon = longitude_2 - longitude_1;
    (dlat * dlat + dlon * dlon).sqrt()
}

pub fn haversine_distance(
    latitude_1: f64,
    longitude_1: f64,
    latitude_2: f64,
    longitude_2: f64,
) -> f64 {
    let lat1_rad = to_radians(latitude_1);
    let lon1_rad = to_radians(longitude_1);
    let lat2_rad = to_radians(latitude_2);
    let lon2_rad = to_radians(longitude_2);

    let dlat = lat2_rad - lat1_rad;
    let dlon = lon2_rad - lon1_rad;

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_ranges() {
        assert!(is_valid_coordinate(-24.497, -47.842));
        assert!(is_valid_coordinate(90.0, -180.0));
        assert!(!is_valid_coordinate(90.5, 0.0));
        assert!(!is_valid_coordinate(0.0, 180.1));
        assert!(!is_valid_coordinate(f64::NAN, 0.0));
        assert!(!is_valid_coordinate(0.0, f64::INFINITY));
    }

    #[test]
    fn planar_distance_is_euclidean() {
        let distance = planar_distance_degrees(0.0, 0.0, 3.0, 4.0);
        assert!((distance - 5.0).abs() < 1e-12);
        assert_eq!(planar_distance_degrees(1.5, 2.5, 1.5, 2.5), 0.0);
    }

    #[test]
    fn haversine_one_degree_of_latitude() {
        // one degree along a meridian is roughly 111.19 km
        let distance = haversine_distance(0.0, 0.0, 1.0, 0.0);
        assert!((distance - 111.19).abs() < 0.01);
    }
}
