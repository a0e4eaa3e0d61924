use model::{geography::ClosedRing, location::GeoPoint};

/// Builds the persisted geography from the captured vertices: longitude
/// first pairs, with the first pair repeated at the end. The vertex count is
/// not checked here, callers validate before saving.
pub fn encode(vertices: &[GeoPoint]) -> ClosedRing {
    let mut ring = vertices
        .iter()
        .map(|point| [point.longitude, point.latitude])
        .collect::<Vec<_>>();
    if let Some(first) = ring.first().copied() {
        ring.push(first);
    }
    ClosedRing::polygon(ring)
}

#[cfg(test)]
mod tests {
    use model::geography::GeometryType;

    use super::*;

    fn points(coordinates: &[(f64, f64)]) -> Vec<GeoPoint> {
        coordinates
            .iter()
            .map(|&(latitude, longitude)| GeoPoint {
                latitude,
                longitude,
            })
            .collect()
    }

    #[test]
    fn closes_the_ring_in_lon_lat_order() {
        let vertices = points(&[
            (-24.497, -47.842),
            (-24.496, -47.842),
            (-24.496, -47.841),
        ]);
        let ring = encode(&vertices);
        assert_eq!(ring.geometry_type, GeometryType::Polygon);
        assert_eq!(ring.coordinates.len(), 1);
        assert_eq!(
            ring.ring(),
            &[
                [-47.842, -24.497],
                [-47.842, -24.496],
                [-47.841, -24.496],
                [-47.842, -24.497],
            ]
        );
        assert!(ring.is_closed());
    }

    #[test]
    fn ring_has_one_more_pair_than_vertices() {
        for count in 1..6 {
            let vertices = (0..count)
                .map(|i| GeoPoint {
                    latitude: i as f64 * 0.001,
                    longitude: (i * i) as f64 * 0.001,
                })
                .collect::<Vec<_>>();
            let ring = encode(&vertices);
            assert_eq!(ring.ring().len(), count + 1);
            assert_eq!(ring.ring().first(), ring.ring().last());
        }
    }

    #[test]
    fn round_trips_through_points() {
        let vertices = points(&[(1.0, 2.0), (3.0, 4.0), (5.0, 7.0)]);
        assert_eq!(encode(&vertices).points(), vertices);
    }

    #[test]
    fn empty_input_gives_empty_ring() {
        assert!(encode(&[]).ring().is_empty());
    }
}
