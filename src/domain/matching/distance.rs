use crate::domain::address::Coordinate;

/// Mean Earth radius in statute miles
pub const EARTH_RADIUS_MILES: f64 = 3958.7613;

/// Great-circle distance between two points in miles (haversine)
pub fn geodesic_miles(from: Coordinate, to: Coordinate) -> f64 {
    let dlat = (to.lat - from.lat).to_radians();
    let dlon = (to.lon - from.lon).to_radians();
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_MILES * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let point = Coordinate::new(35.3733, -119.0187);
        assert_eq!(geodesic_miles(point, point), 0.0);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let distance = geodesic_miles(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 0.0));
        assert!((distance - 69.093).abs() < 0.01, "got {distance}");
    }

    #[test]
    fn test_accounts_for_curvature() {
        // A degree of longitude shrinks away from the equator
        let at_equator = geodesic_miles(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0));
        let at_bakersfield =
            geodesic_miles(Coordinate::new(35.37, 0.0), Coordinate::new(35.37, 1.0));
        assert!(at_bakersfield < at_equator * 0.85);
    }

    #[test]
    fn test_symmetric() {
        let a = Coordinate::new(35.3733, -119.0187);
        let b = Coordinate::new(35.4001, -119.1102);
        assert!((geodesic_miles(a, b) - geodesic_miles(b, a)).abs() < 1e-12);
    }
}
