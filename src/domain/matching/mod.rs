//! Proximity matching - ranks sold homes by great-circle distance to a client

mod distance;
mod matcher;

pub use distance::{geodesic_miles, EARTH_RADIUS_MILES};
pub use matcher::{
    nearest, ProximityMatcher, RankedMatch, DEFAULT_MIN_DISTANCE_MILES, DEFAULT_NUM_NEARBY,
};
