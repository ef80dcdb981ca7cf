use super::geodesic_miles;
use crate::domain::address::Coordinate;

/// Distance under which a sold home is treated as the client's own property (~26 ft)
pub const DEFAULT_MIN_DISTANCE_MILES: f64 = 0.005;

pub const DEFAULT_NUM_NEARBY: usize = 3;

/// A candidate together with its coordinate and distance from the target
#[derive(Debug, Clone, PartialEq)]
pub struct RankedMatch<T> {
    pub item: T,
    pub coordinate: Coordinate,
    pub distance_miles: f64,
}

/// Rank candidates by distance to `target`
///
/// Candidates without a coordinate are dropped before scoring. Anything closer
/// than `min_distance_miles` is dropped as a duplicate of the target. The
/// result is sorted ascending by distance, equal distances keeping input
/// order, and holds at most `n` entries.
pub fn nearest<'a, T, I>(
    target: Coordinate,
    candidates: I,
    n: usize,
    min_distance_miles: f64,
) -> Vec<RankedMatch<&'a T>>
where
    T: 'a,
    I: IntoIterator<Item = (&'a T, Option<Coordinate>)>,
{
    let mut ranked: Vec<RankedMatch<&'a T>> = candidates
        .into_iter()
        .filter_map(|(item, coordinate)| {
            let coordinate = coordinate?;
            let distance_miles = geodesic_miles(target, coordinate);

            // NaN never passes this comparison
            (distance_miles >= min_distance_miles).then_some(RankedMatch {
                item,
                coordinate,
                distance_miles,
            })
        })
        .collect();

    // `sort_by` is stable
    ranked.sort_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles));
    ranked.truncate(n);
    ranked
}

/// `nearest` with the batch's configured cap and self-match threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityMatcher {
    num_nearby: usize,
    min_distance_miles: f64,
}

impl ProximityMatcher {
    pub fn new(num_nearby: usize, min_distance_miles: f64) -> Self {
        Self {
            num_nearby,
            min_distance_miles,
        }
    }

    pub fn num_nearby(&self) -> usize {
        self.num_nearby
    }

    pub fn min_distance_miles(&self) -> f64 {
        self.min_distance_miles
    }

    pub fn nearest<'a, T, I>(&self, target: Coordinate, candidates: I) -> Vec<RankedMatch<&'a T>>
    where
        T: 'a,
        I: IntoIterator<Item = (&'a T, Option<Coordinate>)>,
    {
        nearest(target, candidates, self.num_nearby, self.min_distance_miles)
    }
}

impl Default for ProximityMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_NUM_NEARBY, DEFAULT_MIN_DISTANCE_MILES)
    }
}
