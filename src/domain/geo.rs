//! Great-circle distance in statute miles (spherical law of cosines)

use crate::domain::types::Coordinate;

pub const STATUTE_MILES_PER_NAUTICAL_MILE: f64 = 1.15077945;

/// Nautical miles per degree of arc
const NAUTICAL_MILES_PER_DEGREE: f64 = 60.0;

/// Distance between two coordinates in statute miles
///
/// Rounding can push the cosine-law term just outside `[-1, 1]` for
/// identical or antipodal points, so it is clamped before `acos`.
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    // sin² + cos² can land a ulp below 1 and leave a spurious residue
    if a == b {
        return 0.0;
    }

    let lat1 = a.latitude.to_radians();
    let lon1 = a.longitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let lon2 = b.longitude.to_radians();

    let cos_angle = lat1.sin() * lat2.sin() + lat1.cos() * lat2.cos() * (lon1 - lon2).cos();
    let angle = cos_angle.clamp(-1.0, 1.0).acos();

    let nautical_miles = NAUTICAL_MILES_PER_DEGREE * angle.to_degrees();
    STATUTE_MILES_PER_NAUTICAL_MILE * nautical_miles
}

/// Latitude offset (degrees) that lies `miles` due north along a meridian
///
/// Inverse of [`distance`] for points sharing a longitude; used to place
/// fixtures at an exact distance.
pub fn degrees_for_miles(miles: f64) -> f64 {
    miles / STATUTE_MILES_PER_NAUTICAL_MILE / NAUTICAL_MILES_PER_DEGREE
}
