//! Shared types for the tour guide core

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::TourGuideError;

/// Newtype wrapper for traveler IDs to provide type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct TravelerId(pub Uuid);

impl TravelerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TravelerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TravelerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Newtype wrapper for attraction IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct AttractionId(pub Uuid);

impl AttractionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AttractionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AttractionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A point on the globe in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[inline]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Reject NaN/infinite values and out-of-range degrees
    pub fn validate(&self) -> Result<(), TourGuideError> {
        let lat_ok = self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude);
        let lon_ok = self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude);
        if lat_ok && lon_ok {
            Ok(())
        } else {
            Err(TourGuideError::Configuration(format!(
                "malformed coordinate lat={} lon={}",
                self.latitude, self.longitude
            )))
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}/{:.6}", self.latitude, self.longitude)
    }
}

/// A known point of interest, supplied by the attraction catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    pub id: AttractionId,
    /// Reward dedup key
    pub name: String,
    pub city: String,
    pub state: String,
    pub location: Coordinate,
}

impl Attraction {
    pub fn new(name: &str, city: &str, state: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            id: AttractionId::new(),
            name: name.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            location: Coordinate::new(latitude, longitude),
        }
    }
}

/// A position observed for a traveler at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitedLocation {
    pub traveler_id: TravelerId,
    pub location: Coordinate,
    pub timestamp: DateTime<Utc>,
}

impl VisitedLocation {
    pub fn new(traveler_id: TravelerId, location: Coordinate, timestamp: DateTime<Utc>) -> Self {
        Self { traveler_id, location, timestamp }
    }
}

/// Points earned by a traveler for being near an attraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub visited_location: VisitedLocation,
    pub attraction: Attraction,
    pub points: i32,
}

/// One entry of the nearest-attractions answer
///
/// `reward_points` is what the traveler would earn at this attraction; it
/// does not mean the reward has been granted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyAttraction {
    pub attraction_name: String,
    pub attraction_location: Coordinate,
    pub traveler_location: Coordinate,
    pub distance_miles: f64,
    pub reward_points: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_validate() {
        assert!(Coordinate::new(33.8, -117.9).validate().is_ok());
        assert!(Coordinate::new(90.0, 180.0).validate().is_ok());
        assert!(Coordinate::new(90.1, 0.0).validate().is_err());
        assert!(Coordinate::new(0.0, -180.5).validate().is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn test_nearby_attraction_json_shape() {
        let entry = NearbyAttraction {
            attraction_name: "Disneyland".to_string(),
            attraction_location: Coordinate::new(33.817595, -117.922008),
            traveler_location: Coordinate::new(33.8, -117.9),
            distance_miles: 1.7,
            reward_points: 42,
        };
        let json: serde_json::Value = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["attraction_name"], "Disneyland");
        assert_eq!(json["reward_points"], 42);
        assert_eq!(json["traveler_location"]["latitude"], 33.8);
    }
}
