//! Domain models - core business types
//!
//! This module contains the canonical data types used throughout the system:
//! - `types` - Coordinates, attractions, visited locations, rewards
//! - `traveler` - Traveler identity plus lock-guarded history and rewards
//! - `geo` - Great-circle distance in statute miles
//! - `error` - Error taxonomy shared by every layer

pub mod error;
pub mod geo;
pub mod traveler;
pub mod types;

// Re-export commonly used types at module level
pub use error::{Provider, Result, TourGuideError};
pub use traveler::{Traveler, TravelerPreferences, TravelerState};
pub use types::{Attraction, AttractionId, Coordinate, NearbyAttraction, Reward, TravelerId, VisitedLocation};
