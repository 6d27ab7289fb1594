//! IO modules - external collaborator interfaces
//!
//! This module contains the contracts the core consumes and their stand-in
//! implementations:
//! - `catalog` - Attraction catalog (built-in list or config-provided)
//! - `location` - Location provider (simulated GPS, scripted replay)
//! - `points` - Reward points provider (simulated, fixed)
//! - `user_store` - In-memory traveler store and internal seeding

pub mod catalog;
pub mod location;
pub mod points;
pub mod user_store;

// Re-export commonly used types
pub use catalog::{AttractionCatalog, StaticCatalog};
pub use location::{LocationProvider, ScriptedLocationProvider, SimulatedLocationProvider};
pub use points::{FixedRewardPoints, RewardPointsProvider, SimulatedRewardPoints};
pub use user_store::{seed_travelers, InMemoryUserStore, UserStore};
