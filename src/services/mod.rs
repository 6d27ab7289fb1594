//! Services - business logic and traveler state orchestration
//!
//! This module contains the core business logic services:
//! - `rewards` - Proximity reward computation, single and bulk
//! - `nearby` - Bounded top-5 nearest attraction selection
//! - `tour_guide` - Traveler lookup, tracking and query operations
//! - `tracker` - Background location polling loop
//! - `worker_pool` - Bounded-parallelism fan-out

pub mod nearby;
pub mod rewards;
pub mod tour_guide;
pub mod tracker;
pub mod worker_pool;

// Re-export commonly used types
pub use rewards::{BulkRewardsReport, RewardsEngine};
pub use tour_guide::TourGuide;
pub use tracker::{LocationTracker, TrackerHandle, TrackerState};
pub use worker_pool::{pool_size, WorkerPool};
