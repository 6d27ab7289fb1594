//! Reward points provider - value of an attraction for a traveler

use crate::domain::error::{Provider, Result, TourGuideError};
use crate::domain::types::{AttractionId, TravelerId};
use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::{FxHashSet, FxHasher};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub const MIN_POINTS: i32 = 1;
pub const MAX_POINTS: i32 = 1000;

#[async_trait]
pub trait RewardPointsProvider: Send + Sync {
    /// Deterministic lookup; may block on I/O
    async fn points(&self, attraction_id: AttractionId, traveler_id: TravelerId) -> Result<i32>;
}

/// Stable points in `MIN_POINTS..=MAX_POINTS` derived from the id pair
#[derive(Debug, Clone, Default)]
pub struct SimulatedRewardPoints {
    latency: Duration,
}

impl SimulatedRewardPoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

/// Hash the id pair into the points range
pub fn derive_points(attraction_id: AttractionId, traveler_id: TravelerId) -> i32 {
    let mut hasher = FxHasher::default();
    attraction_id.hash(&mut hasher);
    traveler_id.hash(&mut hasher);
    let span = (MAX_POINTS - MIN_POINTS + 1) as u64;
    MIN_POINTS + (hasher.finish() % span) as i32
}

#[async_trait]
impl RewardPointsProvider for SimulatedRewardPoints {
    async fn points(&self, attraction_id: AttractionId, traveler_id: TravelerId) -> Result<i32> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(derive_points(attraction_id, traveler_id))
    }
}

/// Same value for every pair, with per-traveler failure injection
#[derive(Debug, Default)]
pub struct FixedRewardPoints {
    points: i32,
    failing: Mutex<FxHashSet<TravelerId>>,
    calls: AtomicU64,
}

impl FixedRewardPoints {
    pub fn new(points: i32) -> Self {
        Self { points, failing: Mutex::new(FxHashSet::default()), calls: AtomicU64::new(0) }
    }

    /// Every lookup for this traveler fails until `recover` is called
    pub fn fail_for(&self, traveler_id: TravelerId) {
        self.failing.lock().insert(traveler_id);
    }

    pub fn recover(&self, traveler_id: TravelerId) {
        self.failing.lock().remove(&traveler_id);
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RewardPointsProvider for FixedRewardPoints {
    async fn points(&self, _attraction_id: AttractionId, traveler_id: TravelerId) -> Result<i32> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if self.failing.lock().contains(&traveler_id) {
            return Err(TourGuideError::provider(
                Provider::RewardPoints,
                traveler_id,
                "points service unavailable",
            ));
        }
        Ok(self.points)
    }
}
