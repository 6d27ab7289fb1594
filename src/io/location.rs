//! Location provider - current position of a traveler
//!
//! `SimulatedLocationProvider` stands in for the external GPS service;
//! `ScriptedLocationProvider` replays fixed positions and injected failures.

use crate::domain::error::{Provider, Result, TourGuideError};
use crate::domain::types::{Coordinate, TravelerId, VisitedLocation};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rand::Rng;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::time::Duration;

/// Web-Mercator latitude limit used for generated positions
pub const MAX_LATITUDE: f64 = 85.05112878;

#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Fetch the traveler's current position; may block on I/O
    async fn current_location(&self, traveler_id: TravelerId) -> Result<VisitedLocation>;
}

/// Random positions anywhere on the map, stamped with the current time
#[derive(Debug, Clone, Default)]
pub struct SimulatedLocationProvider {
    latency: Duration,
}

impl SimulatedLocationProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an artificial delay to every call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

/// Uniform random coordinate within the generated-position bounds
pub fn random_coordinate<R: Rng + ?Sized>(rng: &mut R) -> Coordinate {
    Coordinate::new(
        rng.gen_range(-MAX_LATITUDE..=MAX_LATITUDE),
        rng.gen_range(-180.0..=180.0),
    )
}

#[async_trait]
impl LocationProvider for SimulatedLocationProvider {
    async fn current_location(&self, traveler_id: TravelerId) -> Result<VisitedLocation> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let location = random_coordinate(&mut rand::thread_rng());
        Ok(VisitedLocation::new(traveler_id, location, Utc::now()))
    }
}

#[derive(Debug, Default)]
struct Script {
    queued: FxHashMap<TravelerId, VecDeque<Coordinate>>,
    failures: FxHashMap<TravelerId, u32>,
    calls: FxHashMap<TravelerId, u32>,
}

/// Deterministic provider: per-traveler queues with a fixed fallback
///
/// Once a traveler's queue is drained the fallback position is returned.
/// Failures can be injected per traveler; each injected failure consumes
/// one call.
#[derive(Debug)]
pub struct ScriptedLocationProvider {
    fallback: Coordinate,
    latency: Duration,
    script: Mutex<Script>,
}

impl ScriptedLocationProvider {
    pub fn new(fallback: Coordinate) -> Self {
        Self { fallback, latency: Duration::ZERO, script: Mutex::new(Script::default()) }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn push(&self, traveler_id: TravelerId, location: Coordinate) {
        self.script.lock().queued.entry(traveler_id).or_default().push_back(location);
    }

    /// Make the next `count` calls for this traveler fail
    pub fn fail_next(&self, traveler_id: TravelerId, count: u32) {
        *self.script.lock().failures.entry(traveler_id).or_default() += count;
    }

    /// Number of calls made for a traveler, failed ones included
    pub fn calls(&self, traveler_id: TravelerId) -> u32 {
        self.script.lock().calls.get(&traveler_id).copied().unwrap_or(0)
    }
}

#[async_trait]
impl LocationProvider for ScriptedLocationProvider {
    async fn current_location(&self, traveler_id: TravelerId) -> Result<VisitedLocation> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let mut script = self.script.lock();
        *script.calls.entry(traveler_id).or_default() += 1;

        if let Some(remaining) = script.failures.get_mut(&traveler_id) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(TourGuideError::provider(
                    Provider::Location,
                    traveler_id,
                    "scripted failure",
                ));
            }
        }

        let location = script
            .queued
            .get_mut(&traveler_id)
            .and_then(|q| q.pop_front())
            .unwrap_or(self.fallback);
        Ok(VisitedLocation::new(traveler_id, location, Utc::now()))
    }
}
