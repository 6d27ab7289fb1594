//! Proximity-based reward computation
//!
//! A traveler earns one reward per attraction (keyed by attraction name) the
//! first time any of their visited locations lies within the proximity
//! buffer. The set of rewarded names is updated after every grant, so one
//! computation never emits two rewards for the same attraction.
//!
//! Rewards are staged and committed to the traveler only when the whole
//! computation succeeded; a provider failure leaves the traveler untouched.

use crate::domain::error::Result;
use crate::domain::geo::distance;
use crate::domain::traveler::{Traveler, TravelerState};
use crate::domain::types::{Attraction, Coordinate, Reward, TravelerId, VisitedLocation};
use crate::domain::TourGuideError;
use crate::infra::config::RewardsConfig;
use crate::infra::metrics::Metrics;
use crate::infra::retry::RetryPolicy;
use crate::io::catalog::AttractionCatalog;
use crate::io::points::RewardPointsProvider;
use crate::services::worker_pool::WorkerPool;
use rustc_hash::FxHashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of a bulk reward run
#[derive(Debug, Default)]
pub struct BulkRewardsReport {
    pub travelers: usize,
    pub rewards_granted: usize,
    pub failures: Vec<(TravelerId, TourGuideError)>,
}

impl BulkRewardsReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct RewardsEngine {
    catalog: Arc<dyn AttractionCatalog>,
    points: Arc<dyn RewardPointsProvider>,
    config: RewardsConfig,
    retry: RetryPolicy,
    pool: Arc<WorkerPool>,
    metrics: Arc<Metrics>,
}

impl RewardsEngine {
    /// Build an engine; the distance thresholds are validated here
    pub fn new(
        catalog: Arc<dyn AttractionCatalog>,
        points: Arc<dyn RewardPointsProvider>,
        config: RewardsConfig,
        pool: Arc<WorkerPool>,
        metrics: Arc<Metrics>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self { catalog, points, config, retry: RetryPolicy::default(), pool, metrics })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn config(&self) -> RewardsConfig {
        self.config
    }

    pub fn catalog(&self) -> &dyn AttractionCatalog {
        self.catalog.as_ref()
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Whether the attraction is within the visibility range of `location`
    ///
    /// Unrelated to reward eligibility.
    pub fn is_within_attraction_proximity(&self, attraction: &Attraction, location: Coordinate) -> bool {
        distance(attraction.location, location) <= self.config.visibility_range_miles
    }

    /// Whether a visit is close enough to earn the attraction's reward
    pub fn is_near_attraction(&self, visit: &VisitedLocation, attraction: &Attraction) -> bool {
        distance(attraction.location, visit.location) <= self.config.proximity_buffer_miles
    }

    /// Points the traveler would get for this attraction
    pub async fn get_reward_points(&self, attraction: &Attraction, traveler_id: TravelerId) -> Result<i32> {
        let points = self.points.as_ref();
        let attraction_id = attraction.id;
        self.metrics.record_points_lookup();
        self.retry
            .run("reward_points", &self.metrics, move || points.points(attraction_id, traveler_id))
            .await
    }

    /// Rewards the traveler would newly earn from their history plus an
    /// optional not-yet-committed visit. Nothing is mutated.
    pub async fn pending_rewards(
        &self,
        traveler_id: TravelerId,
        state: &TravelerState,
        new_visit: Option<&VisitedLocation>,
    ) -> Result<Vec<Reward>> {
        let attractions = self.catalog.list_attractions();
        let mut rewarded: FxHashSet<&str> = state.rewarded_names();
        let mut pending = Vec::new();

        for visit in state.visited_locations().iter().chain(new_visit) {
            for attraction in attractions.iter() {
                if rewarded.contains(attraction.name.as_str()) || !self.is_near_attraction(visit, attraction) {
                    continue;
                }
                let points = self.get_reward_points(attraction, traveler_id).await?;
                rewarded.insert(attraction.name.as_str());
                pending.push(Reward {
                    visited_location: visit.clone(),
                    attraction: attraction.clone(),
                    points,
                });
            }
        }

        Ok(pending)
    }

    /// Recompute rewards for a traveler whose lock the caller already holds
    pub async fn calculate_rewards_locked(
        &self,
        traveler_id: TravelerId,
        state: &mut TravelerState,
    ) -> Result<usize> {
        let pending = self.pending_rewards(traveler_id, state, None).await?;
        let added = state.commit(None, pending);
        self.metrics.record_rewards_granted(added);
        if added > 0 {
            debug!(traveler_id = %traveler_id, added = %added, "rewards_granted");
        }
        Ok(added)
    }

    /// Grant every reward the traveler's history qualifies for
    ///
    /// Returns the number of rewards added.
    pub async fn calculate_rewards(&self, traveler: &Traveler) -> Result<usize> {
        let mut state = traveler.lock().await;
        self.calculate_rewards_locked(traveler.id(), &mut state).await
    }

    /// Fan `calculate_rewards` out over the worker pool and wait for all
    ///
    /// A failing traveler is reported and does not affect the others.
    pub async fn calculate_multiple_user_rewards(
        self: &Arc<Self>,
        travelers: &[Arc<Traveler>],
    ) -> BulkRewardsReport {
        let start = Instant::now();
        let engine = self.clone();
        let outcomes = self
            .pool
            .join_all(travelers.to_vec(), move |traveler| {
                let engine = engine.clone();
                async move { engine.calculate_rewards(&traveler).await }
            })
            .await;

        let mut report = BulkRewardsReport { travelers: travelers.len(), ..Default::default() };
        for (traveler, outcome) in travelers.iter().zip(outcomes) {
            let traveler_id = traveler.id();
            match outcome.unwrap_or_else(|| Err(TourGuideError::WorkerCancelled(traveler_id))) {
                Ok(added) => report.rewards_granted += added,
                Err(e) => {
                    warn!(traveler_id = %traveler_id, error = %e, "rewards_traveler_failed");
                    report.failures.push((traveler_id, e));
                }
            }
        }

        self.metrics.record_bulk_run(report.failures.len());
        info!(
            travelers = %report.travelers,
            rewards_granted = %report.rewards_granted,
            failures = %report.failures.len(),
            elapsed_ms = %start.elapsed().as_millis(),
            "rewards_bulk_completed"
        );
        report
    }
}
