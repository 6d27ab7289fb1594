//! Tour guide service - traveler lookup, tracking, rewards and nearby queries
//!
//! Every operation that touches a traveler's history runs under that
//! traveler's lock: read last location, fetch a new one, append it and
//! recompute rewards happen as one unit, whether driven by the background
//! tracker or by an on-demand call.

use crate::domain::error::{Result, TourGuideError};
use crate::domain::traveler::{Traveler, TravelerState};
use crate::domain::types::{NearbyAttraction, Reward, VisitedLocation};
use crate::infra::metrics::Metrics;
use crate::infra::retry::RetryPolicy;
use crate::io::location::LocationProvider;
use crate::io::user_store::UserStore;
use crate::services::nearby;
use crate::services::rewards::RewardsEngine;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub struct TourGuide {
    store: Arc<dyn UserStore>,
    locations: Arc<dyn LocationProvider>,
    rewards: Arc<RewardsEngine>,
    retry: RetryPolicy,
    metrics: Arc<Metrics>,
}

impl TourGuide {
    pub fn new(
        store: Arc<dyn UserStore>,
        locations: Arc<dyn LocationProvider>,
        rewards: Arc<RewardsEngine>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self { store, locations, rewards, retry: RetryPolicy::default(), metrics }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn rewards_engine(&self) -> &Arc<RewardsEngine> {
        &self.rewards
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Look a traveler up by name; no implicit creation
    pub fn get_traveler(&self, name: &str) -> Result<Arc<Traveler>> {
        self.store.get(name).ok_or_else(|| TourGuideError::UnknownTraveler(name.to_string()))
    }

    pub fn all_travelers(&self) -> Vec<Arc<Traveler>> {
        self.store.list_all()
    }

    /// Register a traveler; an existing one with the same name is kept
    pub fn add_traveler(&self, traveler: Traveler) -> Arc<Traveler> {
        self.store.add_if_absent(traveler)
    }

    /// Last known location, tracking a fresh one if the history is empty
    pub async fn get_location(&self, traveler: &Traveler) -> Result<VisitedLocation> {
        let mut state = traveler.lock().await;
        if let Some(last) = state.last_visited_location() {
            return Ok(last.clone());
        }
        self.track_locked(traveler, &mut state).await
    }

    /// Fetch, append and reward one new location for the traveler
    pub async fn track_location(&self, traveler: &Traveler) -> Result<VisitedLocation> {
        let mut state = traveler.lock().await;
        self.track_locked(traveler, &mut state).await
    }

    /// Tracking unit for a traveler whose lock the caller holds
    ///
    /// The new visit and any rewards it earns are committed together; if the
    /// location or points lookup fails nothing is changed.
    async fn track_locked(&self, traveler: &Traveler, state: &mut TravelerState) -> Result<VisitedLocation> {
        let traveler_id = traveler.id();
        let locations = self.locations.as_ref();
        let visit = self
            .retry
            .run("location", &self.metrics, move || locations.current_location(traveler_id))
            .await?;

        let pending = self.rewards.pending_rewards(traveler_id, state, Some(&visit)).await?;
        let added = state.commit(Some(visit.clone()), pending);

        self.metrics.record_location_tracked();
        self.metrics.record_rewards_granted(added);
        debug!(
            traveler = %traveler.name(),
            location = %visit.location,
            rewards_added = %added,
            "location_tracked"
        );
        Ok(visit)
    }

    /// Track every traveler over the worker pool and wait for all
    ///
    /// Results come back in input order; one traveler's failure does not
    /// affect the others.
    pub async fn track_many(self: &Arc<Self>, travelers: &[Arc<Traveler>]) -> Vec<Result<VisitedLocation>> {
        let start = Instant::now();
        let guide = self.clone();
        let results = self
            .rewards
            .pool()
            .join_all(travelers.to_vec(), move |traveler| {
                let guide = guide.clone();
                async move { guide.track_location(&traveler).await }
            })
            .await
            .into_iter()
            .zip(travelers)
            .map(|(outcome, traveler)| {
                outcome.unwrap_or_else(|| Err(TourGuideError::WorkerCancelled(traveler.id())))
            })
            .collect::<Vec<_>>();

        let failures = results.iter().filter(|r| r.is_err()).count();
        for _ in 0..failures {
            self.metrics.record_tracking_failure();
        }
        if failures > 0 {
            warn!(failures = %failures, "track_many_partial_failure");
        }
        info!(
            travelers = %travelers.len(),
            failures = %failures,
            elapsed_ms = %start.elapsed().as_millis(),
            "track_many_completed"
        );
        results
    }

    pub async fn rewards(&self, traveler: &Traveler) -> Vec<Reward> {
        traveler.lock().await.rewards().to_vec()
    }

    pub async fn total_reward_points(&self, traveler: &Traveler) -> i64 {
        traveler.lock().await.total_reward_points()
    }

    /// Five nearest attractions to the traveler's last known location
    ///
    /// Distance is not limited by the proximity buffer or visibility range.
    pub async fn top_five_nearby_attractions(&self, traveler: &Traveler) -> Result<Vec<NearbyAttraction>> {
        let visit = self.get_location(traveler).await?;
        nearby::top_five_nearby_attractions(&self.rewards, traveler.id(), visit.location).await
    }
}
