//! Traveler model: identity, visit history and earned rewards
//!
//! Each traveler owns an async mutex around its mutable state. Anything that
//! reads the last location, appends a visit or recomputes rewards does so
//! while holding that lock, which serializes the tracker pass and on-demand
//! lookups for the same traveler without blocking other travelers.

use crate::domain::types::{Reward, TravelerId, VisitedLocation};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};

/// Trip preferences; carried for the pricing layer, never read by the core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelerPreferences {
    pub trip_duration_days: u32,
    pub ticket_quantity: u32,
    pub number_of_adults: u32,
    pub number_of_children: u32,
}

impl Default for TravelerPreferences {
    fn default() -> Self {
        Self { trip_duration_days: 1, ticket_quantity: 1, number_of_adults: 1, number_of_children: 0 }
    }
}

/// Mutable part of a traveler, only reachable through [`Traveler::lock`]
#[derive(Debug, Clone, Default)]
pub struct TravelerState {
    visited_locations: Vec<VisitedLocation>,
    rewards: Vec<Reward>,
}

impl TravelerState {
    pub fn visited_locations(&self) -> &[VisitedLocation] {
        &self.visited_locations
    }

    pub fn last_visited_location(&self) -> Option<&VisitedLocation> {
        self.visited_locations.last()
    }

    pub fn rewards(&self) -> &[Reward] {
        &self.rewards
    }

    /// Names of attractions already rewarded
    pub fn rewarded_names(&self) -> FxHashSet<&str> {
        self.rewards.iter().map(|r| r.attraction.name.as_str()).collect()
    }

    pub fn has_reward_for(&self, attraction_name: &str) -> bool {
        self.rewards.iter().any(|r| r.attraction.name == attraction_name)
    }

    /// Add a reward unless one already exists for the same attraction name
    ///
    /// Returns whether the reward was added.
    pub fn add_reward(&mut self, reward: Reward) -> bool {
        if self.has_reward_for(&reward.attraction.name) {
            return false;
        }
        self.rewards.push(reward);
        true
    }

    /// Apply a fully computed update in one step
    ///
    /// Returns the number of rewards actually added.
    pub fn commit(&mut self, visit: Option<VisitedLocation>, rewards: Vec<Reward>) -> usize {
        if let Some(visit) = visit {
            self.visited_locations.push(visit);
        }
        let mut added = 0;
        for reward in rewards {
            if self.add_reward(reward) {
                added += 1;
            }
        }
        added
    }

    pub fn total_reward_points(&self) -> i64 {
        self.rewards.iter().map(|r| i64::from(r.points)).sum()
    }
}

/// A registered traveler
#[derive(Debug)]
pub struct Traveler {
    id: TravelerId,
    name: String,
    phone: String,
    email: String,
    preferences: TravelerPreferences,
    state: Mutex<TravelerState>,
}

impl Traveler {
    pub fn new(name: &str) -> Self {
        Self::with_id(TravelerId::new(), name)
    }

    pub fn with_id(id: TravelerId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            phone: String::new(),
            email: String::new(),
            preferences: TravelerPreferences::default(),
            state: Mutex::new(TravelerState::default()),
        }
    }

    pub fn with_contact(mut self, phone: &str, email: &str) -> Self {
        self.phone = phone.to_string();
        self.email = email.to_string();
        self
    }

    pub fn with_preferences(mut self, preferences: TravelerPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Seed the visit history at construction time
    pub fn with_history(mut self, visits: impl IntoIterator<Item = VisitedLocation>) -> Self {
        self.state.get_mut().visited_locations.extend(visits);
        self
    }

    pub fn id(&self) -> TravelerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn preferences(&self) -> &TravelerPreferences {
        &self.preferences
    }

    /// Exclusive access to the traveler's history and rewards
    pub async fn lock(&self) -> MutexGuard<'_, TravelerState> {
        self.state.lock().await
    }

    /// Point-in-time copy of the mutable state
    pub async fn snapshot(&self) -> TravelerState {
        self.state.lock().await.clone()
    }
}
