//! In-memory traveler store keyed by unique name
//!
//! Stands in for a real datastore. Travelers are handed out as
//! `Arc<Traveler>`; their mutable state is guarded per traveler, so the
//! store lock is only held for map lookups.

use crate::domain::traveler::Traveler;
use crate::domain::types::{TravelerId, VisitedLocation};
use crate::io::location::random_coordinate;
use chrono::{Duration as ChronoDuration, Utc};
use parking_lot::RwLock;
use rand::Rng;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::debug;

pub trait UserStore: Send + Sync {
    /// Every registered traveler, in registration order
    fn list_all(&self) -> Vec<Arc<Traveler>>;

    fn get(&self, name: &str) -> Option<Arc<Traveler>>;

    /// Register a traveler unless the name is taken; returns the stored one
    fn add_if_absent(&self, traveler: Traveler) -> Arc<Traveler>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Default)]
struct Inner {
    by_name: FxHashMap<String, usize>,
    travelers: Vec<Arc<Traveler>>,
}

#[derive(Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Inner>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for InMemoryUserStore {
    fn list_all(&self) -> Vec<Arc<Traveler>> {
        self.inner.read().travelers.clone()
    }

    fn get(&self, name: &str) -> Option<Arc<Traveler>> {
        let inner = self.inner.read();
        inner.by_name.get(name).map(|&idx| inner.travelers[idx].clone())
    }

    fn add_if_absent(&self, traveler: Traveler) -> Arc<Traveler> {
        let mut inner = self.inner.write();
        if let Some(&idx) = inner.by_name.get(traveler.name()) {
            return inner.travelers[idx].clone();
        }
        let traveler = Arc::new(traveler);
        let idx = inner.travelers.len();
        inner.by_name.insert(traveler.name().to_string(), idx);
        inner.travelers.push(traveler.clone());
        traveler
    }

    fn len(&self) -> usize {
        self.inner.read().travelers.len()
    }
}

/// Populate the store with `count` internal travelers for dev and test runs
///
/// Each traveler gets `visits` random locations stamped within the last 30
/// days. Names follow `internalUser<N>`.
pub fn seed_travelers<R: Rng + ?Sized>(
    store: &dyn UserStore,
    count: usize,
    visits: usize,
    rng: &mut R,
) -> usize {
    for i in 0..count {
        let name = format!("internalUser{i}");
        let id = TravelerId::new();
        let history: Vec<VisitedLocation> = (0..visits)
            .map(|_| {
                let days_ago = rng.gen_range(0..30);
                VisitedLocation::new(
                    id,
                    random_coordinate(&mut *rng),
                    Utc::now() - ChronoDuration::days(days_ago),
                )
            })
            .collect();
        let traveler = Traveler::with_id(id, &name)
            .with_contact("000", &format!("{name}@tourGuide.com"))
            .with_history(history);
        store.add_if_absent(traveler);
    }
    debug!(count = %count, visits = %visits, "internal_travelers_seeded");
    count
}
