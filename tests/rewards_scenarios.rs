//! End-to-end reward scenarios over the worker pool

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::sync::Arc;
use tourguide_core::domain::geo::distance;
use tourguide_core::domain::{Attraction, Coordinate, Traveler, TravelerId, VisitedLocation};
use tourguide_core::infra::{Metrics, RewardsConfig};
use tourguide_core::io::{InMemoryUserStore, ScriptedLocationProvider, SimulatedRewardPoints, StaticCatalog};
use tourguide_core::services::{LocationTracker, RewardsEngine, TourGuide, WorkerPool};

const TRAVELERS: usize = 200;
const VISITS: usize = 3;

fn attractions() -> Vec<Attraction> {
    vec![
        Attraction::new("Disneyland", "Anaheim", "CA", 33.817595, -117.922008),
        Attraction::new("Jackson Hole", "Jackson Hole", "WY", 43.582767, -110.821999),
        Attraction::new("Mojave National Preserve", "Kelso", "CA", 35.141689, -115.510399),
        Attraction::new("Joshua Tree National Park", "Joshua Tree", "CA", 33.881866, -115.90065),
        Attraction::new("Buffalo National River", "St Joe", "AR", 35.985512, -92.757652),
        Attraction::new("Hot Springs National Park", "Hot Springs", "AR", 34.52153, -93.042267),
        Attraction::new("Kartchner Caverns State Park", "Benson", "AZ", 31.837551, -110.347382),
        Attraction::new("Legend Valley", "Thornville", "OH", 39.937778, -82.40667),
        Attraction::new("Flowers Bakery of London", "Flowers Bakery of London", "KY", 37.131527, -84.07486),
        Attraction::new("McKinley Tower", "Anchorage", "AK", 61.218887, -149.877502),
    ]
}

/// Visit histories that land near attractions about half the time
fn histories(catalog: &[Attraction], seed: u64) -> Vec<Vec<Coordinate>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..TRAVELERS)
        .map(|_| {
            (0..VISITS)
                .map(|_| {
                    if rng.gen_bool(0.5) {
                        let target = &catalog[rng.gen_range(0..catalog.len())];
                        Coordinate::new(
                            target.location.latitude + rng.gen_range(-0.2..0.2),
                            target.location.longitude + rng.gen_range(-0.2..0.2),
                        )
                    } else {
                        Coordinate::new(rng.gen_range(-60.0..60.0), rng.gen_range(-180.0..180.0))
                    }
                })
                .collect()
        })
        .collect()
}

fn build_travelers(histories: &[Vec<Coordinate>]) -> Vec<Arc<Traveler>> {
    histories
        .iter()
        .enumerate()
        .map(|(i, coords)| {
            let id = TravelerId::new();
            let visits: Vec<VisitedLocation> =
                coords.iter().map(|&c| VisitedLocation::new(id, c, Utc::now())).collect();
            Arc::new(Traveler::with_id(id, &format!("internalUser{i}")).with_history(visits))
        })
        .collect()
}

fn engine(catalog: Vec<Attraction>, metrics: Arc<Metrics>) -> Arc<RewardsEngine> {
    Arc::new(
        RewardsEngine::new(
            Arc::new(StaticCatalog::new(catalog)),
            Arc::new(SimulatedRewardPoints::new()),
            RewardsConfig::default(),
            Arc::new(WorkerPool::new(50)),
            metrics,
        )
        .unwrap(),
    )
}

/// Attraction names any of the visits falls within the buffer of
fn expected_names(catalog: &[Attraction], coords: &[Coordinate], buffer: f64) -> BTreeSet<String> {
    catalog
        .iter()
        .filter(|a| coords.iter().any(|&c| distance(a.location, c) <= buffer))
        .map(|a| a.name.clone())
        .collect()
}

async fn reward_names(traveler: &Traveler) -> BTreeSet<String> {
    traveler.snapshot().await.rewards().iter().map(|r| r.attraction.name.clone()).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_bulk_rewards_are_buffer_consistent_and_idempotent() {
    let catalog = attractions();
    let histories = histories(&catalog, 42);
    let travelers = build_travelers(&histories);
    let metrics = Arc::new(Metrics::new());
    let engine = engine(catalog.clone(), metrics.clone());
    let buffer = engine.config().proximity_buffer_miles;

    let report = engine.calculate_multiple_user_rewards(&travelers).await;
    assert!(report.is_complete());
    assert_eq!(report.travelers, TRAVELERS);

    let mut total = 0;
    let mut totals = Vec::with_capacity(TRAVELERS);
    for (traveler, coords) in travelers.iter().zip(&histories) {
        let names = reward_names(traveler).await;
        assert_eq!(names, expected_names(&catalog, coords, buffer));

        let state = traveler.snapshot().await;
        assert_eq!(state.rewards().len(), names.len());
        assert!(state.rewards().iter().all(|r| (1..=1000).contains(&r.points)));
        total += names.len();
        totals.push(state.total_reward_points());
    }
    assert_eq!(report.rewards_granted, total);
    assert!(total > 0);

    let rerun = engine.calculate_multiple_user_rewards(&travelers).await;
    assert!(rerun.is_complete());
    assert_eq!(rerun.rewards_granted, 0);
    for (traveler, before) in travelers.iter().zip(&totals) {
        assert_eq!(traveler.snapshot().await.total_reward_points(), *before);
    }

    let summary = metrics.report();
    assert_eq!(summary.bulk_runs, 2);
    assert_eq!(summary.rewards_granted, total as u64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_same_histories_give_same_rewards() {
    let catalog = attractions();
    let histories = histories(&catalog, 7);

    let first = build_travelers(&histories);
    let second = build_travelers(&histories);
    engine(catalog.clone(), Arc::new(Metrics::new())).calculate_multiple_user_rewards(&first).await;
    engine(catalog, Arc::new(Metrics::new())).calculate_multiple_user_rewards(&second).await;

    for (a, b) in first.iter().zip(&second) {
        assert_eq!(reward_names(a).await, reward_names(b).await);
    }
}

#[tokio::test(start_paused = true)]
async fn test_tracker_and_on_demand_queries_share_state() {
    let catalog = attractions();
    let disneyland = catalog[0].location;
    let metrics = Arc::new(Metrics::new());
    let guide = Arc::new(TourGuide::new(
        Arc::new(InMemoryUserStore::new()),
        Arc::new(ScriptedLocationProvider::new(disneyland)),
        engine(catalog, metrics.clone()),
        metrics.clone(),
    ));
    let traveler = guide.add_traveler(Traveler::new("visitor"));

    let handle = LocationTracker::spawn(guide.clone(), std::time::Duration::from_secs(60));
    while metrics.report().tracker_passes == 0 {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    handle.shutdown().await;

    let rewards = guide.rewards(&traveler).await;
    assert_eq!(rewards.len(), 1);
    assert_eq!(rewards[0].attraction.name, "Disneyland");

    let nearby = guide.top_five_nearby_attractions(&traveler).await.unwrap();
    assert_eq!(nearby.len(), 5);
    assert_eq!(nearby[0].attraction_name, "Disneyland");
    assert_eq!(nearby[0].distance_miles, 0.0);
    assert_eq!(nearby[0].reward_points, rewards[0].points);
    assert_eq!(traveler.snapshot().await.visited_locations().len(), 1);
}
