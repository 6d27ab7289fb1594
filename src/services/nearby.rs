//! Nearest attractions to a location, regardless of distance
//!
//! Single pass over the catalog keeping the best `k` candidates in a small
//! inline buffer. Ordering is `(distance, attraction name)`, so equal
//! distances resolve the same way no matter how the catalog is ordered.

use crate::domain::error::Result;
use crate::domain::geo::distance;
use crate::domain::types::{Attraction, Coordinate, NearbyAttraction, TravelerId};
use crate::services::rewards::RewardsEngine;
use smallvec::SmallVec;
use std::cmp::Ordering;

pub const TOP_K: usize = 5;

#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    attraction: &'a Attraction,
    distance: f64,
}

impl Candidate<'_> {
    fn rank(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.attraction.name.cmp(&other.attraction.name))
    }
}

/// The `k` attractions closest to `origin`, nearest first
///
/// Returns fewer than `k` when the catalog is smaller.
pub fn nearest_attractions(attractions: &[Attraction], origin: Coordinate, k: usize) -> Vec<(&Attraction, f64)> {
    if k == 0 {
        return Vec::new();
    }

    let mut best: SmallVec<[Candidate<'_>; TOP_K]> = SmallVec::new();
    for attraction in attractions {
        let candidate = Candidate { attraction, distance: distance(origin, attraction.location) };
        if best.len() < k {
            best.push(candidate);
            continue;
        }
        // Replace the current worst only when strictly better
        let worst = best
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.rank(b))
            .map(|(idx, _)| idx);
        if let Some(idx) = worst {
            if candidate.rank(&best[idx]) == Ordering::Less {
                best[idx] = candidate;
            }
        }
    }

    best.sort_by(|a, b| a.rank(b));
    best.into_iter().map(|c| (c.attraction, c.distance)).collect()
}

/// Five nearest attractions with the points the traveler would earn at each
///
/// Points are only looked up for the entries returned.
pub async fn top_five_nearby_attractions(
    engine: &RewardsEngine,
    traveler_id: TravelerId,
    origin: Coordinate,
) -> Result<Vec<NearbyAttraction>> {
    let attractions = engine.catalog().list_attractions();
    let nearest = nearest_attractions(&attractions, origin, TOP_K);

    let mut out = Vec::with_capacity(nearest.len());
    for (attraction, distance_miles) in nearest {
        let reward_points = engine.get_reward_points(attraction, traveler_id).await?;
        out.push(NearbyAttraction {
            attraction_name: attraction.name.clone(),
            attraction_location: attraction.location,
            traveler_location: origin,
            distance_miles,
            reward_points,
        });
    }
    Ok(out)
}
