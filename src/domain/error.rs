//! Error taxonomy for the tour guide core

use crate::domain::types::TravelerId;
use thiserror::Error;

/// Which external collaborator failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Location,
    RewardPoints,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Location => "location",
            Provider::RewardPoints => "reward_points",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
pub enum TourGuideError {
    #[error("unknown traveler: {0}")]
    UnknownTraveler(String),

    #[error("{provider} provider failed for traveler {traveler_id}: {message}")]
    ProviderFailure { provider: Provider, traveler_id: TravelerId, message: String },

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("work for traveler {0} was cancelled before completing")]
    WorkerCancelled(TravelerId),
}

impl TourGuideError {
    pub fn provider(provider: Provider, traveler_id: TravelerId, message: impl Into<String>) -> Self {
        TourGuideError::ProviderFailure { provider, traveler_id, message: message.into() }
    }

    /// Provider failures are the only errors worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, TourGuideError::ProviderFailure { .. })
    }
}

pub type Result<T> = std::result::Result<T, TourGuideError>;
