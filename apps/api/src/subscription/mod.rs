//! Plans, AI credits and feature gating.

pub mod guard;
pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod plan;
pub mod rules;
pub mod service;
pub mod store;

use thiserror::Error;
use uuid::Uuid;

pub use plan::{Feature, PlanType};
pub use service::SubscriptionService;

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("User {0} not found")]
    UserNotFound(Uuid),

    #[error("User {0} has no one-time subscription")]
    NoOneTimeSubscription(Uuid),

    #[error("Invalid plan type: {0}")]
    InvalidPlan(String),

    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    #[error("Subscription storage error: {0}")]
    Storage(#[from] sqlx::Error),
}
