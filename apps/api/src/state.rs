use crate::ai_client::AiServiceClient;
use crate::config::Config;
use crate::subscription::SubscriptionService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Plan and credit checks. Owns the storage handle.
    pub subscriptions: SubscriptionService,
    pub ai: AiServiceClient,
    #[allow(dead_code)]
    pub config: Config,
}
