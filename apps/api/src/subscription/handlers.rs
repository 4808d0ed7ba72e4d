//! Subscription API: plan overview, limits, feature checks, credits and the
//! pricing-page helpers (plan actions and proration quotes).

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::subscription::plan::{Feature, PlanLimits, PlanType};
use crate::subscription::rules::{calculate_proration, days_remaining, plan_action, PlanAction, Proration};
use crate::subscription::service::{SubscriptionOverview, UsageStats};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct UserIdBody {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct TargetPlanRequest {
    pub user_id: Uuid,
    pub target_plan: String,
}

#[derive(Deserialize)]
pub struct PurchaseRequest {
    pub user_id: Uuid,
    pub plan: String,
    #[serde(default = "default_period_days")]
    pub period_days: i64,
}

fn default_period_days() -> i64 {
    30
}

#[derive(Serialize)]
pub struct FeatureAccessResponse {
    pub feature: Feature,
    pub has_access: bool,
}

#[derive(Serialize)]
pub struct CreditUseResponse {
    pub used: bool,
    pub credits_remaining: i32,
}

/// GET /api/v1/subscription
pub async fn handle_get_subscription(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<SubscriptionOverview>, AppError> {
    let overview = state.subscriptions.get_user_subscription(params.user_id).await?;
    Ok(Json(overview))
}

/// GET /api/v1/subscription/limits
pub async fn handle_get_limits(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<PlanLimits>, AppError> {
    Ok(Json(state.subscriptions.plan_limits(params.user_id).await?))
}

/// GET /api/v1/subscription/features/:feature
pub async fn handle_feature_access(
    State(state): State<AppState>,
    Path(feature): Path<String>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<FeatureAccessResponse>, AppError> {
    let feature: Feature = feature.parse()?;
    let has_access = state
        .subscriptions
        .has_feature_access(params.user_id, feature)
        .await?;
    Ok(Json(FeatureAccessResponse { feature, has_access }))
}

/// POST /api/v1/subscription/credits/use
pub async fn handle_use_credit(
    State(state): State<AppState>,
    Json(req): Json<UserIdBody>,
) -> Result<Json<CreditUseResponse>, AppError> {
    let used = state.subscriptions.use_ai_credit(req.user_id).await?;
    let credits_remaining = state.subscriptions.remaining_credits(req.user_id).await?;
    Ok(Json(CreditUseResponse {
        used,
        credits_remaining,
    }))
}

/// GET /api/v1/subscription/usage
pub async fn handle_usage_stats(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<UsageStats>, AppError> {
    Ok(Json(state.subscriptions.usage_stats(params.user_id).await?))
}

/// POST /api/v1/subscription/plan-action
pub async fn handle_plan_action(
    State(state): State<AppState>,
    Json(req): Json<TargetPlanRequest>,
) -> Result<Json<PlanAction>, AppError> {
    let target: PlanType = req.target_plan.parse()?;
    let overview = state.subscriptions.get_user_subscription(req.user_id).await?;
    let cancel_at_period_end = overview
        .subscription
        .as_ref()
        .is_some_and(|s| s.cancel_at_period_end);

    Ok(Json(plan_action(overview.status, target, cancel_at_period_end)))
}

/// POST /api/v1/subscription/proration
pub async fn handle_proration(
    State(state): State<AppState>,
    Json(req): Json<TargetPlanRequest>,
) -> Result<Json<Proration>, AppError> {
    let target: PlanType = req.target_plan.parse()?;
    let target_price = target.monthly_price().ok_or_else(|| {
        AppError::Validation(format!("{target} is not a recurring plan"))
    })?;

    let overview = state.subscriptions.get_user_subscription(req.user_id).await?;
    let (current_price, period_end) = match (
        overview.status.monthly_price(),
        overview.subscription.and_then(|s| s.current_period_end),
    ) {
        (Some(price), Some(end)) => (price, end),
        _ => {
            return Err(AppError::Conflict(
                "Proration requires an active recurring subscription".to_string(),
            ))
        }
    };

    let days = days_remaining(period_end, Utc::now());
    Ok(Json(calculate_proration(current_price, target_price, days)))
}

/// POST /api/v1/subscription/purchase
/// Called by the payment webhook once a checkout has been paid.
pub async fn handle_purchase(
    State(state): State<AppState>,
    Json(req): Json<PurchaseRequest>,
) -> Result<Json<SubscriptionOverview>, AppError> {
    let plan: PlanType = req.plan.parse()?;
    if req.period_days <= 0 {
        return Err(AppError::Validation("period_days must be positive".to_string()));
    }

    state
        .subscriptions
        .record_purchase(req.user_id, plan, Duration::days(req.period_days))
        .await?;
    let overview = state.subscriptions.get_user_subscription(req.user_id).await?;
    Ok(Json(overview))
}
