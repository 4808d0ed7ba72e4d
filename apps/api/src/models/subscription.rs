use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::subscription::plan::PlanType;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SubscriptionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_type: String,
    /// Payment-provider status, e.g. `active`, `past_due`, `canceled`.
    pub status: String,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub ai_credits_total: i32,
    /// `-1` unlimited, `0` exhausted, `>0` remaining balance.
    pub ai_credits_remaining: i32,
    pub cancel_at_period_end: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionRow {
    /// Parsed plan. Unrecognised values are treated as `free`.
    pub fn plan(&self) -> PlanType {
        self.plan_type.parse().unwrap_or(PlanType::Free)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UsageRecordRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub feature_type: String,
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}
