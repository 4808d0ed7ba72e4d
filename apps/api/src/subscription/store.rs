//! Storage seam for the subscription service.
//!
//! The service never touches a database handle directly: it is constructed
//! with an `Arc<dyn SubscriptionStore>`. Production uses `PgSubscriptionStore`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::subscription::{SubscriptionRow, UsageRecordRow};
use crate::models::user::UserRow;
use crate::subscription::plan::{Feature, PlanType};

/// A plan granted after a successful payment.
#[derive(Debug, Clone)]
pub struct PlanGrant {
    pub user_id: Uuid,
    pub plan: PlanType,
    pub status: String,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub ai_credits: i32,
}

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<UserRow>, sqlx::Error>;

    async fn find_subscription(
        &self,
        user_id: Uuid,
    ) -> Result<Option<SubscriptionRow>, sqlx::Error>;

    /// Atomically takes one credit from a `one_time` subscription with a
    /// positive balance and records the usage. Returns the new balance, or
    /// `None` when nothing was taken.
    async fn consume_credit(
        &self,
        user_id: Uuid,
        feature: Feature,
    ) -> Result<Option<i32>, sqlx::Error>;

    /// Creates or replaces the user's subscription. Credits are reset to the grant.
    async fn upsert_subscription(&self, grant: &PlanGrant) -> Result<SubscriptionRow, sqlx::Error>;

    async fn insert_usage(
        &self,
        user_id: Uuid,
        feature_type: &str,
        metadata: Option<Value>,
    ) -> Result<(), sqlx::Error>;

    async fn list_usage(&self, user_id: Uuid) -> Result<Vec<UsageRecordRow>, sqlx::Error>;
}

#[derive(Clone)]
pub struct PgSubscriptionStore {
    pool: PgPool,
}

impl PgSubscriptionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for PgSubscriptionStore {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<UserRow>, sqlx::Error> {
        sqlx::query_as::<_, UserRow>("SELECT id, email, created_at FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_subscription(
        &self,
        user_id: Uuid,
    ) -> Result<Option<SubscriptionRow>, sqlx::Error> {
        sqlx::query_as::<_, SubscriptionRow>("SELECT * FROM subscriptions WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn consume_credit(
        &self,
        user_id: Uuid,
        feature: Feature,
    ) -> Result<Option<i32>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        // Single conditional decrement: a concurrent request sees zero rows
        // instead of the same pre-decrement balance.
        let remaining: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE subscriptions
            SET ai_credits_remaining = ai_credits_remaining - 1,
                updated_at = NOW()
            WHERE user_id = $1
              AND plan_type = 'one_time'
              AND ai_credits_remaining > 0
            RETURNING ai_credits_remaining
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(remaining) = remaining {
            sqlx::query(
                "INSERT INTO usage_records (user_id, feature_type, metadata) VALUES ($1, $2, $3)",
            )
            .bind(user_id)
            .bind(feature.as_str())
            .bind(json!({ "credits_remaining": remaining }))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(remaining)
    }

    async fn upsert_subscription(&self, grant: &PlanGrant) -> Result<SubscriptionRow, sqlx::Error> {
        let row = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            INSERT INTO subscriptions
                (user_id, plan_type, status, current_period_start, current_period_end,
                 ai_credits_total, ai_credits_remaining)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ON CONFLICT (user_id) DO UPDATE SET
                plan_type = EXCLUDED.plan_type,
                status = EXCLUDED.status,
                current_period_start = EXCLUDED.current_period_start,
                current_period_end = EXCLUDED.current_period_end,
                ai_credits_total = EXCLUDED.ai_credits_total,
                ai_credits_remaining = EXCLUDED.ai_credits_remaining,
                cancel_at_period_end = FALSE,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(grant.user_id)
        .bind(grant.plan.as_str())
        .bind(&grant.status)
        .bind(grant.current_period_start)
        .bind(grant.current_period_end)
        .bind(grant.ai_credits)
        .fetch_one(&self.pool)
        .await?;

        info!(
            "Upserted {} subscription for user {}",
            grant.plan, grant.user_id
        );
        Ok(row)
    }

    async fn insert_usage(
        &self,
        user_id: Uuid,
        feature_type: &str,
        metadata: Option<Value>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO usage_records (user_id, feature_type, metadata) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(feature_type)
        .bind(metadata)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_usage(&self, user_id: Uuid) -> Result<Vec<UsageRecordRow>, sqlx::Error> {
        sqlx::query_as::<_, UsageRecordRow>(
            "SELECT * FROM usage_records WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }
}
