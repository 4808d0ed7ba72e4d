//! In-memory `SubscriptionStore` for service and route tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::subscription::{SubscriptionRow, UsageRecordRow};
use crate::models::user::UserRow;
use crate::subscription::plan::{Feature, PlanType};
use crate::subscription::store::{PlanGrant, SubscriptionStore};

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<Uuid, UserRow>>,
    subscriptions: Mutex<HashMap<Uuid, SubscriptionRow>>,
    usage: Mutex<Vec<UsageRecordRow>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user without a subscription row.
    pub fn add_user(&self, email: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.users.lock().unwrap().insert(
            id,
            UserRow { id, email: email.to_string(), created_at: Utc::now() },
        );
        id
    }

    /// Adds a user holding `plan` with the given status, credits and period end.
    pub fn add_subscriber(
        &self,
        plan: PlanType,
        status: &str,
        credits: i32,
        period_end: Option<DateTime<Utc>>,
    ) -> Uuid {
        let user_id = self.add_user(&format!("{plan}@example.com"));
        let now = Utc::now();
        self.subscriptions.lock().unwrap().insert(
            user_id,
            SubscriptionRow {
                id: Uuid::new_v4(),
                user_id,
                plan_type: plan.as_str().to_string(),
                status: status.to_string(),
                current_period_start: Some(now),
                current_period_end: period_end,
                ai_credits_total: credits,
                ai_credits_remaining: credits,
                cancel_at_period_end: false,
                created_at: now,
                updated_at: now,
            },
        );
        user_id
    }

    pub fn set_cancel_at_period_end(&self, user_id: Uuid, cancel: bool) {
        if let Some(sub) = self.subscriptions.lock().unwrap().get_mut(&user_id) {
            sub.cancel_at_period_end = cancel;
        }
    }

    pub fn usage_count(&self) -> usize {
        self.usage.lock().unwrap().len()
    }

    fn push_usage(&self, user_id: Uuid, feature_type: &str, metadata: Option<Value>) {
        self.usage.lock().unwrap().push(UsageRecordRow {
            id: Uuid::new_v4(),
            user_id,
            feature_type: feature_type.to_string(),
            metadata,
            created_at: Utc::now(),
        });
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<UserRow>, sqlx::Error> {
        Ok(self.users.lock().unwrap().get(&user_id).cloned())
    }

    async fn find_subscription(
        &self,
        user_id: Uuid,
    ) -> Result<Option<SubscriptionRow>, sqlx::Error> {
        Ok(self.subscriptions.lock().unwrap().get(&user_id).cloned())
    }

    async fn consume_credit(
        &self,
        user_id: Uuid,
        feature: Feature,
    ) -> Result<Option<i32>, sqlx::Error> {
        let remaining = {
            let mut subs = self.subscriptions.lock().unwrap();
            match subs.get_mut(&user_id) {
                Some(sub) if sub.plan_type == "one_time" && sub.ai_credits_remaining > 0 => {
                    sub.ai_credits_remaining -= 1;
                    sub.updated_at = Utc::now();
                    Some(sub.ai_credits_remaining)
                }
                _ => None,
            }
        };
        if let Some(remaining) = remaining {
            self.push_usage(
                user_id,
                feature.as_str(),
                Some(json!({ "credits_remaining": remaining })),
            );
        }
        Ok(remaining)
    }

    async fn upsert_subscription(&self, grant: &PlanGrant) -> Result<SubscriptionRow, sqlx::Error> {
        let now = Utc::now();
        let mut subs = self.subscriptions.lock().unwrap();
        let (id, created_at) = subs
            .get(&grant.user_id)
            .map(|s| (s.id, s.created_at))
            .unwrap_or_else(|| (Uuid::new_v4(), now));
        let row = SubscriptionRow {
            id,
            user_id: grant.user_id,
            plan_type: grant.plan.as_str().to_string(),
            status: grant.status.clone(),
            current_period_start: grant.current_period_start,
            current_period_end: grant.current_period_end,
            ai_credits_total: grant.ai_credits,
            ai_credits_remaining: grant.ai_credits,
            cancel_at_period_end: false,
            created_at,
            updated_at: now,
        };
        subs.insert(grant.user_id, row.clone());
        Ok(row)
    }

    async fn insert_usage(
        &self,
        user_id: Uuid,
        feature_type: &str,
        metadata: Option<Value>,
    ) -> Result<(), sqlx::Error> {
        self.push_usage(user_id, feature_type, metadata);
        Ok(())
    }

    async fn list_usage(&self, user_id: Uuid) -> Result<Vec<UsageRecordRow>, sqlx::Error> {
        Ok(self
            .usage
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }
}
