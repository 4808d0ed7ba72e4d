use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::models::subscription::SubscriptionRow;
use crate::subscription::plan::{feature_access, Access, Feature, PlanLimits, PlanType};
use crate::subscription::store::{PlanGrant, SubscriptionStore};
use crate::subscription::SubscriptionError;

/// Credits granted by a Quick Boost purchase.
pub const ONE_TIME_CREDITS: i32 = 3;
/// Credit balance stored for plans with unlimited AI.
pub const UNLIMITED_CREDITS: i32 = -1;

const TERMINAL_STATUSES: [&str; 4] = ["canceled", "cancelled", "unpaid", "incomplete_expired"];

/// Snapshot of a user's plan as shown on the account page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionOverview {
    pub user_id: Uuid,
    /// Effective plan after expiry and status checks.
    pub status: PlanType,
    pub plan_label: String,
    /// Raw payment-provider status, when a subscription row exists.
    pub billing_status: Option<String>,
    pub subscription: Option<SubscriptionRow>,
    pub credits_remaining: i32,
    pub can_upgrade: bool,
    pub available_upgrades: Vec<PlanType>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsageStats {
    pub total: usize,
    pub by_feature: BTreeMap<String, usize>,
}

/// Resolves the plan a subscription row actually entitles its holder to.
pub fn effective_plan(sub: Option<&SubscriptionRow>, now: DateTime<Utc>) -> PlanType {
    let Some(sub) = sub else {
        return PlanType::Free;
    };
    if TERMINAL_STATUSES.contains(&sub.status.to_ascii_lowercase().as_str()) {
        return PlanType::Free;
    }
    if sub.current_period_end.is_some_and(|end| end < now) {
        return PlanType::Free;
    }
    sub.plan()
}

#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<dyn SubscriptionStore>,
}

impl SubscriptionService {
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self { store }
    }

    /// Whether the user may use `feature` right now. Unknown users have no access.
    pub async fn has_feature_access(
        &self,
        user_id: Uuid,
        feature: Feature,
    ) -> Result<bool, SubscriptionError> {
        if self.store.find_user(user_id).await?.is_none() {
            return Ok(false);
        }
        let sub = self.store.find_subscription(user_id).await?;
        let plan = effective_plan(sub.as_ref(), Utc::now());

        Ok(match feature_access(plan, feature) {
            Access::Allow => true,
            Access::Deny => false,
            Access::CreditGated => sub.is_some_and(|s| s.ai_credits_remaining > 0),
        })
    }

    /// Spends one Quick Boost credit. `Ok(false)` when the balance is already zero.
    pub async fn use_ai_credit(&self, user_id: Uuid) -> Result<bool, SubscriptionError> {
        let sub = self.store.find_subscription(user_id).await?;
        if sub.map(|s| s.plan()) != Some(PlanType::OneTime) {
            return Err(SubscriptionError::NoOneTimeSubscription(user_id));
        }

        match self.store.consume_credit(user_id, Feature::AiPolish).await? {
            Some(remaining) => {
                info!("AI credit used by user {user_id}, {remaining} remaining");
                Ok(true)
            }
            None => {
                info!("User {user_id} has no AI credits left");
                Ok(false)
            }
        }
    }

    pub async fn get_user_subscription(
        &self,
        user_id: Uuid,
    ) -> Result<SubscriptionOverview, SubscriptionError> {
        if self.store.find_user(user_id).await?.is_none() {
            return Err(SubscriptionError::UserNotFound(user_id));
        }
        let sub = self.store.find_subscription(user_id).await?;
        let plan = effective_plan(sub.as_ref(), Utc::now());
        let available_upgrades = plan.available_upgrades();

        Ok(SubscriptionOverview {
            user_id,
            status: plan,
            plan_label: plan.label().to_string(),
            billing_status: sub.as_ref().map(|s| s.status.clone()),
            credits_remaining: credits_for(plan, sub.as_ref()),
            can_upgrade: !available_upgrades.is_empty(),
            available_upgrades,
            subscription: sub,
        })
    }

    /// Effective plan for a user; unknown users are treated as `free`.
    pub async fn effective_plan(&self, user_id: Uuid) -> Result<PlanType, SubscriptionError> {
        let sub = self.store.find_subscription(user_id).await?;
        Ok(effective_plan(sub.as_ref(), Utc::now()))
    }

    /// `-1` for unlimited plans, the balance for Quick Boost, `0` otherwise.
    pub async fn remaining_credits(&self, user_id: Uuid) -> Result<i32, SubscriptionError> {
        let sub = self.store.find_subscription(user_id).await?;
        let plan = effective_plan(sub.as_ref(), Utc::now());
        Ok(credits_for(plan, sub.as_ref()))
    }

    pub async fn plan_limits(&self, user_id: Uuid) -> Result<PlanLimits, SubscriptionError> {
        if self.store.find_user(user_id).await?.is_none() {
            return Err(SubscriptionError::UserNotFound(user_id));
        }
        let sub = self.store.find_subscription(user_id).await?;
        let plan = effective_plan(sub.as_ref(), Utc::now());
        Ok(PlanLimits::for_plan(plan, credits_for(plan, sub.as_ref())))
    }

    /// Activates `plan` after a successful payment. Recurring plans run for
    /// `period` from now; Quick Boost has no period end.
    pub async fn record_purchase(
        &self,
        user_id: Uuid,
        plan: PlanType,
        period: Duration,
    ) -> Result<SubscriptionRow, SubscriptionError> {
        if self.store.find_user(user_id).await?.is_none() {
            return Err(SubscriptionError::UserNotFound(user_id));
        }
        let ai_credits = match plan {
            PlanType::Free => return Err(SubscriptionError::InvalidPlan(plan.to_string())),
            PlanType::OneTime => ONE_TIME_CREDITS,
            PlanType::Basic | PlanType::Pro => UNLIMITED_CREDITS,
        };

        let now = Utc::now();
        let grant = PlanGrant {
            user_id,
            plan,
            status: "active".to_string(),
            current_period_start: Some(now),
            current_period_end: plan.is_recurring().then(|| now + period),
            ai_credits,
        };
        let row = self.store.upsert_subscription(&grant).await?;
        info!("Recorded {plan} purchase for user {user_id}");
        Ok(row)
    }

    pub async fn track_usage(
        &self,
        user_id: Uuid,
        feature: Feature,
        metadata: Option<Value>,
    ) -> Result<(), SubscriptionError> {
        self.store
            .insert_usage(user_id, feature.as_str(), metadata)
            .await?;
        Ok(())
    }

    pub async fn usage_stats(&self, user_id: Uuid) -> Result<UsageStats, SubscriptionError> {
        let records = self.store.list_usage(user_id).await?;
        let mut by_feature = BTreeMap::new();
        for record in &records {
            *by_feature.entry(record.feature_type.clone()).or_insert(0) += 1;
        }
        Ok(UsageStats {
            total: records.len(),
            by_feature,
        })
    }
}

fn credits_for(plan: PlanType, sub: Option<&SubscriptionRow>) -> i32 {
    match plan {
        PlanType::Basic | PlanType::Pro => UNLIMITED_CREDITS,
        PlanType::OneTime => sub.map_or(0, |s| s.ai_credits_remaining.max(0)),
        PlanType::Free => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::memory::MemoryStore;
    use serde_json::json;

    fn service_with(store: Arc<MemoryStore>) -> SubscriptionService {
        SubscriptionService::new(store)
    }

    fn future() -> Option<DateTime<Utc>> {
        Some(Utc::now() + Duration::days(20))
    }

    #[tokio::test]
    async fn test_feature_matrix_through_service() {
        let store = Arc::new(MemoryStore::new());
        let free = store.add_user("free@example.com");
        let boost = store.add_subscriber(PlanType::OneTime, "active", 2, None);
        let basic = store.add_subscriber(PlanType::Basic, "active", -1, future());
        let pro = store.add_subscriber(PlanType::Pro, "active", -1, future());
        let svc = service_with(store);

        for feature in Feature::ALL {
            assert!(!svc.has_feature_access(free, feature).await.unwrap());
            assert!(svc.has_feature_access(pro, feature).await.unwrap());
        }
        assert!(svc.has_feature_access(boost, Feature::AiPolish).await.unwrap());
        assert!(svc.has_feature_access(boost, Feature::AllTemplates).await.unwrap());
        assert!(!svc.has_feature_access(boost, Feature::AtsScore).await.unwrap());
        assert!(svc.has_feature_access(basic, Feature::AiCoverLetter).await.unwrap());
        assert!(svc.has_feature_access(basic, Feature::AtsScore).await.unwrap());
        assert!(!svc.has_feature_access(basic, Feature::UnlimitedResumes).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_user_has_no_access() {
        let svc = service_with(Arc::new(MemoryStore::new()));
        assert!(!svc
            .has_feature_access(Uuid::new_v4(), Feature::AiPolish)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_credits_run_out_without_going_negative() {
        let store = Arc::new(MemoryStore::new());
        let user = store.add_subscriber(PlanType::OneTime, "active", 3, None);
        let svc = service_with(store.clone());

        assert!(svc.use_ai_credit(user).await.unwrap());
        assert_eq!(svc.remaining_credits(user).await.unwrap(), 2);
        for _ in 0..2 {
            assert!(svc.use_ai_credit(user).await.unwrap());
        }
        assert!(!svc.use_ai_credit(user).await.unwrap());
        assert_eq!(svc.remaining_credits(user).await.unwrap(), 0);
        assert!(!svc.has_feature_access(user, Feature::AiPolish).await.unwrap());
        // Only successful decrements are audited.
        assert_eq!(store.usage_count(), 3);
    }

    #[tokio::test]
    async fn test_use_credit_requires_one_time_plan() {
        let store = Arc::new(MemoryStore::new());
        let pro = store.add_subscriber(PlanType::Pro, "active", -1, future());
        let nobody = store.add_user("nobody@example.com");
        let svc = service_with(store);

        assert!(matches!(
            svc.use_ai_credit(pro).await,
            Err(SubscriptionError::NoOneTimeSubscription(id)) if id == pro
        ));
        assert!(matches!(
            svc.use_ai_credit(nobody).await,
            Err(SubscriptionError::NoOneTimeSubscription(_))
        ));
    }

    #[tokio::test]
    async fn test_overview_for_missing_user_is_not_found() {
        let svc = service_with(Arc::new(MemoryStore::new()));
        assert!(matches!(
            svc.get_user_subscription(Uuid::new_v4()).await,
            Err(SubscriptionError::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_overview_upgrades() {
        let store = Arc::new(MemoryStore::new());
        let free = store.add_user("free@example.com");
        let basic = store.add_subscriber(PlanType::Basic, "active", -1, future());
        let pro = store.add_subscriber(PlanType::Pro, "active", -1, future());
        let svc = service_with(store);

        let overview = svc.get_user_subscription(free).await.unwrap();
        assert_eq!(overview.status, PlanType::Free);
        assert!(overview.subscription.is_none());
        assert_eq!(overview.available_upgrades.len(), 3);
        assert!(overview.can_upgrade);

        let overview = svc.get_user_subscription(basic).await.unwrap();
        assert_eq!(overview.available_upgrades, vec![PlanType::Pro]);
        assert!(overview.can_upgrade);
        assert_eq!(overview.credits_remaining, -1);

        let overview = svc.get_user_subscription(pro).await.unwrap();
        assert!(overview.available_upgrades.is_empty());
        assert!(!overview.can_upgrade);
        assert_eq!(overview.plan_label, "Pro Unlimited");
    }

    #[tokio::test]
    async fn test_expired_and_canceled_fall_back_to_free() {
        let store = Arc::new(MemoryStore::new());
        let expired = store.add_subscriber(
            PlanType::Pro,
            "active",
            -1,
            Some(Utc::now() - Duration::days(1)),
        );
        let canceled = store.add_subscriber(PlanType::Basic, "canceled", -1, future());
        let svc = service_with(store);

        assert_eq!(svc.effective_plan(expired).await.unwrap(), PlanType::Free);
        assert_eq!(svc.effective_plan(canceled).await.unwrap(), PlanType::Free);
        assert!(!svc.has_feature_access(expired, Feature::AtsScore).await.unwrap());
        assert_eq!(svc.remaining_credits(canceled).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_record_purchase_grants_credits() {
        let store = Arc::new(MemoryStore::new());
        let user = store.add_user("buyer@example.com");
        let svc = service_with(store);

        let row = svc
            .record_purchase(user, PlanType::OneTime, Duration::days(30))
            .await
            .unwrap();
        assert_eq!(row.ai_credits_remaining, ONE_TIME_CREDITS);
        assert!(row.current_period_end.is_none());

        let row = svc
            .record_purchase(user, PlanType::Pro, Duration::days(30))
            .await
            .unwrap();
        assert_eq!(row.ai_credits_remaining, UNLIMITED_CREDITS);
        assert!(row.current_period_end.is_some());
        assert_eq!(svc.effective_plan(user).await.unwrap(), PlanType::Pro);

        assert!(matches!(
            svc.record_purchase(user, PlanType::Free, Duration::days(30)).await,
            Err(SubscriptionError::InvalidPlan(_))
        ));
    }

    #[tokio::test]
    async fn test_plan_limits() {
        let store = Arc::new(MemoryStore::new());
        let boost = store.add_subscriber(PlanType::OneTime, "active", 1, None);
        let svc = service_with(store);

        let limits = svc.plan_limits(boost).await.unwrap();
        assert_eq!(limits.plan_type, PlanType::OneTime);
        assert_eq!(limits.ai_credits_remaining, 1);
        assert!(limits.has_premium_templates);
        assert!(!limits.has_ats_score);
    }

    #[tokio::test]
    async fn test_usage_stats_group_by_feature() {
        let store = Arc::new(MemoryStore::new());
        let user = store.add_user("u@example.com");
        let svc = service_with(store);

        svc.track_usage(user, Feature::AtsScore, None).await.unwrap();
        svc.track_usage(user, Feature::AtsScore, Some(json!({"score": 80})))
            .await
            .unwrap();
        svc.track_usage(user, Feature::AiPolish, None).await.unwrap();

        let stats = svc.usage_stats(user).await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_feature["ats_score"], 2);
        assert_eq!(stats.by_feature["ai_polish"], 1);
    }

    #[test]
    fn test_effective_plan_without_row_is_free() {
        assert_eq!(effective_plan(None, Utc::now()), PlanType::Free);
    }
}
