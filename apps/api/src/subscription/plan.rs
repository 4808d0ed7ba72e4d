//! Plan tiers, gated features and the feature matrix.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::subscription::SubscriptionError;

/// Subscription tiers, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    Free,
    OneTime,
    Basic,
    Pro,
}

impl PlanType {
    pub const ALL: [PlanType; 4] = [
        PlanType::Free,
        PlanType::OneTime,
        PlanType::Basic,
        PlanType::Pro,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PlanType::Free => "free",
            PlanType::OneTime => "one_time",
            PlanType::Basic => "basic",
            PlanType::Pro => "pro",
        }
    }

    /// Product name shown to users.
    pub fn label(self) -> &'static str {
        match self {
            PlanType::Free => "Free Plan",
            PlanType::OneTime => "Quick Boost",
            PlanType::Basic => "Basic Monthly",
            PlanType::Pro => "Pro Unlimited",
        }
    }

    /// Plans strictly above this one, lowest first.
    pub fn available_upgrades(self) -> Vec<PlanType> {
        PlanType::ALL.into_iter().filter(|p| *p > self).collect()
    }

    /// Monthly price in euros for recurring plans.
    pub fn monthly_price(self) -> Option<f64> {
        match self {
            PlanType::Basic => Some(8.99),
            PlanType::Pro => Some(15.99),
            PlanType::Free | PlanType::OneTime => None,
        }
    }

    pub fn is_recurring(self) -> bool {
        matches!(self, PlanType::Basic | PlanType::Pro)
    }

    pub fn has_unlimited_ai(self) -> bool {
        self.is_recurring()
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanType {
    type Err = SubscriptionError;

    /// Accepts `one_time`, `one-time` and `ONE_TIME` spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "free" => Ok(PlanType::Free),
            "one_time" => Ok(PlanType::OneTime),
            "basic" => Ok(PlanType::Basic),
            "pro" => Ok(PlanType::Pro),
            _ => Err(SubscriptionError::InvalidPlan(s.to_string())),
        }
    }
}

/// Capabilities gated by plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    AiPolish,
    AiCoverLetter,
    AtsScore,
    AllTemplates,
    UnlimitedResumes,
}

impl Feature {
    pub const ALL: [Feature; 5] = [
        Feature::AiPolish,
        Feature::AiCoverLetter,
        Feature::AtsScore,
        Feature::AllTemplates,
        Feature::UnlimitedResumes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Feature::AiPolish => "ai_polish",
            Feature::AiCoverLetter => "ai_cover_letter",
            Feature::AtsScore => "ats_score",
            Feature::AllTemplates => "all_templates",
            Feature::UnlimitedResumes => "unlimited_resumes",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = SubscriptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| SubscriptionError::UnknownFeature(s.to_string()))
    }
}

/// Outcome of the feature matrix before credits are consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Deny,
    Allow,
    /// Allowed only while the AI credit balance is positive.
    CreditGated,
}

/// The plan × feature matrix.
pub fn feature_access(plan: PlanType, feature: Feature) -> Access {
    use Feature::*;
    use PlanType::*;

    match (plan, feature) {
        (Free, _) => Access::Deny,
        (OneTime, AiPolish) => Access::CreditGated,
        (OneTime, AllTemplates) => Access::Allow,
        (OneTime, _) => Access::Deny,
        (Basic, UnlimitedResumes) => Access::Deny,
        (Basic, _) => Access::Allow,
        (Pro, _) => Access::Allow,
    }
}

/// Per-plan limits surfaced to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanLimits {
    pub plan_type: PlanType,
    pub plan_name: String,
    /// `-1` means unlimited.
    pub max_resumes: i32,
    pub has_ai_access: bool,
    pub has_unlimited_ai: bool,
    /// `-1` means unlimited.
    pub ai_credits_remaining: i32,
    pub has_premium_templates: bool,
    pub has_ai_cover_letter: bool,
    pub has_ats_score: bool,
}

impl PlanLimits {
    pub fn for_plan(plan: PlanType, credits_remaining: i32) -> Self {
        let allowed = |feature| feature_access(plan, feature) != Access::Deny;
        let max_resumes = match plan {
            PlanType::Free | PlanType::OneTime => 1,
            PlanType::Basic => 5,
            PlanType::Pro => -1,
        };

        PlanLimits {
            plan_type: plan,
            plan_name: plan.label().to_string(),
            max_resumes,
            has_ai_access: allowed(Feature::AiPolish),
            has_unlimited_ai: plan.has_unlimited_ai(),
            ai_credits_remaining: credits_remaining,
            has_premium_templates: allowed(Feature::AllTemplates),
            has_ai_cover_letter: allowed(Feature::AiCoverLetter),
            has_ats_score: allowed(Feature::AtsScore),
        }
    }
}
