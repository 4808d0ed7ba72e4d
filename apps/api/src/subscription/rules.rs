//! Plan transition rules: what a user may buy next, and what it costs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::subscription::plan::PlanType;

const BILLING_DAYS: f64 = 30.0;

pub fn is_upgrade(current: PlanType, target: PlanType) -> bool {
    target > current
}

pub fn is_downgrade(current: PlanType, target: PlanType) -> bool {
    target < current
}

/// Free users may buy anything; paid users may only move up, and the one-time
/// boost cannot be bought twice.
pub fn can_purchase_plan(current: PlanType, target: PlanType) -> bool {
    match current {
        PlanType::Free => true,
        PlanType::Pro => false,
        PlanType::OneTime | PlanType::Basic => is_upgrade(current, target),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Purchase,
    Upgrade,
    Downgrade,
    Current,
    Included,
    Blocked,
}

/// What the pricing page should offer for `target` given the user's plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanAction {
    pub allowed: bool,
    pub action_type: ActionType,
    pub requires_proration: bool,
    pub label: String,
    pub reason: Option<String>,
}

impl PlanAction {
    fn new(allowed: bool, action_type: ActionType, label: impl Into<String>) -> Self {
        Self {
            allowed,
            action_type,
            requires_proration: false,
            label: label.into(),
            reason: None,
        }
    }

    fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

pub fn plan_action(current: PlanType, target: PlanType, cancel_at_period_end: bool) -> PlanAction {
    if current == target && current != PlanType::Free {
        return if cancel_at_period_end {
            PlanAction::new(true, ActionType::Current, "Reactivate")
        } else {
            PlanAction::new(false, ActionType::Current, "Current Plan")
                .with_reason("This is your current plan")
        };
    }

    if target == PlanType::OneTime && current.is_recurring() {
        return PlanAction::new(false, ActionType::Included, "Included")
            .with_reason("Quick Boost features are included in your current plan");
    }

    // Pro → Basic is the only downgrade offered, effective at period end.
    if target.is_recurring() && is_downgrade(current, target) {
        return PlanAction::new(true, ActionType::Downgrade, "Switch to Basic");
    }

    if !can_purchase_plan(current, target) {
        return PlanAction::new(false, ActionType::Blocked, "Not Available")
            .with_reason("Cannot downgrade or purchase lower tier");
    }

    match current {
        PlanType::Free => {
            let label = match target {
                PlanType::Free => "Get Started",
                PlanType::OneTime => "Buy Now",
                PlanType::Basic => "Start Basic Plan",
                PlanType::Pro => "Start Pro Plan",
            };
            PlanAction::new(true, ActionType::Purchase, label)
        }
        PlanType::Basic => PlanAction {
            requires_proration: true,
            ..PlanAction::new(true, ActionType::Upgrade, "Upgrade to Pro")
        },
        _ => PlanAction::new(
            true,
            ActionType::Upgrade,
            format!("Upgrade to {}", target.label()),
        ),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proration {
    pub current_price: f64,
    pub target_price: f64,
    pub days_remaining: i64,
    /// Charged today. Never negative.
    pub prorated_amount: f64,
    pub daily_difference: f64,
    pub next_billing_amount: f64,
}

/// Prorates the price difference over a 30-day billing month, rounded to cents.
pub fn calculate_proration(current_price: f64, new_price: f64, days_remaining: i64) -> Proration {
    let daily_difference = (new_price - current_price) / BILLING_DAYS;
    let prorated = daily_difference * days_remaining as f64;

    Proration {
        current_price,
        target_price: new_price,
        days_remaining,
        prorated_amount: round_cents(prorated).max(0.0),
        daily_difference: round_cents(daily_difference),
        next_billing_amount: new_price,
    }
}

/// Whole days left until `period_end`, rounded up. Zero once the period is over.
pub fn days_remaining(period_end: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    const SECS_PER_DAY: i64 = 86_400;
    let secs = (period_end - now).num_seconds();
    if secs <= 0 {
        return 0;
    }
    (secs + SECS_PER_DAY - 1) / SECS_PER_DAY
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
