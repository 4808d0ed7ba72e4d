use uuid::Uuid;

use crate::errors::AppError;
use crate::subscription::plan::{feature_access, Access, Feature, PlanType};
use crate::subscription::SubscriptionService;

/// Rejects the request with `403` unless the user may use `feature`.
///
/// Credit-gated features spend one credit here, before the caller does any
/// work, so a failed AI call still costs the credit. Returns the effective plan.
pub async fn require_feature(
    service: &SubscriptionService,
    user_id: Uuid,
    feature: Feature,
) -> Result<PlanType, AppError> {
    let plan = service.effective_plan(user_id).await?;

    if !service.has_feature_access(user_id, feature).await? {
        return Err(AppError::Forbidden(denial_reason(plan, feature)));
    }

    if feature_access(plan, feature) == Access::CreditGated
        && !service.use_ai_credit(user_id).await?
    {
        // Lost a race with a concurrent request for the last credit.
        return Err(AppError::Forbidden("No AI credits remaining".to_string()));
    }

    Ok(plan)
}

fn denial_reason(plan: PlanType, feature: Feature) -> String {
    match feature_access(plan, feature) {
        Access::CreditGated => "No AI credits remaining".to_string(),
        _ => format!("{} requires a paid plan", feature_name(feature)),
    }
}

fn feature_name(feature: Feature) -> &'static str {
    match feature {
        Feature::AiPolish => "AI Polish",
        Feature::AiCoverLetter => "AI cover letters",
        Feature::AtsScore => "ATS scoring",
        Feature::AllTemplates => "Premium templates",
        Feature::UnlimitedResumes => "Unlimited resumes",
    }
}
