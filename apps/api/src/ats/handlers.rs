use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::ats::{build_ats_report, AtsReport};
use crate::errors::AppError;
use crate::resume::UniversalResumeData;
use crate::state::AppState;
use crate::subscription::guard::require_feature;
use crate::subscription::Feature;

#[derive(Deserialize)]
pub struct AtsReportRequest {
    pub user_id: Uuid,
    pub resume: UniversalResumeData,
    #[serde(default)]
    pub job_description: Option<String>,
}

/// POST /api/v1/ats/report
pub async fn handle_ats_report(
    State(state): State<AppState>,
    Json(req): Json<AtsReportRequest>,
) -> Result<Json<AtsReport>, AppError> {
    require_feature(&state.subscriptions, req.user_id, Feature::AtsScore).await?;

    let report = build_ats_report(&req.resume, req.job_description.as_deref());
    state
        .subscriptions
        .track_usage(
            req.user_id,
            Feature::AtsScore,
            Some(json!({ "global_score": report.global_score })),
        )
        .await?;

    Ok(Json(report))
}
