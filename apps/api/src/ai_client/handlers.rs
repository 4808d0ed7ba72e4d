//! AI-backed résumé import and polish.
//!
//! Every route here is gated on `ai_polish`. Quick Boost users spend one
//! credit before the AI service is called.

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::resume::{resume_json_to_universal, universal_to_plain_text_cv, UniversalResumeData};
use crate::state::AppState;
use crate::subscription::guard::require_feature;
use crate::subscription::{Feature, PlanType};

#[derive(Deserialize)]
pub struct ImportTextRequest {
    pub user_id: Uuid,
    pub cv_text: String,
}

#[derive(Serialize)]
pub struct ImportResponse {
    pub resume: UniversalResumeData,
    pub credits_remaining: i32,
}

#[derive(Deserialize)]
pub struct PolishRequest {
    pub user_id: Uuid,
    pub resume: UniversalResumeData,
    pub jd_text: String,
}

#[derive(Serialize)]
pub struct PolishResponse {
    pub result: Value,
    pub report: Value,
    pub credits_remaining: i32,
}

/// POST /api/v1/ai/import-text
pub async fn handle_import_text(
    State(state): State<AppState>,
    Json(req): Json<ImportTextRequest>,
) -> Result<Json<ImportResponse>, AppError> {
    if req.cv_text.trim().is_empty() {
        return Err(AppError::Validation("cv_text must not be empty".to_string()));
    }
    import_cv(&state, req.user_id, &req.cv_text).await.map(Json)
}

/// POST /api/v1/ai/import
/// Multipart form with a `user_id` text field and a PDF `file`.
pub async fn handle_import_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportResponse>, AppError> {
    let mut user_id: Option<Uuid> = None;
    let mut file: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("user_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid user_id field: {e}")))?;
                let id = text
                    .trim()
                    .parse::<Uuid>()
                    .map_err(|_| AppError::Validation(format!("Invalid user_id: {text}")))?;
                user_id = Some(id);
            }
            Some("file") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid file field: {e}")))?;
                file = Some(data);
            }
            _ => {}
        }
    }

    let user_id = user_id.ok_or_else(|| AppError::Validation("user_id is required".to_string()))?;
    let file = file.ok_or_else(|| AppError::Validation("file is required".to_string()))?;

    let cv_text = extract_pdf_text(file).await?;
    if cv_text.trim().is_empty() {
        return Err(AppError::UnprocessableEntity(
            "No text could be extracted from the PDF".to_string(),
        ));
    }

    import_cv(&state, user_id, &cv_text).await.map(Json)
}

/// POST /api/v1/ai/polish
pub async fn handle_polish(
    State(state): State<AppState>,
    Json(req): Json<PolishRequest>,
) -> Result<Json<PolishResponse>, AppError> {
    if req.jd_text.trim().is_empty() {
        return Err(AppError::Validation("jd_text must not be empty".to_string()));
    }

    let plan = require_feature(&state.subscriptions, req.user_id, Feature::AiPolish).await?;

    let clean_cv = serde_json::to_value(&req.resume)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("serializing resume: {e}")))?;
    let cv_text = universal_to_plain_text_cv(&req.resume);

    let mut response = state
        .ai
        .arbitrate(&clean_cv, &req.jd_text, Some(&cv_text))
        .await?;
    info!("Polished resume for user {}", req.user_id);

    if plan != PlanType::OneTime {
        state
            .subscriptions
            .track_usage(req.user_id, Feature::AiPolish, Some(json!({ "action": "polish" })))
            .await?;
    }

    let credits_remaining = state.subscriptions.remaining_credits(req.user_id).await?;
    Ok(Json(PolishResponse {
        result: take_field(&mut response, "result"),
        report: take_field(&mut response, "report"),
        credits_remaining,
    }))
}

async fn import_cv(state: &AppState, user_id: Uuid, cv_text: &str) -> Result<ImportResponse, AppError> {
    let plan = require_feature(&state.subscriptions, user_id, Feature::AiPolish).await?;

    let ai_resume = state.ai.parse_cv(cv_text).await?;
    let resume = resume_json_to_universal(&ai_resume);
    info!(
        "Imported resume for user {} ({} experience entries)",
        user_id,
        resume.experience.len()
    );

    // Quick Boost usage was recorded with the credit it spent.
    if plan != PlanType::OneTime {
        state
            .subscriptions
            .track_usage(user_id, Feature::AiPolish, Some(json!({ "action": "import" })))
            .await?;
    }

    let credits_remaining = state.subscriptions.remaining_credits(user_id).await?;
    Ok(ImportResponse {
        resume,
        credits_remaining,
    })
}

fn take_field(response: &mut Value, key: &str) -> Value {
    response.get_mut(key).map(Value::take).unwrap_or(Value::Null)
}

/// PDF parsing is CPU-bound, so it runs on the blocking pool.
async fn extract_pdf_text(file: Bytes) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&file))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in PDF extraction: {e}")))?
        .map_err(|e| AppError::UnprocessableEntity(format!("Could not read PDF: {e}")))
}
