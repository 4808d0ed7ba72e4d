//! Axum route handlers for the Resume API.

use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::resume::{resume_json_to_universal, universal_to_plain_text_cv, UniversalResumeData};

#[derive(Debug, Deserialize)]
pub struct NormalizeRequest {
    pub resume: Value,
}

#[derive(Debug, Deserialize)]
pub struct PlainTextRequest {
    pub resume: UniversalResumeData,
}

#[derive(Debug, Serialize)]
pub struct PlainTextResponse {
    pub text: String,
}

/// POST /api/v1/resumes/normalize
///
/// Maps raw AI resume JSON onto the Universal Resume schema.
pub async fn handle_normalize(
    Json(request): Json<NormalizeRequest>,
) -> Result<Json<UniversalResumeData>, AppError> {
    if !request.resume.is_object() {
        return Err(AppError::Validation(
            "resume must be a JSON object".to_string(),
        ));
    }
    Ok(Json(resume_json_to_universal(&request.resume)))
}

/// POST /api/v1/resumes/plain-text
pub async fn handle_plain_text(Json(request): Json<PlainTextRequest>) -> Json<PlainTextResponse> {
    Json(PlainTextResponse {
        text: universal_to_plain_text_cv(&request.resume),
    })
}
