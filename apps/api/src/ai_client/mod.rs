/// AI service client: the only module that talks to the résumé-parsing service.
///
/// Both calls go to `POST {base_url}/adapt` as multipart forms. The service
/// either parses raw CV text into structured JSON (`only_clean`) or tailors an
/// already-structured CV to a job description (`arb_only`).
use std::time::Duration;

use reqwest::{multipart::Form, Client};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod handlers;

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum AiServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected AI service response: {0}")]
    InvalidResponse(String),
}

#[derive(Clone)]
pub struct AiServiceClient {
    client: Client,
    adapt_url: String,
}

impl AiServiceClient {
    pub fn new(base_url: &str) -> Result<Self, AiServiceError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            adapt_url: format!("{}/adapt", base_url.trim_end_matches('/')),
        })
    }

    pub fn adapt_url(&self) -> &str {
        &self.adapt_url
    }

    /// Parses raw CV text into the service's structured résumé JSON.
    pub async fn parse_cv(&self, cv_text: &str) -> Result<Value, AiServiceError> {
        let fields = vec![
            ("cv_text", cv_text.to_string()),
            ("only_clean", "true".to_string()),
        ];
        let response = self.post_form(&fields).await?;
        unwrap_resume(response)
    }

    /// Tailors a structured CV to a job description.
    pub async fn arbitrate(
        &self,
        clean_cv: &Value,
        jd_text: &str,
        cv_text: Option<&str>,
    ) -> Result<Value, AiServiceError> {
        let mut fields = vec![
            ("jd_text", jd_text.to_string()),
            ("clean_cv_json", clean_cv.to_string()),
            ("arb_only", "true".to_string()),
        ];
        if let Some(text) = cv_text {
            fields.push(("cv_text", text.to_string()));
        }

        let response = self.post_form(&fields).await?;
        if response.get("result").is_none() {
            return Err(AiServiceError::InvalidResponse(
                "arbitration response has no `result`".to_string(),
            ));
        }
        Ok(response)
    }

    /// Posts a multipart form to `/adapt`.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    async fn post_form(&self, fields: &[(&'static str, String)]) -> Result<Value, AiServiceError> {
        let mut last_error: Option<AiServiceError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "AI service attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            // Forms are consumed by `send`, so each attempt builds its own.
            let form = fields
                .iter()
                .fold(Form::new(), |form, (name, value)| form.text(*name, value.clone()));

            let response = match self
                .client
                .post(&self.adapt_url)
                .multipart(form)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(AiServiceError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if is_retryable(status.as_u16()) {
                let body = response.text().await.unwrap_or_default();
                warn!("AI service returned {}: {}", status, body);
                last_error = Some(AiServiceError::Status {
                    status: status.as_u16(),
                    body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(AiServiceError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            let body: Value = response.json().await?;
            debug!("AI service call succeeded on attempt {}", attempt + 1);
            return Ok(body);
        }

        Err(last_error.unwrap_or(AiServiceError::Status {
            status: 429,
            body: format!("gave up after {MAX_RETRIES} attempts"),
        }))
    }
}

fn is_retryable(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// The parse endpoint answers `{clean_cv, raw_cv?}`; older deployments used
/// `resume` or `data`. A bare résumé object is returned as-is.
fn unwrap_resume(mut response: Value) -> Result<Value, AiServiceError> {
    for key in ["clean_cv", "resume", "data"] {
        if let Some(inner) = response.get_mut(key).filter(|v| v.is_object()) {
            return Ok(inner.take());
        }
    }
    if response.is_object() {
        Ok(response)
    } else {
        Err(AiServiceError::InvalidResponse(
            "expected a JSON object".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_resume_prefers_clean_cv() {
        let response = json!({
            "clean_cv": { "header": { "fullName": "Ada" } },
            "raw_cv": { "ignored": true }
        });
        let resume = unwrap_resume(response).unwrap();
        assert_eq!(resume["header"]["fullName"], "Ada");
    }

    #[test]
    fn test_unwrap_resume_legacy_keys() {
        let resume = unwrap_resume(json!({ "data": { "summary": "x" } })).unwrap();
        assert_eq!(resume["summary"], "x");
    }

    #[test]
    fn test_unwrap_resume_bare_object() {
        let resume = unwrap_resume(json!({ "header": {} })).unwrap();
        assert!(resume.get("header").is_some());
    }

    #[test]
    fn test_unwrap_resume_rejects_non_object() {
        assert!(matches!(
            unwrap_resume(json!([1, 2])),
            Err(AiServiceError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable(429));
        assert!(is_retryable(503));
        assert!(!is_retryable(400));
        assert!(!is_retryable(200));
    }

    #[test]
    fn test_adapt_url_joins_without_double_slash() {
        let client = AiServiceClient::new("http://localhost:3000/api/").unwrap();
        assert_eq!(client.adapt_url(), "http://localhost:3000/api/adapt");
    }
}
