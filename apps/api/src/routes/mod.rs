pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::ai_client::handlers as ai;
use crate::ats::handlers as ats;
use crate::resume::handlers as resume;
use crate::state::AppState;
use crate::subscription::handlers as subscription;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resume adapter
        .route("/api/v1/resumes/normalize", post(resume::handle_normalize))
        .route("/api/v1/resumes/plain-text", post(resume::handle_plain_text))
        // Subscription
        .route("/api/v1/subscription", get(subscription::handle_get_subscription))
        .route("/api/v1/subscription/limits", get(subscription::handle_get_limits))
        .route(
            "/api/v1/subscription/features/:feature",
            get(subscription::handle_feature_access),
        )
        .route(
            "/api/v1/subscription/credits/use",
            post(subscription::handle_use_credit),
        )
        .route("/api/v1/subscription/usage", get(subscription::handle_usage_stats))
        .route(
            "/api/v1/subscription/plan-action",
            post(subscription::handle_plan_action),
        )
        .route(
            "/api/v1/subscription/proration",
            post(subscription::handle_proration),
        )
        .route(
            "/api/v1/subscription/purchase",
            post(subscription::handle_purchase),
        )
        // ATS
        .route("/api/v1/ats/report", post(ats::handle_ats_report))
        // AI service
        .route("/api/v1/ai/import-text", post(ai::handle_import_text))
        .route("/api/v1/ai/import", post(ai::handle_import_pdf))
        .route("/api/v1/ai/polish", post(ai::handle_polish))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::ai_client::AiServiceClient;
    use crate::config::Config;
    use crate::subscription::memory::MemoryStore;
    use crate::subscription::{PlanType, SubscriptionService};

    fn test_app(store: Arc<MemoryStore>) -> Router {
        let config = Config {
            database_url: "postgres://unused".to_string(),
            // Nothing listens here; gated routes must fail before calling out.
            aiservice_base_url: "http://127.0.0.1:9".to_string(),
            port: 0,
            rust_log: "info".to_string(),
        };
        let state = AppState {
            subscriptions: SubscriptionService::new(store),
            ai: AiServiceClient::new(&config.aiservice_base_url).unwrap(),
            config,
        };
        build_router(state)
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(b) => builder
                .header("content-type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn month_ahead() -> Option<chrono::DateTime<Utc>> {
        Some(Utc::now() + Duration::days(30))
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(test_app(Arc::new(MemoryStore::new())), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "cvhelper-api");
    }

    #[tokio::test]
    async fn test_normalize_and_plain_text() {
        let store = Arc::new(MemoryStore::new());
        let payload = json!({
            "resume": {
                "header": { "fullName": "Ada Lovelace", "email": "ada@example.com" },
                "experience": [{ "company": "Engines", "title": "Analyst" }]
            }
        });
        let (status, universal) =
            send(test_app(store.clone()), "POST", "/api/v1/resumes/normalize", Some(payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(universal["personal"]["fullName"], "Ada Lovelace");
        assert_eq!(universal["experience"][0]["position"], "Analyst");

        let (status, body) = send(
            test_app(store),
            "POST",
            "/api/v1/resumes/plain-text",
            Some(json!({ "resume": universal })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let text = body["text"].as_str().unwrap();
        assert!(text.contains("Analyst at Engines"));
    }

    #[tokio::test]
    async fn test_normalize_rejects_non_object() {
        let (status, body) = send(
            test_app(Arc::new(MemoryStore::new())),
            "POST",
            "/api/v1/resumes/normalize",
            Some(json!({ "resume": [1, 2, 3] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_subscription_overview_not_found() {
        let uri = format!("/api/v1/subscription?user_id={}", Uuid::new_v4());
        let (status, body) = send(test_app(Arc::new(MemoryStore::new())), "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_feature_access_route() {
        let store = Arc::new(MemoryStore::new());
        let basic = store.add_subscriber(PlanType::Basic, "active", -1, month_ahead());

        let uri = format!("/api/v1/subscription/features/ats_score?user_id={basic}");
        let (status, body) = send(test_app(store.clone()), "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["has_access"], true);

        let uri = format!("/api/v1/subscription/features/teleport?user_id={basic}");
        let (status, _) = send(test_app(store), "GET", &uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_use_credit_route() {
        let store = Arc::new(MemoryStore::new());
        let boost = store.add_subscriber(PlanType::OneTime, "active", 1, None);
        let pro = store.add_subscriber(PlanType::Pro, "active", -1, month_ahead());

        let (status, body) = send(
            test_app(store.clone()),
            "POST",
            "/api/v1/subscription/credits/use",
            Some(json!({ "user_id": boost })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["used"], true);
        assert_eq!(body["credits_remaining"], 0);

        let (_, body) = send(
            test_app(store.clone()),
            "POST",
            "/api/v1/subscription/credits/use",
            Some(json!({ "user_id": boost })),
        )
        .await;
        assert_eq!(body["used"], false);

        let (status, _) = send(
            test_app(store),
            "POST",
            "/api/v1/subscription/credits/use",
            Some(json!({ "user_id": pro })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_plan_action_and_proration() {
        let store = Arc::new(MemoryStore::new());
        let basic = store.add_subscriber(PlanType::Basic, "active", -1, month_ahead());
        let free = store.add_user("free@example.com");

        let (status, body) = send(
            test_app(store.clone()),
            "POST",
            "/api/v1/subscription/plan-action",
            Some(json!({ "user_id": basic, "target_plan": "pro" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["action_type"], "upgrade");
        assert_eq!(body["requires_proration"], true);

        let (status, body) = send(
            test_app(store.clone()),
            "POST",
            "/api/v1/subscription/proration",
            Some(json!({ "user_id": basic, "target_plan": "pro" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["days_remaining"], 30);
        assert_eq!(body["prorated_amount"], 7.0);

        let (status, _) = send(
            test_app(store.clone()),
            "POST",
            "/api/v1/subscription/proration",
            Some(json!({ "user_id": free, "target_plan": "pro" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(
            test_app(store),
            "POST",
            "/api/v1/subscription/proration",
            Some(json!({ "user_id": basic, "target_plan": "one_time" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_purchase_activates_plan() {
        let store = Arc::new(MemoryStore::new());
        let user = store.add_user("buyer@example.com");

        let (status, body) = send(
            test_app(store.clone()),
            "POST",
            "/api/v1/subscription/purchase",
            Some(json!({ "user_id": user, "plan": "one_time" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "one_time");
        assert_eq!(body["credits_remaining"], 3);

        let (status, body) = send(
            test_app(store.clone()),
            "POST",
            "/api/v1/subscription/purchase",
            Some(json!({ "user_id": user, "plan": "pro", "period_days": 30 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "pro");
        assert_eq!(body["credits_remaining"], -1);
        assert_eq!(body["can_upgrade"], false);

        let (status, _) = send(
            test_app(store.clone()),
            "POST",
            "/api/v1/subscription/purchase",
            Some(json!({ "user_id": user, "plan": "free" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            test_app(store),
            "POST",
            "/api/v1/subscription/purchase",
            Some(json!({ "user_id": Uuid::new_v4(), "plan": "basic" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_plan_action_offers_reactivation() {
        let store = Arc::new(MemoryStore::new());
        let basic = store.add_subscriber(PlanType::Basic, "active", -1, month_ahead());
        let request = json!({ "user_id": basic, "target_plan": "basic" });

        let (_, body) = send(
            test_app(store.clone()),
            "POST",
            "/api/v1/subscription/plan-action",
            Some(request.clone()),
        )
        .await;
        assert_eq!(body["allowed"], false);
        assert_eq!(body["label"], "Current Plan");

        store.set_cancel_at_period_end(basic, true);
        let (status, body) = send(
            test_app(store),
            "POST",
            "/api/v1/subscription/plan-action",
            Some(request),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["allowed"], true);
        assert_eq!(body["action_type"], "current");
        assert_eq!(body["label"], "Reactivate");
    }

    #[tokio::test]
    async fn test_ats_report_is_gated() {
        let store = Arc::new(MemoryStore::new());
        let free = store.add_user("free@example.com");
        let pro = store.add_subscriber(PlanType::Pro, "active", -1, month_ahead());
        let resume = json!({ "skills": ["Rust"] });

        let (status, body) = send(
            test_app(store.clone()),
            "POST",
            "/api/v1/ats/report",
            Some(json!({ "user_id": free, "resume": resume })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["message"], "ATS scoring requires a paid plan");

        let (status, body) = send(
            test_app(store.clone()),
            "POST",
            "/api/v1/ats/report",
            Some(json!({ "user_id": pro, "resume": resume, "job_description": "Rust" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sections"]["essential_sections"]["score"], 30);
        assert_eq!(store.usage_count(), 1);
    }

    #[tokio::test]
    async fn test_ai_routes_reject_before_calling_service() {
        let store = Arc::new(MemoryStore::new());
        let free = store.add_user("free@example.com");
        let drained = store.add_subscriber(PlanType::OneTime, "active", 0, None);

        let (status, _) = send(
            test_app(store.clone()),
            "POST",
            "/api/v1/ai/polish",
            Some(json!({ "user_id": free, "resume": {}, "jd_text": "Rust engineer" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            test_app(store.clone()),
            "POST",
            "/api/v1/ai/import-text",
            Some(json!({ "user_id": drained, "cv_text": "Jane Doe, engineer" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["message"], "No AI credits remaining");

        let (status, _) = send(
            test_app(store),
            "POST",
            "/api/v1/ai/import-text",
            Some(json!({ "user_id": drained, "cv_text": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
