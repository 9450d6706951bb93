//! REST endpoints for the page flow.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::error;

use super::page::PageOutcome;
use super::service::{FlowService, InterviewView, LandingView, SignupView, ThankYouView};
use super::steps::{self, StepView};
use super::ws::ws_handler;
use crate::error::Error;
use crate::events::Toast;
use crate::interview::session::{InterviewSnapshot, SendOutcome};
use crate::session::SignupForm;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub flow: Arc<FlowService>,
}

/// Build the router for every page, the event socket and the 404 fallback.
pub fn flow_routes(flow: Arc<FlowService>) -> Router {
    let state = AppState { flow };

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .route("/api/progress/{step}", get(progress))
        .route("/api/landing", get(landing))
        .route("/api/signup", get(signup_options).post(submit_signup))
        .route("/api/interview", get(enter_interview).delete(leave_interview))
        .route("/api/interview/state", get(interview_state))
        .route("/api/interview/messages", post(send_message))
        .route("/api/interview/voice", post(toggle_voice))
        .route("/api/interview/submit", post(finish))
        .route("/api/thank-you", get(enter_thank_you))
        .route("/api/thank-you/home", post(back_to_home))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Validation(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": e.to_string(), "toast": Toast::from(e) })),
            )
                .into_response(),
            Error::Flow(e) => (
                StatusCode::CONFLICT,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response(),
            _ => {
                error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": self.to_string() })),
                )
                    .into_response()
            }
        }
    }
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "mock-interview"
    }))
}

async fn progress(Path(step): Path<u8>) -> Json<Vec<StepView>> {
    Json(steps::progress(step))
}

// ── Pages ───────────────────────────────────────────────────────────────

async fn landing(State(state): State<AppState>) -> Json<PageOutcome<LandingView>> {
    Json(PageOutcome::render(state.flow.landing().await))
}

async fn signup_options(State(state): State<AppState>) -> Json<PageOutcome<SignupView>> {
    Json(PageOutcome::render(state.flow.signup_options().await))
}

/// POST /api/signup
///
/// Responds with a redirect to the interview once the profile is stored.
async fn submit_signup(
    State(state): State<AppState>,
    Json(form): Json<SignupForm>,
) -> Result<Json<PageOutcome<()>>, Error> {
    let next = state.flow.submit_signup(form).await?;
    Ok(Json(PageOutcome::redirect(next)))
}

async fn enter_interview(
    State(state): State<AppState>,
) -> Result<Json<PageOutcome<InterviewView>>, Error> {
    Ok(Json(state.flow.enter_interview().await?))
}

async fn leave_interview(State(state): State<AppState>) -> impl IntoResponse {
    let left = state.flow.leave_interview().await;
    Json(json!({ "left": left }))
}

async fn interview_state(State(state): State<AppState>) -> Result<Json<InterviewSnapshot>, Error> {
    Ok(Json(state.flow.interview_state().await?))
}

#[derive(Debug, Deserialize)]
struct SendRequest {
    text: String,
}

/// POST /api/interview/messages
///
/// Blank text is accepted and ignored. The reply arrives over `/ws`.
async fn send_message(
    State(state): State<AppState>,
    Json(body): Json<SendRequest>,
) -> Result<(StatusCode, Json<SendOutcome>), Error> {
    let outcome = state.flow.send_message(&body.text).await?;
    let status = match outcome {
        SendOutcome::Sent(_) => StatusCode::ACCEPTED,
        SendOutcome::Ignored => StatusCode::OK,
    };
    Ok((status, Json(outcome)))
}

async fn toggle_voice(State(state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let listening = state.flow.toggle_voice().await?;
    Ok(Json(json!({ "listening": listening })))
}

async fn finish(State(state): State<AppState>) -> Result<impl IntoResponse, Error> {
    state.flow.finish().await?;
    Ok((StatusCode::ACCEPTED, Json(json!({ "phase": "submitting" }))))
}

async fn enter_thank_you(
    State(state): State<AppState>,
) -> Result<Json<PageOutcome<ThankYouView>>, Error> {
    Ok(Json(state.flow.enter_thank_you().await?))
}

async fn back_to_home(State(state): State<AppState>) -> Result<Json<PageOutcome<()>>, Error> {
    let next = state.flow.back_to_home().await?;
    Ok(Json(PageOutcome::redirect(next)))
}

async fn not_found(State(state): State<AppState>, uri: Uri) -> impl IntoResponse {
    let view = state.flow.not_found(uri.path()).await;
    (
        StatusCode::NOT_FOUND,
        Json(PageOutcome::render(view)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::FlowConfig;
    use crate::events::EventBus;
    use crate::interview::report::LoggingReportSink;
    use crate::interview::responder::CannedResponder;
    use crate::interview::session::InterviewDeps;
    use crate::error::DatabaseError;
    use crate::session::SessionStore;
    use crate::store::{KeyValueStore, MemoryStore};

    /// Backend whose every call fails, like a locked or corrupt database.
    struct BrokenStore;

    #[async_trait::async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _scope: &str, _key: &str) -> Result<Option<String>, DatabaseError> {
            Err(DatabaseError::Query("disk I/O error".into()))
        }

        async fn set(&self, _scope: &str, _key: &str, _value: &str) -> Result<(), DatabaseError> {
            Err(DatabaseError::Query("disk I/O error".into()))
        }

        async fn remove(&self, _scope: &str, _key: &str) -> Result<bool, DatabaseError> {
            Err(DatabaseError::Query("disk I/O error".into()))
        }
    }

    fn app_with(backend: Arc<dyn KeyValueStore>) -> Router {
        let flow = FlowService::new(InterviewDeps {
            responder: Arc::new(CannedResponder::with_seed(3)),
            reports: Arc::new(LoggingReportSink),
            session: SessionStore::new(backend, "tab"),
            events: EventBus::new(),
            config: FlowConfig::immediate(),
        });
        flow_routes(Arc::new(flow))
    }

    fn app() -> Router {
        app_with(Arc::new(MemoryStore::new()))
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                req = req.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn alice() -> Value {
        json!({
            "fullName": "Alice",
            "email": "a@x.com",
            "year": "3rd",
            "domains": ["web"],
            "position": "software-engineer"
        })
    }

    #[tokio::test]
    async fn health_ok() {
        let (status, body) = call(&app(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn progress_renders_tracker() {
        let (status, body) = call(&app(), Method::GET, "/api/progress/2", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["status"], "completed");
        assert_eq!(body[1]["status"], "active");
        assert_eq!(body[3]["status"], "upcoming");
        assert!(body[3].get("connectorFilled").is_none());
    }

    #[tokio::test]
    async fn storage_failure_is_internal_error() {
        let app = app_with(Arc::new(BrokenStore));
        for uri in ["/api/interview", "/api/thank-you"] {
            let (status, body) = call(&app, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
            assert!(body["error"].is_string(), "{uri}: {body}");
            assert!(body.get("outcome").is_none());
        }
    }

    #[tokio::test]
    async fn interview_without_profile_redirects() {
        let (status, body) = call(&app(), Method::GET, "/api/interview", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "redirect");
        assert_eq!(body["to"], "/signup");
    }

    #[tokio::test]
    async fn invalid_signup_is_unprocessable_with_toast() {
        let app = app();
        let (status, body) = call(&app, Method::POST, "/api/signup", Some(json!({ "fullName": "Alice" }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["toast"]["title"], "Missing Information");
        assert_eq!(body["toast"]["severity"], "destructive");

        let mut bad_email = alice();
        bad_email["email"] = json!("not-an-email");
        let (status, body) = call(&app, Method::POST, "/api/signup", Some(bad_email)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["toast"]["title"], "Invalid Email");
    }

    #[tokio::test]
    async fn signup_then_interview_flow() {
        let app = app();
        let (status, body) = call(&app, Method::POST, "/api/signup", Some(alice())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["to"], "/interview");

        let (_, body) = call(&app, Method::GET, "/api/interview", None).await;
        assert_eq!(body["outcome"], "render");
        let welcome = body["view"]["messages"][0]["content"].as_str().unwrap();
        assert!(welcome.contains("Alice"));
        assert_eq!(body["view"]["messages"][0]["role"], "assistant");

        let (status, body) = call(&app, Method::POST, "/api/interview/messages", Some(json!({ "text": "  " }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ignored");

        let (status, body) = call(&app, Method::POST, "/api/interview/voice", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["listening"], true);

        let (status, body) = call(&app, Method::POST, "/api/interview/submit", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["toast"]["title"], "Interview Too Short");
    }

    #[tokio::test]
    async fn actions_without_interview_conflict() {
        let app = app();
        for (method, uri) in [
            (Method::GET, "/api/interview/state"),
            (Method::POST, "/api/interview/voice"),
            (Method::POST, "/api/interview/submit"),
        ] {
            let (status, _) = call(&app, method, uri, None).await;
            assert_eq!(status, StatusCode::CONFLICT, "{uri}");
        }
        let (status, _) = call(&app, Method::POST, "/api/interview/messages", Some(json!({ "text": "hi" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = call(&app, Method::DELETE, "/api/interview", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["left"], false);
    }

    #[tokio::test]
    async fn thank_you_and_home_redirect_to_landing() {
        let app = app();
        let (_, body) = call(&app, Method::GET, "/api/thank-you", None).await;
        assert_eq!(body["to"], "/");
        let (status, body) = call(&app, Method::POST, "/api/thank-you/home", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "redirect");
        assert_eq!(body["to"], "/");
    }

    #[tokio::test]
    async fn unknown_route_is_not_found_view() {
        let (status, body) = call(&app(), Method::GET, "/definitely/not/here", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["view"]["path"], "/definitely/not/here");
        assert_eq!(body["view"]["title"], "Page Not Found");
    }
}
