//! HTTP surface of the contact API.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, Method};
use axum::routing::{get, post};
use axum::{Json, Router};
use folio_common::{validate_submission, ContactRecord, ValidationErrors};
use serde::Serialize;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::notify::Dispatcher;
use crate::store::ContactStore;

/// Hosted resume the descriptor points at unless configured otherwise.
pub const DEFAULT_RESUME_URL: &str =
    "https://drive.google.com/file/d/1x0lqHt_uCYITEKiU2uJnsaAqpc1SYtQp/view?usp=sharing";

/// Who may read the collected submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingAccess {
    /// Anyone who can reach the server.
    Open,
    /// Requests must carry `Authorization: Bearer <token>`.
    Token(String),
}

impl ListingAccess {
    fn authorize(&self, headers: &HeaderMap) -> ApiResult<()> {
        match self {
            ListingAccess::Open => Ok(()),
            ListingAccess::Token(expected) => {
                let presented = headers
                    .get(AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.strip_prefix("Bearer "))
                    .map(str::trim);
                match presented {
                    Some(token) if token == expected => Ok(()),
                    _ => Err(ApiError::Unauthorized),
                }
            }
        }
    }
}

pub struct AppState {
    pub store: Arc<dyn ContactStore>,
    pub dispatcher: Dispatcher,
    pub listing: ListingAccess,
    pub resume_url: String,
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(store: Arc<dyn ContactStore>, dispatcher: Dispatcher) -> Self {
        AppState {
            store,
            dispatcher,
            listing: ListingAccess::Open,
            resume_url: DEFAULT_RESUME_URL.to_string(),
            static_dir: None,
        }
    }

    pub fn with_listing(mut self, listing: ListingAccess) -> Self {
        self.listing = listing;
        self
    }

    pub fn with_resume_url(mut self, url: impl Into<String>) -> Self {
        self.resume_url = url.into();
        self
    }

    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }
}

// ─── API types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    pub contact: ContactRecord,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeResponse {
    pub success: bool,
    pub message: String,
    pub download_url: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub contacts: Option<usize>,
}

// ─── Handlers ───────────────────────────────────────────────────────────────

/// Validate, persist, notify, respond. Notification can never change the outcome.
async fn submit_contact(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<SubmitResponse>> {
    let submission = match payload {
        Ok(Json(value)) => validate_submission(&value)?,
        Err(
            rejection @ (JsonRejection::JsonSyntaxError(_) | JsonRejection::JsonDataError(_)),
        ) => return Err(ValidationErrors::malformed_body(rejection.body_text()).into()),
        Err(rejection) => {
            return Err(ApiError::Body {
                status: rejection.status(),
                message: rejection.body_text(),
            })
        }
    };

    let contact = state
        .store
        .create(submission.clone())
        .await
        .map_err(|e| {
            error!(error = %e, "failed to store contact submission");
            ApiError::Storage(e)
        })?;
    info!(id = %contact.id, "contact submission stored");

    let report = state.dispatcher.dispatch(&submission).await;
    if report.failed > 0 {
        warn!(
            id = %contact.id,
            delivered = report.delivered,
            failed = report.failed,
            "contact stored but some notifications failed"
        );
    }

    Ok(Json(SubmitResponse {
        success: true,
        message: "Message sent successfully!".to_string(),
        contact,
    }))
}

async fn list_contacts(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<ContactRecord>>> {
    state.listing.authorize(&headers)?;
    let contacts = state.store.list().await.map_err(|e| {
        error!(error = %e, "failed to list contacts");
        ApiError::Listing(e)
    })?;
    Ok(Json(contacts))
}

async fn resume(State(state): State<Arc<AppState>>) -> Json<ResumeResponse> {
    Json(ResumeResponse {
        success: true,
        message: "Resume is hosted externally".to_string(),
        download_url: state.resume_url.clone(),
    })
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        contacts: state.store.count().await.ok(),
    })
}

// ─── Router ─────────────────────────────────────────────────────────────────

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/api/contact", post(submit_contact))
        .route("/api/contacts", get(list_contacts))
        .route("/api/resume", get(resume))
        .route("/health", get(health));

    if let Some(dir) = &state.static_dir {
        let shell = ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")));
        app = app.fallback_service(shell);
    }

    app.layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
