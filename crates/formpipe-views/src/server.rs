//! HTTP boundary.
//!
//! [`FormApp`] exposes `POST {api_prefix}/submit`. A successful submission
//! answers `200 {}`; failures answer with the error's status and a body of
//! the form:
//!
//! ```json
//! {"name": "invalid", "data": {"formErrors": [{"field": "name", "message": "..."}]}}
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use formpipe_views::repository::InMemoryFormRepository;
//! use formpipe_views::server::FormApp;
//! use formpipe_views::service::FormService;
//!
//! # async fn example() -> formpipe_core::FormResult<()> {
//! let service = FormService::new(Arc::new(InMemoryFormRepository::new()));
//! FormApp::new(Arc::new(service)).run("127.0.0.1:3000").await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Json;
use http::{HeaderMap, HeaderValue, StatusCode};
use serde_json::{json, Value};

use formpipe_core::{FormError, Settings};

use crate::context::{SubmissionContext, REQUEST_ID_HEADER};
use crate::service::FormService;

/// A [`FormError`] rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub FormError);

impl From<FormError> for ApiError {
    fn from(err: FormError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// Returns the JSON body for this error.
    ///
    /// Server-side failures do not expose their details.
    pub fn body(&self) -> Value {
        match &self.0 {
            FormError::Invalid(invalid) => json!({
                "name": self.0.name(),
                "data": invalid,
            }),
            err if err.status_code() < 500 => json!({
                "name": err.name(),
                "message": err.to_string(),
            }),
            err => json!({
                "name": err.name(),
                "message": "An error occurred.",
            }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "submission failed");
        }
        (status, Json(self.body())).into_response()
    }
}

async fn submit(
    State(service): State<Arc<FormService>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let ctx = SubmissionContext::from_headers(&headers);
    let result = match serde_json::from_slice::<Value>(&body) {
        Ok(input) => service.submit(&ctx, input).await,
        Err(err) => Err(FormError::BadRequest(format!("malformed JSON body: {err}"))),
    };

    let mut response = match result {
        Ok(()) => Json(json!({})).into_response(),
        Err(err) => ApiError(err).into_response(),
    };
    if let Ok(value) = HeaderValue::from_str(&ctx.request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// The HTTP application serving form submissions.
pub struct FormApp {
    service: Arc<FormService>,
    api_prefix: String,
    debug: bool,
}

impl FormApp {
    /// Creates an application with the default settings.
    pub fn new(service: Arc<FormService>) -> Self {
        Self::with_settings(service, &Settings::default())
    }

    /// Creates an application using the route prefix and debug flag from
    /// `settings`.
    pub fn with_settings(service: Arc<FormService>, settings: &Settings) -> Self {
        Self {
            service,
            api_prefix: settings.api_prefix.trim_end_matches('/').to_string(),
            debug: settings.debug,
        }
    }

    /// Returns the path of the submit route.
    pub fn submit_path(&self) -> String {
        format!("{}/submit", self.api_prefix)
    }

    /// Converts the application into an Axum router.
    pub fn into_axum_router(self) -> axum::Router {
        axum::Router::new()
            .route(&self.submit_path(), post(submit))
            .with_state(self.service)
    }

    /// Runs the application as an HTTP server on the given address.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the address or
    /// encounters a runtime error.
    pub async fn run(self, addr: &str) -> Result<(), FormError> {
        let debug = self.debug;
        let path = self.submit_path();
        let router = self.into_axum_router();
        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            FormError::ConfigurationError(format!("Failed to bind to {addr}: {e}"))
        })?;

        if debug {
            tracing::info!("Accepting submissions at http://{addr}{path}");
        }

        axum::serve(listener, router).await?;

        Ok(())
    }
}

impl std::fmt::Debug for FormApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormApp")
            .field("api_prefix", &self.api_prefix)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}
