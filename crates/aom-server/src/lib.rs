//! Aom Web Server
//!
//! Axum server for the Aom expense ledger:
//! - Messaging webhook (`POST /webhook`) authenticated by body signature
//! - JSON API under `/api` for the web front end, authenticated by API key
//!   (secure by default, use --no-auth for local dev)
//! - Restrictive CORS policy and sanitized error responses

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use aom_core::config::{API_KEYS_ENV, CHANNEL_SECRET_ENV, CHANNEL_TOKEN_ENV};
use aom_core::ChatEngine;

mod handlers;
pub mod line;

use line::{LineClient, LogOnlyClient, MessagingClient};

/// Maximum pagination limit
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Authorization header for API key auth
const AUTHORIZATION_HEADER: &str = "authorization";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether the JSON API requires an API key (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// API keys accepted as "Bearer <key>" in the Authorization header
    pub api_keys: Vec<String>,
    /// Channel secret used to verify webhook signatures; unset skips verification
    pub channel_secret: Option<String>,
    /// Channel access token for outbound calls; unset logs replies instead
    pub channel_access_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            api_keys: vec![],
            channel_secret: None,
            channel_access_token: None,
        }
    }
}

impl ServerConfig {
    /// Fill API keys and channel credentials from the environment
    pub fn with_env_secrets(mut self) -> Self {
        self.api_keys = std::env::var(API_KEYS_ENV)
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        self.channel_secret = std::env::var(CHANNEL_SECRET_ENV)
            .ok()
            .filter(|s| !s.is_empty());
        self.channel_access_token = std::env::var(CHANNEL_TOKEN_ENV)
            .ok()
            .filter(|s| !s.is_empty());
        self
    }
}

/// Shared application state
pub struct AppState {
    pub engine: ChatEngine,
    pub config: ServerConfig,
    pub messenger: Arc<dyn MessagingClient>,
}

/// Authentication middleware for the JSON API
///
/// API keys are compared in constant time. The webhook is not behind this
/// layer; it authenticates with its body signature instead.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.require_auth {
        return next.run(request).await;
    }

    let api_key_valid = request
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|key| validate_api_key(key, &state.config.api_keys))
        .unwrap_or(false);

    if api_key_valid {
        info!(user = "api-key", path = %request.uri().path(), "Authenticated via API key");
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "Unauthorized request - no valid auth");
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "Authentication required"
        })),
    )
        .into_response()
}

/// Validate an API key against the configured keys using constant-time comparison
fn validate_api_key(provided: &str, valid_keys: &[String]) -> bool {
    use subtle::ConstantTimeEq;

    let provided_bytes = provided.as_bytes();

    valid_keys.iter().any(|key| {
        let key_bytes = key.as_bytes();
        provided_bytes.len() == key_bytes.len() && bool::from(provided_bytes.ct_eq(key_bytes))
    })
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router, talking to the real messaging API when a
/// channel access token is configured
pub fn create_router(engine: ChatEngine, static_dir: Option<&str>, config: ServerConfig) -> Router {
    let messenger: Arc<dyn MessagingClient> = match config.channel_access_token.as_deref() {
        Some(token) => Arc::new(LineClient::new(token)),
        None => {
            info!("ℹ️  No channel access token configured (set {}); replies are only logged", CHANNEL_TOKEN_ENV);
            Arc::new(LogOnlyClient)
        }
    };
    create_router_with_messenger(engine, static_dir, config, messenger)
}

/// Create the application router with an explicit messaging client (for testing)
pub fn create_router_with_messenger(
    engine: ChatEngine,
    static_dir: Option<&str>,
    config: ServerConfig,
    messenger: Arc<dyn MessagingClient>,
) -> Router {
    let state = Arc::new(AppState {
        engine,
        config: config.clone(),
        messenger,
    });

    let api_routes = Router::new()
        // Users
        .route("/users/:id", get(handlers::get_user))
        .route("/users/:id/journals", get(handlers::list_journals))
        // Categories
        .route(
            "/groups/:id/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        // Transactions
        .route(
            "/groups/:id/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route("/transactions/:id", delete(handlers::delete_transaction))
        // Reports
        .route("/groups/:id/summary", get(handlers::get_summary))
        // Goals
        .route("/groups/:id/goals", get(handlers::list_goals));

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data: https:; connect-src 'self'; frame-ancestors 'none'"
    );

    // Routes added after the auth layer are not covered by it
    let mut app = Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .route("/api/health", get(handlers::health))
        .route("/webhook", post(handlers::webhook))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    engine: ChatEngine,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("⚠️  Authentication disabled - do not expose to network!");
    }
    if config.channel_secret.is_none() {
        warn!(
            "⚠️  No channel secret configured (set {}); webhook signatures are not verified",
            CHANNEL_SECRET_ENV
        );
    }

    let app = create_router(engine, static_dir, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            internal: Some(err),
        }
    }
}
