/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use kelsa_api::{app::AppState, config::Config};
/// use kelsa_shared::payment::razorpay::RazorpayGateway;
/// use kelsa_shared::db::pool::{create_pool, DatabaseConfig};
/// use kelsa_shared::store::postgres::PgStore;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..Default::default()
/// })
/// .await?;
/// let gateway = RazorpayGateway::new(
///     &config.payment.base_url,
///     config.payment.key_id.clone(),
///     config.payment.key_secret.clone(),
/// )?;
/// let state = AppState::new(Arc::new(PgStore::new(pool)), Arc::new(gateway), config);
/// let app = kelsa_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post, put},
    Router,
};
use kelsa_shared::{
    auth::middleware::jwt_auth_middleware,
    payment::{Checkout, PaymentGateway},
    store::Store,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Persistence backend
    pub store: Arc<dyn Store>,

    /// Payment gateway client
    pub gateway: Arc<dyn PaymentGateway>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(store: Arc<dyn Store>, gateway: Arc<dyn PaymentGateway>, config: Config) -> Self {
        Self {
            store,
            gateway,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Payment handshake bound to this state's store, gateway and secret
    pub fn checkout(&self) -> Checkout<'_, dyn Store, dyn PaymentGateway> {
        Checkout::new(
            self.store.as_ref(),
            self.gateway.as_ref(),
            self.config.payment.key_secret.as_deref(),
            &self.config.payment.currency,
        )
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                              # Health check (public)
/// └── /v1/
///     ├── /auth/                           # Public
///     │   ├── POST /register
///     │   ├── POST /login
///     │   └── POST /refresh
///     ├── GET    /board                    # JWT
///     ├── POST   /boards/:board_id/lists   # JWT
///     ├── PUT    /boards/:board_id/lists/order
///     ├── PATCH  /lists/:list_id
///     ├── DELETE /lists/:list_id
///     ├── POST   /lists/:list_id/cards
///     ├── POST   /cards/:card_id/move
///     ├── DELETE /cards/:card_id
///     ├── POST   /payment                  # JWT
///     └── POST   /payment/verify           # Public, authenticated by signature
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Board, list, card and order routes (require JWT authentication)
    let protected_routes = Router::new()
        .route("/board", get(routes::boards::get_board))
        .route("/boards/:board_id/lists", post(routes::boards::add_list))
        .route("/boards/:board_id/lists/order", put(routes::boards::reorder_lists))
        .route(
            "/lists/:list_id",
            patch(routes::lists::rename_list).delete(routes::lists::delete_list),
        )
        .route("/lists/:list_id/cards", post(routes::lists::add_card))
        .route("/cards/:card_id", delete(routes::cards::delete_card))
        .route("/cards/:card_id/move", post(routes::cards::move_card))
        .route("/payment", post(routes::payment::create_order))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // The gateway signature authenticates verification
    let verify_routes = Router::new().route("/payment/verify", post(routes::payment::verify_payment));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes)
        .merge(verify_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Validates the bearer token with the configured secret and injects an
/// `AuthContext` into request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    jwt_auth_middleware(state.jwt_secret().to_string(), req, next)
        .await
        .map_err(ApiError::from)
}
