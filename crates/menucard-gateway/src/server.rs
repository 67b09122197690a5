//! Gateway server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::{DefaultBodyLimit, FromRef},
    http::{HeaderValue, Method, header},
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use menucard_core::config::{AuthConfig, Config};
use menucard_core::store::Store;

use crate::GatewayError;
use crate::api;
use crate::auth::AuthState;

/// Request bodies may carry one image plus form fields; cap a little above
/// the image limit itself.
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Port to listen on.
    pub port: u16,
    /// Bind address.
    pub bind_address: String,
    /// Origins allowed by CORS.
    pub cors_origins: Vec<String>,
    /// Directory for the entity database.
    pub data_dir: PathBuf,
    /// Directory for uploaded images.
    pub upload_dir: PathBuf,
    /// Authentication configuration.
    pub auth: AuthConfig,
}

impl GatewayConfig {
    /// Build gateway configuration from the loaded application config.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            port: config.server.port,
            bind_address: config.server.bind_address.clone(),
            cors_origins: config.server.cors_origins.clone(),
            data_dir: config.data_dir(),
            upload_dir: config.upload_dir(),
            auth: config.auth.clone(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Gateway server state shared across handlers.
pub struct GatewayState {
    /// Entity store.
    pub store: Store,
    /// Authentication state.
    pub auth: Arc<AuthState>,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

/// Local wrapper around the shared auth state.
///
/// `FromRef` and `Arc` both live in other crates, so `Arc<AuthState>`
/// cannot implement `FromRef<Arc<GatewayState>>` directly (orphan rule).
/// Wrapping the substate in this local type makes the extraction legal
/// while keeping the handler state generic.
pub(crate) struct AuthStateRef(pub(crate) Arc<AuthState>);

impl FromRef<Arc<GatewayState>> for AuthStateRef {
    fn from_ref(state: &Arc<GatewayState>) -> Self {
        Self(state.auth.clone())
    }
}

/// Gateway server.
pub struct Gateway {
    config: GatewayConfig,
    state: Arc<GatewayState>,
}

impl Gateway {
    /// Create a new gateway.
    ///
    /// # Errors
    ///
    /// Returns error if the data directories cannot be created or the
    /// store cannot be opened.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        std::fs::create_dir_all(&config.data_dir)
            .map_err(|e| GatewayError::Config(format!("Failed to create data dir: {e}")))?;
        std::fs::create_dir_all(&config.upload_dir)
            .map_err(|e| GatewayError::Config(format!("Failed to create upload dir: {e}")))?;

        let store = Store::open(&config.data_dir)
            .map_err(|e| GatewayError::Config(format!("Failed to open store: {e}")))?;

        let auth = Arc::new(AuthState::initialize(
            config.auth.clone(),
            store.cafes().clone(),
        ));

        let state = Arc::new(GatewayState {
            store,
            auth,
            config: config.clone(),
        });

        Ok(Self { config, state })
    }

    /// Shared state, for tooling that works on the same store.
    #[must_use]
    pub const fn state(&self) -> &Arc<GatewayState> {
        &self.state
    }

    /// Build the router with every route and layer attached.
    #[must_use]
    pub fn router(&self) -> Router {
        let protected_and_public = Router::new()
            // auth
            .route("/cafe/auth/login", post(api::auth::login))
            .route("/cafe/refresh-token", post(api::auth::refresh))
            // profile
            .route("/cafe/my-cafe", get(api::cafe::my_cafe))
            .route("/cafe/update", put(api::cafe::update_my_cafe))
            // categories
            .route("/cafe/category/add", post(api::categories::add_category))
            .route(
                "/cafe/category/update/{id}",
                put(api::categories::update_category),
            )
            .route(
                "/cafe/category/delete/{id}",
                delete(api::categories::delete_category),
            )
            .route(
                "/cafe/categories/get-my",
                get(api::categories::my_categories),
            )
            .route(
                "/cafe/categories/foods",
                get(api::categories::categories_with_foods),
            )
            .route(
                "/cafe/categories/{cafe_id}",
                get(api::categories::categories_by_cafe),
            )
            // foods
            .route("/cafe/foods/get-my", get(api::foods::my_foods))
            .route("/cafe/foods/add", post(api::foods::add_food))
            .route("/cafe/foods/add/bulk", post(api::foods::bulk_import))
            .route("/cafe/foods/update/{id}", put(api::foods::update_food))
            .route("/cafe/foods/delete/{id}", delete(api::foods::delete_food))
            .route(
                "/cafe/foods/by-category",
                get(api::foods::foods_by_category),
            )
            .route("/cafe/foods/{id}", get(api::foods::food_by_id));

        Router::new()
            .route("/health", get(health_handler))
            .merge(protected_and_public)
            .nest_service("/uploads", ServeDir::new(&self.config.upload_dir))
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
            .layer(self.cors_layer())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    fn cors_layer(&self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
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
            .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(12 * 3600))
    }

    /// Run the gateway server.
    ///
    /// # Errors
    ///
    /// Returns error if the listen address is invalid or serving fails.
    pub async fn run(&self) -> Result<(), GatewayError> {
        let app = self.router();

        let addr: SocketAddr = format!("{}:{}", self.config.bind_address, self.config.port)
            .parse()
            .map_err(|e| GatewayError::Config(format!("Invalid address: {e}")))?;

        tracing::info!("Gateway listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .await
            .map_err(|e| GatewayError::Server(e.to_string()))?;

        Ok(())
    }
}

async fn health_handler() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> GatewayConfig {
        GatewayConfig {
            data_dir: dir.path().join("data"),
            upload_dir: dir.path().join("uploads"),
            auth: AuthConfig {
                jwt_secret: Some("gateway-test-secret".to_string()),
                ..AuthConfig::default()
            },
            ..GatewayConfig::default()
        }
    }

    #[test]
    fn builds_router() {
        let dir = TempDir::new().unwrap();
        let gateway = Gateway::new(test_config(&dir)).unwrap();
        let _router = gateway.router();
    }

    #[test]
    fn creates_directories() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let _gateway = Gateway::new(config.clone()).unwrap();

        assert!(config.data_dir.exists());
        assert!(config.upload_dir.exists());
    }
}
