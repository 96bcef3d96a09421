use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod campaigns;
mod error;
pub mod users;
mod validation;

pub use error::{ApiError, Violation};

use crate::config::Config;
use crate::db::Store;

pub struct AppState {
    config: Config,
    store: Store,
}

impl AppState {
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }
}

pub async fn create_app_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;

    Ok(Arc::new(AppState { config, store }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/users/{id}", get(users::get_user))
        .route("/users", put(users::update_user))
        .route("/users/{id}/campaigns", get(users::hosted_campaigns))
        .route(
            "/users/{id}/participations",
            get(users::participated_campaigns),
        )
        .route("/campaigns", post(campaigns::create_campaign))
        .route("/campaigns/{id}", get(campaigns::get_campaign))
        .route("/campaigns/{id}", put(campaigns::update_campaign))
        .route("/campaigns/{id}", delete(campaigns::delete_campaign))
        .route(
            "/campaigns/{id}/participants",
            get(campaigns::list_participants)
                .post(campaigns::join_campaign)
                .delete(campaigns::leave_campaign),
        )
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/", get(banner))
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

async fn banner() -> &'static str {
    "Tavern"
}
