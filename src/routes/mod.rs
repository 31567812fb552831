use std::sync::Arc;

use axum::{extract::Extension, response::Json as RespJson, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
};

use crate::config::Config;
use crate::store::{PatientStore, UserStore};
use crate::token::TokenIssuer;

pub mod auth;
pub mod patients;

use auth::auth_router;
use patients::patients_router;

/// Shared handler state, injected with `Extension`.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub patients: Arc<dyn PatientStore>,
    pub tokens: TokenIssuer,
    pub bcrypt_cost: u32,
}

impl AppState {
    /// Builds state around one backend serving both users and patients.
    pub fn new<S>(store: Arc<S>, tokens: TokenIssuer, bcrypt_cost: u32) -> Self
    where
        S: UserStore + PatientStore + 'static,
    {
        Self {
            users: store.clone(),
            patients: store,
            tokens,
            bcrypt_cost,
        }
    }

    pub fn from_config<S>(store: Arc<S>, config: &Config) -> Self
    where
        S: UserStore + PatientStore + 'static,
    {
        Self::new(
            store,
            TokenIssuer::new(&config.jwt_secret, config.token_ttl),
            config.bcrypt_cost,
        )
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // register, login, me
        .merge(auth_router())
        .nest("/api/patients", patients_router())
        .route("/api/health", get(health))
        .layer(Extension(state))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
}

/// Serves the built frontend for every path the API does not claim.
pub fn with_frontend(router: Router, static_dir: &std::path::Path) -> Router {
    let serve_dir =
        ServeDir::new(static_dir).not_found_service(ServeFile::new(static_dir.join("index.html")));
    router.fallback_service(serve_dir)
}

async fn health() -> RespJson<serde_json::Value> {
    RespJson(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    }))
}
