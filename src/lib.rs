// src/lib.rs

use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod advisory;
pub mod auth;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod live;
pub mod models;
pub mod routes;

use advisory::AdvisoryClient;
use db::Store;
use live::ChangeFeed;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub advisory: Arc<AdvisoryClient>,
    pub feed: ChangeFeed,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, advisory: AdvisoryClient) -> Self {
        Self {
            store,
            advisory: Arc::new(advisory),
            feed: ChangeFeed::new(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    // Permissive CORS; the web client is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // health
        .route("/health", get(routes::health::health))
        // auth & users
        .route("/api/v1/auth/sign-in", post(routes::auth::sign_in))
        .route("/api/v1/auth/sign-out", post(routes::auth::sign_out))
        .route("/api/v1/auth/me", get(routes::auth::me))
        .route("/api/v1/users", post(routes::users::create_user))
        .route("/api/v1/users/:id/role", patch(routes::users::patch_role))
        // shift logs
        .route(
            "/api/v1/shift-logs",
            post(routes::shift_logs::create_log).get(routes::shift_logs::list_logs),
        )
        .route(
            "/api/v1/shift-logs/:id",
            get(routes::shift_logs::get_log).delete(routes::shift_logs::delete_log),
        )
        .route("/api/v1/dashboard", get(routes::dashboard::get_dashboard))
        // entry-form rules
        .route(
            "/api/v1/shift-entry/checklist",
            get(routes::shift_entry::checklist_template),
        )
        .route(
            "/api/v1/shift-entry/normalize-load",
            post(routes::shift_entry::normalize_load),
        )
        // SOPs
        .route(
            "/api/v1/sops",
            post(routes::sops::create_sop).get(routes::sops::list_sops),
        )
        .route("/api/v1/sops/:id", axum::routing::delete(routes::sops::delete_sop))
        // AI advisory
        .route("/api/v1/advisory/analyze", post(routes::advisory::analyze))
        .route("/api/v1/advisory/ask", post(routes::advisory::ask))
        // live subscriptions
        .route("/api/v1/live/shift-logs", get(routes::live::shift_logs_live))
        .route("/api/v1/live/sops", get(routes::live::sops_live))
        // state & middleware
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
