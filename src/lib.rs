pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::middleware::auth::require_auth;
use crate::middleware::cors::cors_layer;
use crate::middleware::rate_limit::{
    api_limiter, auth_limiter, lead_limiter, rate_limit_middleware,
};
use crate::services::{
    auth_service::AuthService, lead_service::LeadService, user_service::UserService,
    zalo_service::ZaloService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub lead_service: LeadService,
    pub user_service: UserService,
    pub auth_service: AuthService,
    pub zalo_service: ZaloService,
}

impl AppState {
    pub fn new(pool: PgPool) -> crate::error::Result<Self> {
        let lead_service = LeadService::new(pool.clone());
        let user_service = UserService::new(pool.clone());
        let auth_service = AuthService::new(pool.clone());
        let zalo_service = ZaloService::new()?;

        Ok(Self {
            pool,
            lead_service,
            user_service,
            auth_service,
            zalo_service,
        })
    }
}

/// Assembles the full application router. Kept out of main so the surface can
/// be driven in tests with `tower::ServiceExt::oneshot`.
pub fn app(state: AppState) -> Router {
    let config = config::get_config();

    let api_rl = api_limiter(config.api_rate_limit);
    let auth_rl = auth_limiter(config.auth_rate_limit);
    let lead_rl = lead_limiter(config.lead_rate_limit);

    // Health and index stay outside every rate limiter.
    let base_routes = Router::new()
        .route("/", get(routes::health::index))
        .route("/api/health", get(routes::health::health));

    // Public form submissions, throttled hardest.
    let lead_submission = Router::new()
        .route("/api/leads", post(routes::lead_routes::create_lead))
        .route(
            "/api/zalo/create-lead",
            post(routes::zalo_routes::create_lead),
        )
        .layer(from_fn_with_state(lead_rl, rate_limit_middleware));

    let zalo_public = Router::new()
        .route("/api/zalo/validate", get(routes::zalo_routes::validate))
        .route("/api/zalo/health", get(routes::zalo_routes::zalo_health))
        .route("/api/zalo/user-info", post(routes::zalo_routes::user_info))
        .route(
            "/api/zalo/process-token",
            post(routes::zalo_routes::process_token),
        )
        .layer(from_fn_with_state(api_rl.clone(), rate_limit_middleware));

    // Credential endpoints get the strict auth limiter.
    let auth_public = Router::new()
        .route("/api/auth/login", post(routes::auth_routes::login))
        .route(
            "/api/auth/forgot-password",
            post(routes::auth_routes::forgot_password),
        )
        .route(
            "/api/auth/reset-password",
            post(routes::auth_routes::reset_password),
        )
        .layer(from_fn_with_state(auth_rl, rate_limit_middleware));

    // Everything behind require_auth; role gates live in the handlers.
    let protected = Router::new()
        .route("/api/leads", get(routes::lead_routes::list_leads))
        .route("/api/leads/stats", get(routes::lead_routes::get_lead_stats))
        .route(
            "/api/leads/:id",
            get(routes::lead_routes::get_lead)
                .put(routes::lead_routes::update_lead)
                .delete(routes::lead_routes::delete_lead),
        )
        .route(
            "/api/leads/:id/convert",
            post(routes::lead_routes::convert_lead),
        )
        .route("/api/leads/:id/notes", post(routes::lead_routes::add_note))
        .route(
            "/api/users",
            get(routes::user_routes::list_users).post(routes::user_routes::create_user),
        )
        .route("/api/users/stats", get(routes::user_routes::get_user_stats))
        .route(
            "/api/users/hr/:hr_id",
            get(routes::user_routes::list_users_by_hr),
        )
        .route(
            "/api/users/:id",
            get(routes::user_routes::get_user)
                .put(routes::user_routes::update_user)
                .delete(routes::user_routes::delete_user),
        )
        .route(
            "/api/users/:id/password",
            put(routes::user_routes::set_user_password),
        )
        .route(
            "/api/users/:id/reset-password",
            put(routes::user_routes::reset_user_password),
        )
        .route("/api/auth/register", post(routes::auth_routes::register))
        .route(
            "/api/auth/profile",
            get(routes::auth_routes::get_profile).put(routes::auth_routes::update_profile),
        )
        .route(
            "/api/auth/change-password",
            put(routes::auth_routes::change_password),
        )
        .route("/api/auth/logout", post(routes::auth_routes::logout))
        .layer(from_fn_with_state(state.clone(), require_auth))
        .layer(from_fn_with_state(api_rl, rate_limit_middleware));

    base_routes
        .merge(lead_submission)
        .merge(zalo_public)
        .merge(auth_public)
        .merge(protected)
        .with_state(state)
        .layer(cors_layer(config.allowed_origins.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
}
