//! Route wiring: one `Router` nest per resource, auth/admin middleware
//! applied where spec.md's auth column requires it, CORS from
//! configuration, and per-route rate limiting (stricter on login and the
//! payment callback, the way externally-reachable, unauthenticated routes
//! need it most).

use axum::http::HeaderValue;
use axum::middleware::{self, from_fn_with_state};
use axum::routing::{get, patch, post};
use axum::Router;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::GovernorLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::{admin_middleware, auth_middleware, AuthState};
use crate::config::AppConfig;

use super::modules::{auth, charging, health, ocpp_commands, payment, tickets};
use super::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let auth_state = AuthState { jwt_config: state.jwt_config.clone() };

    let login_governor = GovernorConfigBuilder::default().per_second(1).burst_size(5).finish().expect("valid login rate limiter config");

    // Public: credential exchange, token refresh.
    let auth_public_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .layer(GovernorLayer::new(login_governor))
        .with_state(state.clone());

    let auth_protected_routes = Router::new()
        .route("/me", get(auth::me))
        .layer(from_fn_with_state(auth_state.clone(), auth_middleware))
        .with_state(state.clone());

    // Any authenticated user may operate a charger (spec.md: "user", not "owner").
    let charging_routes = Router::new()
        .route("/start", post(charging::start_charging))
        .route("/stop", post(charging::stop_charging))
        .route("/chargers", get(charging::list_chargers))
        .layer(from_fn_with_state(auth_state.clone(), auth_middleware))
        .with_state(state.clone());

    // Admin-only: every outbound OCPP command.
    let ocpp_command_routes = Router::new()
        .route("/{charge_point_id}/reset", post(ocpp_commands::reset))
        .route("/{charge_point_id}/unlock-connector", post(ocpp_commands::unlock_connector))
        .route("/{charge_point_id}/clear-cache", post(ocpp_commands::clear_cache))
        .layer(middleware::from_fn(admin_middleware))
        .layer(from_fn_with_state(auth_state.clone(), auth_middleware))
        .with_state(state.clone());

    let callback_governor = GovernorConfigBuilder::default().per_second(2).burst_size(20).finish().expect("valid callback rate limiter config");

    // `/topup` needs the caller identity for the owner check; `/callback`
    // is unauthenticated and instead checked against a shared secret inside
    // the handler; `/approve` is admin-only.
    let payment_topup_routes =
        Router::new().route("/topup", post(payment::topup)).layer(from_fn_with_state(auth_state.clone(), auth_middleware)).with_state(state.clone());

    let payment_callback_routes =
        Router::new().route("/callback/{gateway}", post(payment::callback)).layer(GovernorLayer::new(callback_governor)).with_state(state.clone());

    let payment_approve_routes = Router::new()
        .route("/approve/{transaction_ref}", post(payment::approve))
        .layer(middleware::from_fn(admin_middleware))
        .layer(from_fn_with_state(auth_state.clone(), auth_middleware))
        .with_state(state.clone());

    // Role-scoped visibility is enforced inside the handlers themselves,
    // not at the router layer, since it depends on the caller's
    // support_staff row rather than a fixed admin/user split.
    let ticket_routes = Router::new()
        .route("/", post(tickets::create_ticket).get(tickets::list_tickets))
        .route("/{ticket_id}", get(tickets::get_ticket))
        .route("/{ticket_id}/status", patch(tickets::transition_ticket))
        .layer(from_fn_with_state(auth_state.clone(), auth_middleware))
        .with_state(state.clone());

    let health_routes = Router::new().route("/health", get(health::health_check)).with_state(state.clone());

    let api_governor = GovernorConfigBuilder::default().per_second(2).burst_size(60).finish().expect("valid API rate limiter config");

    Router::new()
        .merge(health_routes)
        .nest("/api/auth", auth_public_routes)
        .nest("/api/auth", auth_protected_routes)
        .nest("/api/charging", charging_routes)
        .nest("/api/ocpp", ocpp_command_routes)
        .nest("/api/payment", payment_topup_routes)
        .nest("/api/payment", payment_callback_routes)
        .nest("/api/payment", payment_approve_routes)
        .nest("/api/tickets", ticket_routes)
        .layer(GovernorLayer::new(api_governor))
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer(config: &AppConfig) -> CorsLayer {
    let allow_any = config.cors_origins.iter().any(|o| o.trim() == "*");
    if allow_any {
        info!("CORS: allowing any origin (set cors_origins in config for production)");
        return CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config.cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
}
