use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::cookies::CookieSettings;
use super::handlers::change_password::change_password;
use super::handlers::current_user::current_user;
use super::handlers::delete_user::delete_user;
use super::handlers::forgot_password::forgot_password;
use super::handlers::get_user::get_user;
use super::handlers::log_in::log_in;
use super::handlers::log_out::log_out;
use super::handlers::refresh::refresh;
use super::handlers::register::register;
use super::handlers::reset_password::reset_password;
use super::handlers::update_access::update_access;
use super::handlers::update_user::update_user;
use super::middleware::authenticate as auth_middleware;
use crate::authentication::ports::AuthenticationServicePort;
use crate::user::ports::UserServicePort;

#[derive(Clone)]
pub struct AppState {
    pub authentication_service: Arc<dyn AuthenticationServicePort>,
    pub user_service: Arc<dyn UserServicePort>,
    pub cookies: CookieSettings,
}

pub fn create_router(
    authentication_service: Arc<dyn AuthenticationServicePort>,
    user_service: Arc<dyn UserServicePort>,
    cookies: CookieSettings,
) -> Router {
    let state = AppState {
        authentication_service,
        user_service,
        cookies,
    };

    let public_routes = Router::new()
        .route("/api/authentication/register", post(register))
        .route("/api/authentication/log-in", post(log_in))
        .route("/api/authentication/refresh", get(refresh))
        .route("/api/authentication/forgot-password", post(forgot_password))
        .route("/api/authentication/reset-password", put(reset_password));

    let protected_routes = Router::new()
        .route("/api/authentication", get(current_user))
        .route("/api/authentication/log-out", post(log_out))
        .route("/api/authentication/change-password", put(change_password))
        .route(
            "/api/users/:user_id",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route("/api/users/:user_id/access", put(update_access))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(trace_layer)
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
