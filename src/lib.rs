pub mod config;
pub mod db;
pub mod entitlement;
pub mod error;
pub mod gate;
pub mod models;
pub mod paypal;
pub mod rate_limit;
pub mod routes;
pub mod state;
pub mod validation;
pub mod views;

use std::sync::Arc;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, Method};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::paypal::PaypalClient;
use crate::rate_limit::IpRateLimiter;
use crate::state::{AppState, SharedState};

pub fn build_app(pool: PgPool, config: Config) -> (Router, SharedState) {
    let paypal = config.paypal.as_ref().and_then(|paypal| {
        match PaypalClient::new(paypal, config.request_timeout) {
            Ok(client) => {
                tracing::info!("PayPal checkout configured ({:?})", paypal.environment);
                Some(Arc::new(client))
            }
            Err(e) => {
                tracing::warn!("PayPal checkout not available: {e}");
                None
            }
        }
    });

    let cors = cors_layer(&config.cors_origins);
    let max_body_size = config.max_body_size;
    let request_timeout = config.request_timeout;

    let state: SharedState = Arc::new(AppState {
        pool,
        config,
        paypal,
        write_limiter: IpRateLimiter::new(),
    });

    let app = Router::new()
        .merge(routes::api_routes())
        .merge(routes::checkout_routes())
        .merge(views::view_routes())
        .route("/health", axum::routing::get(health))
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(TimeoutLayer::new(request_timeout)),
        )
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state.clone());

    (app, state)
}

/// The form page is served from another origin in development, so CORS is on
/// for the API. An empty origin list allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|o| match HeaderValue::from_str(o) {
                    Ok(v) => Some(v),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid CORS origin: {o}");
                        None
                    }
                }),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
}

async fn health() -> &'static str {
    "ok"
}
