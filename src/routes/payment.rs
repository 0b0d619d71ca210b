use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, State};
use serde::Deserialize;
use serde_json::json;

use crate::entitlement;
use crate::error::AppError;
use crate::rate_limit::RateScope;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct CompletePayment {
    pub email: Option<String>,
}

pub async fn complete(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<CompletePayment>,
) -> Result<Json<serde_json::Value>, AppError> {
    state
        .write_limiter
        .check(
            RateScope::PaymentCompletion,
            addr.ip(),
            state.config.write_rate_limit,
            60,
        )
        .map_err(AppError::RateLimited)?;

    let email = req
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Email is required".to_string()))?;

    entitlement::mark_paid(&state.pool, &email).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Payment recorded successfully",
    })))
}
