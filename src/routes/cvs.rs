use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;

use crate::entitlement;
use crate::error::AppError;
use crate::models::{Cv, CvFields};
use crate::rate_limit::RateScope;
use crate::state::SharedState;

pub async fn create(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(fields): Json<CvFields>,
) -> Result<(StatusCode, Json<Cv>), AppError> {
    state
        .write_limiter
        .check(
            RateScope::Generation,
            addr.ip(),
            state.config.write_rate_limit,
            60,
        )
        .map_err(AppError::RateLimited)?;

    let cv = entitlement::record_generation(&state.pool, &fields).await?;
    Ok((StatusCode::CREATED, Json(cv)))
}
