use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::AppError;
use crate::paypal::PaypalClient;
use crate::state::SharedState;

#[derive(Deserialize, Default)]
pub struct CreateOrder {
    pub intent: Option<String>,
}

fn provider(state: &SharedState) -> Result<Arc<PaypalClient>, AppError> {
    state
        .paypal
        .clone()
        .ok_or_else(|| AppError::Unavailable("Payments are not configured".to_string()))
}

pub async fn setup(State(state): State<SharedState>) -> Result<Json<Value>, AppError> {
    let paypal = provider(&state)?;
    let client_token = paypal.client_token().await?;
    Ok(Json(json!({ "clientToken": client_token })))
}

pub async fn create_order(
    State(state): State<SharedState>,
    body: Option<Json<CreateOrder>>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let paypal = provider(&state)?;
    let intent = body
        .and_then(|Json(req)| req.intent)
        .unwrap_or_else(|| "CAPTURE".to_string());

    if !matches!(intent.to_uppercase().as_str(), "CAPTURE" | "AUTHORIZE") {
        return Err(AppError::BadRequest(
            "intent must be CAPTURE or AUTHORIZE".to_string(),
        ));
    }

    let resp = paypal.create_order(&intent).await?;
    Ok((resp.status, Json(resp.body)))
}

pub async fn capture_order(
    State(state): State<SharedState>,
    Path(order_id): Path<String>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let paypal = provider(&state)?;
    let resp = paypal.capture_order(&order_id).await?;
    Ok((resp.status, Json(resp.body)))
}
