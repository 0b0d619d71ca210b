use axum::Json;
use axum::extract::{Path, State};

use crate::entitlement::{self, Entitlement};
use crate::error::AppError;
use crate::models::Cv;
use crate::state::SharedState;

pub async fn get_user(
    State(state): State<SharedState>,
    Path(email): Path<String>,
) -> Result<Json<Entitlement>, AppError> {
    let entitlement = entitlement::check_entitlement(&state.pool, &email).await?;
    Ok(Json(entitlement))
}

pub async fn list_cvs(
    State(state): State<SharedState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<Cv>>, AppError> {
    let cvs = entitlement::list_generated(&state.pool, &email).await?;
    Ok(Json(cvs))
}
