use askama::Template;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse};
use uuid::Uuid;

use crate::db;
use crate::error::AppError;
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "cv/show.html")]
struct CvTemplate {
    name: String,
    role: String,
    email: String,
    phone: String,
    location: String,
    summary_paragraphs: Vec<String>,
    generated_on: String,
}

/// Printable resume page. PDF export is left to the browser's print dialog.
pub async fn show(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let cv = db::cvs::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("CV not found".to_string()))?;

    let summary_paragraphs = cv
        .summary
        .split("\n\n")
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    let template = CvTemplate {
        name: cv.name,
        role: cv.role,
        email: cv.email,
        phone: cv.phone,
        location: cv.location,
        summary_paragraphs,
        generated_on: cv.created_at.format("%Y-%m-%d").to_string(),
    };
    Ok(Html(template.render().unwrap_or_default()))
}
