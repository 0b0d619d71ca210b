//! Free-tier gating: two CVs per user, unlimited once paid.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::db;
use crate::error::AppError;
use crate::models::{Cv, CvFields, User};
use crate::validation::{is_valid_email, normalize_email, validate_cv};

pub const FREE_CV_LIMIT: i32 = 2;

pub fn can_generate(cv_count: i32, has_paid: bool) -> bool {
    has_paid || cv_count < FREE_CV_LIMIT
}

/// A user row plus the verdict on whether it may generate another CV.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlement {
    #[serde(flatten)]
    pub user: User,
    pub can_generate: bool,
}

impl From<User> for Entitlement {
    fn from(user: User) -> Self {
        let can_generate = can_generate(user.cv_count, user.has_paid);
        Entitlement { user, can_generate }
    }
}

/// Look the user up, creating it with a zero count when the email is new.
pub async fn check_entitlement(pool: &PgPool, email: &str) -> Result<Entitlement, AppError> {
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }

    let user = db::users::find_or_create(pool, &email).await?;
    tracing::debug!(
        user_id = %user.id,
        cv_count = user.cv_count,
        has_paid = user.has_paid,
        "Entitlement checked"
    );
    Ok(user.into())
}

/// Persist a CV and bump the owner's counter.
///
/// Both writes happen in one transaction that holds the user's row lock, so
/// overlapping requests for the same email are serialized: each one sees the
/// count left by the previous commit and the limit check cannot be raced.
pub async fn record_generation(pool: &PgPool, fields: &CvFields) -> Result<Cv, AppError> {
    validate_cv(fields).map_err(AppError::Validation)?;
    let email = normalize_email(&fields.email);

    let mut tx = pool.begin().await?;

    let user = db::users::lock_by_email(&mut *tx, &email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !can_generate(user.cv_count, user.has_paid) {
        tracing::info!(user_id = %user.id, cv_count = user.cv_count, "CV limit reached");
        return Err(AppError::LimitReached);
    }

    let cv = db::cvs::create(&mut *tx, user.id, fields).await?;
    let cv_count = db::users::increment_cv_count(&mut *tx, user.id).await?;

    tx.commit().await?;

    tracing::info!(user_id = %user.id, cv_id = %cv.id, cv_count, "CV generated");
    Ok(cv)
}

/// Unlock unlimited generation. Setting the flag twice is a no-op.
pub async fn mark_paid(pool: &PgPool, email: &str) -> Result<(), AppError> {
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }

    let updated = db::users::set_paid(pool, &email).await?;
    if updated == 0 {
        tracing::warn!("Payment completion for unknown user");
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!("Payment recorded");
    Ok(())
}

pub async fn list_generated(pool: &PgPool, email: &str) -> Result<Vec<Cv>, AppError> {
    let email = normalize_email(email);

    let user = db::users::find_by_email(pool, &email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(db::cvs::list_by_user(pool, user.id).await?)
}
