use sqlx::PgPool;
use uuid::Uuid;

use crate::models::User;

/// Lookup-or-create in a single statement. Concurrent first requests for the
/// same email converge on one row via the unique constraint.
pub async fn find_or_create(pool: &PgPool, email: &str) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (email) VALUES ($1)
         ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
         RETURNING *",
    )
    .bind(email)
    .fetch_one(pool)
    .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Row-locks the user until the surrounding transaction ends.
pub async fn lock_by_email<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1 FOR UPDATE")
        .bind(email)
        .fetch_optional(executor)
        .await
}

/// Returns the number of rows touched (0 when the email is unknown).
pub async fn set_paid<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    email: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET has_paid = TRUE WHERE email = $1")
        .bind(email)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Increments in the store, never from a value read by the caller.
pub async fn increment_cv_count<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<i32, sqlx::Error> {
    let row: (i32,) =
        sqlx::query_as("UPDATE users SET cv_count = cv_count + 1 WHERE id = $1 RETURNING cv_count")
            .bind(id)
            .fetch_one(executor)
            .await?;
    Ok(row.0)
}
