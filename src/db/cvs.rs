use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Cv, CvFields};

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    fields: &CvFields,
) -> Result<Cv, sqlx::Error> {
    sqlx::query_as::<_, Cv>(
        "INSERT INTO cvs (user_id, name, role, email, phone, location, summary)
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(user_id)
    .bind(fields.name.trim())
    .bind(fields.role.trim())
    .bind(fields.email.trim())
    .bind(fields.phone.trim())
    .bind(fields.location.trim())
    .bind(fields.summary.trim())
    .fetch_one(executor)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Cv>, sqlx::Error> {
    sqlx::query_as::<_, Cv>("SELECT * FROM cvs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Cv>, sqlx::Error> {
    sqlx::query_as::<_, Cv>("SELECT * FROM cvs WHERE user_id = $1 ORDER BY created_at DESC")
        .bind(user_id)
        .fetch_all(pool)
        .await
}
