use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cv {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub role: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

/// The form a user fills in to generate a CV. Missing fields decode as empty
/// strings so they are reported by validation rather than by the JSON extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CvFields {
    pub name: String,
    pub role: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub summary: String,
}
