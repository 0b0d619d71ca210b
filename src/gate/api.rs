use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::entitlement::Entitlement;
use crate::models::{Cv, CvFields};
use crate::validation::FieldErrors;

#[derive(Debug, Clone, PartialEq)]
pub enum GateError {
    Validation(FieldErrors),
    LimitReached,
    NotFound,
    Transient(String),
}

impl GateError {
    /// Text shown to the user next to the form.
    pub fn user_message(&self) -> String {
        match self {
            GateError::Validation(_) => "Please correct the highlighted fields.".to_string(),
            GateError::LimitReached => {
                "You have used your free CVs. Complete the payment to keep generating.".to_string()
            }
            GateError::NotFound => "Something went wrong. Please try again.".to_string(),
            GateError::Transient(_) => {
                "The server could not be reached. Please try again.".to_string()
            }
        }
    }
}

impl std::fmt::Display for GateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateError::Validation(fields) => write!(f, "invalid fields: {}", fields.len()),
            GateError::LimitReached => write!(f, "CV limit reached"),
            GateError::NotFound => write!(f, "user not found"),
            GateError::Transient(msg) => write!(f, "transient failure: {msg}"),
        }
    }
}

impl std::error::Error for GateError {}

/// The three round trips the gate makes to the backend.
#[async_trait]
pub trait GateApi: Send + Sync + 'static {
    async fn check_entitlement(&self, email: &str) -> Result<Entitlement, GateError>;
    async fn generate(&self, form: &CvFields) -> Result<Cv, GateError>;
    async fn complete_payment(&self, email: &str) -> Result<(), GateError>;
}

/// `GateApi` over the JSON HTTP interface.
pub struct HttpGateApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpGateApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GateError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| GateError::Transient(format!("invalid base url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(GateError::Transient(format!(
                "invalid base url: {base_url}"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GateError::Transient(format!("failed to build client: {e}")))?;

        Ok(Self { client, base_url })
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl GateApi for HttpGateApi {
    async fn check_entitlement(&self, email: &str) -> Result<Entitlement, GateError> {
        let resp = self
            .client
            .get(self.url(&["api", "user", email]))
            .send()
            .await
            .map_err(transport_error)?;
        decode(resp).await
    }

    async fn generate(&self, form: &CvFields) -> Result<Cv, GateError> {
        let resp = self
            .client
            .post(self.url(&["api", "cv"]))
            .json(form)
            .send()
            .await
            .map_err(transport_error)?;
        decode(resp).await
    }

    async fn complete_payment(&self, email: &str) -> Result<(), GateError> {
        let resp = self
            .client
            .post(self.url(&["api", "payment", "complete"]))
            .json(&json!({ "email": email }))
            .send()
            .await
            .map_err(transport_error)?;
        decode::<Value>(resp).await.map(|_| ())
    }
}

fn transport_error(err: reqwest::Error) -> GateError {
    if err.is_timeout() {
        GateError::Transient("request timed out".to_string())
    } else {
        GateError::Transient(err.to_string())
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, GateError> {
    let status = resp.status();
    if status.is_success() {
        return resp
            .json::<T>()
            .await
            .map_err(|e| GateError::Transient(format!("invalid response body: {e}")));
    }

    let body: Value = resp.json().await.unwrap_or(Value::Null);
    let message = body["error"]
        .as_str()
        .map(|s| s.to_string())
        .unwrap_or_else(|| status.to_string());

    match status.as_u16() {
        403 if body["requiresPayment"].as_bool() == Some(true) => Err(GateError::LimitReached),
        404 => Err(GateError::NotFound),
        400 => match body.get("fields").cloned().map(serde_json::from_value::<FieldErrors>) {
            Some(Ok(fields)) => Err(GateError::Validation(fields)),
            _ => Err(GateError::Transient(message)),
        },
        _ => Err(GateError::Transient(message)),
    }
}
