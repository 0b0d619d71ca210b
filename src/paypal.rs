//! Thin pass-through to the PayPal REST API for the checkout widget.
//! Order payloads are forwarded as opaque JSON.

use std::time::Duration;

use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::config::PaypalConfig;
use crate::error::AppError;

pub struct PaypalClient {
    client: reqwest::Client,
    api_base: &'static str,
    client_id: String,
    client_secret: String,
    price: String,
    currency: String,
}

/// Status and body exactly as returned by the provider.
#[derive(Debug)]
pub struct ProviderResponse {
    pub status: StatusCode,
    pub body: Value,
}

#[derive(Deserialize)]
struct AccessToken {
    access_token: String,
}

#[derive(Deserialize)]
struct ClientToken {
    client_token: String,
}

impl PaypalClient {
    pub fn new(config: &PaypalConfig, timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to build PayPal HTTP client: {e}"))?;

        Ok(Self {
            client,
            api_base: config.environment.api_base(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            price: config.price.clone(),
            currency: config.currency.clone(),
        })
    }

    async fn access_token(&self) -> Result<String, AppError> {
        let resp = self
            .client
            .post(format!("{}/v1/oauth2/token", self.api_base))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Token request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Token request returned {}",
                resp.status()
            )));
        }

        let token: AccessToken = resp
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid token response: {e}")))?;
        Ok(token.access_token)
    }

    /// Token the browser widget needs to render the checkout buttons.
    pub async fn client_token(&self) -> Result<String, AppError> {
        let access_token = self.access_token().await?;

        let resp = self
            .client
            .post(format!("{}/v1/identity/generate-token", self.api_base))
            .bearer_auth(access_token)
            .header("Accept-Language", "en_US")
            .json(&json!({}))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Client token request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Client token request returned {}",
                resp.status()
            )));
        }

        let token: ClientToken = resp
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid client token response: {e}")))?;
        Ok(token.client_token)
    }

    /// Create an order for the unlock price. The amount always comes from
    /// configuration, never from the browser.
    pub async fn create_order(&self, intent: &str) -> Result<ProviderResponse, AppError> {
        let access_token = self.access_token().await?;

        let body = json!({
            "intent": intent.to_uppercase(),
            "purchase_units": [{
                "amount": {
                    "currency_code": self.currency,
                    "value": self.price,
                }
            }]
        });

        self.forward(
            self.client
                .post(format!("{}/v2/checkout/orders", self.api_base))
                .bearer_auth(access_token)
                .json(&body),
        )
        .await
    }

    pub async fn capture_order(&self, order_id: &str) -> Result<ProviderResponse, AppError> {
        if order_id.is_empty() || !order_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AppError::BadRequest("Invalid order id".to_string()));
        }

        let access_token = self.access_token().await?;

        self.forward(
            self.client
                .post(format!(
                    "{}/v2/checkout/orders/{order_id}/capture",
                    self.api_base
                ))
                .bearer_auth(access_token)
                .json(&json!({})),
        )
        .await
    }

    async fn forward(&self, req: reqwest::RequestBuilder) -> Result<ProviderResponse, AppError> {
        let resp = req
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Order request failed: {e}")))?;

        let status = StatusCode::from_u16(resp.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        let body: Value = resp.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            tracing::warn!("PayPal returned {status}");
        }

        Ok(ProviderResponse { status, body })
    }
}
