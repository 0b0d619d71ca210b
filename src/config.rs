use std::net::IpAddr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub base_url: String,
    pub max_body_size: usize,
    pub request_timeout: Duration,
    pub cors_origins: Vec<String>,
    pub write_rate_limit: u32,
    pub log_level: String,
    pub paypal: Option<PaypalConfig>,
}

#[derive(Debug, Clone)]
pub struct PaypalConfig {
    pub client_id: String,
    pub client_secret: String,
    pub environment: PaypalEnvironment,
    pub price: String,
    pub currency: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaypalEnvironment {
    Sandbox,
    Live,
}

impl PaypalEnvironment {
    pub fn api_base(&self) -> &'static str {
        match self {
            PaypalEnvironment::Sandbox => "https://api-m.sandbox.paypal.com",
            PaypalEnvironment::Live => "https://api-m.paypal.com",
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;

        let host: IpAddr = env_or("CVGATE_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid CVGATE_HOST: {e}"))?;

        let port: u16 = env_or("CVGATE_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid CVGATE_PORT: {e}"))?;

        let base_url = env_or("CVGATE_BASE_URL", &format!("http://{host}:{port}"));

        let max_body_size: usize = env_or("CVGATE_MAX_BODY_SIZE", "65536")
            .parse()
            .map_err(|e| format!("Invalid CVGATE_MAX_BODY_SIZE: {e}"))?;

        let timeout_secs: u64 = env_or("CVGATE_REQUEST_TIMEOUT_SECS", "15")
            .parse()
            .map_err(|e| format!("Invalid CVGATE_REQUEST_TIMEOUT_SECS: {e}"))?;
        if timeout_secs == 0 {
            return Err("CVGATE_REQUEST_TIMEOUT_SECS must be greater than zero".to_string());
        }

        let cors_origins: Vec<String> = env_or("CVGATE_CORS_ORIGINS", "")
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();

        let write_rate_limit: u32 = env_or("CVGATE_WRITE_RATE_LIMIT", "20")
            .parse()
            .map_err(|e| format!("Invalid CVGATE_WRITE_RATE_LIMIT: {e}"))?;

        let log_level = env_or("CVGATE_LOG_LEVEL", "info");

        let paypal = match (
            std::env::var("PAYPAL_CLIENT_ID").ok(),
            std::env::var("PAYPAL_CLIENT_SECRET").ok(),
        ) {
            (Some(client_id), Some(client_secret)) => {
                let environment = match env_or("PAYPAL_ENVIRONMENT", "sandbox").as_str() {
                    "live" | "production" => PaypalEnvironment::Live,
                    "sandbox" => PaypalEnvironment::Sandbox,
                    other => return Err(format!("Invalid PAYPAL_ENVIRONMENT: {other}")),
                };
                let price = env_or("PAYPAL_PRICE", "9.99");
                price
                    .parse::<f64>()
                    .map_err(|e| format!("Invalid PAYPAL_PRICE: {e}"))?;
                Some(PaypalConfig {
                    client_id,
                    client_secret,
                    environment,
                    price,
                    currency: env_or("PAYPAL_CURRENCY", "USD"),
                })
            }
            _ => None,
        };

        Ok(Config {
            database_url,
            host,
            port,
            base_url,
            max_body_size,
            request_timeout: Duration::from_secs(timeout_secs),
            cors_origins,
            write_rate_limit,
            log_level,
            paypal,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
