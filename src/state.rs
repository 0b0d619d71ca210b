use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::paypal::PaypalClient;
use crate::rate_limit::IpRateLimiter;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub paypal: Option<Arc<PaypalClient>>,
    pub write_limiter: IpRateLimiter,
}
