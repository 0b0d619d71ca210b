pub mod checkout;
pub mod cvs;
pub mod payment;
pub mod users;

use axum::Router;
use axum::routing::{get, post};

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Entitlement
        .route("/api/user/{email}", get(users::get_user))
        .route("/api/user/{email}/cvs", get(users::list_cvs))
        // Generation
        .route("/api/cv", post(cvs::create))
        // Payment
        .route("/api/payment/complete", post(payment::complete))
}

/// Pass-through endpoints used by the PayPal checkout widget.
pub fn checkout_routes() -> Router<SharedState> {
    Router::new()
        .route("/setup", get(checkout::setup))
        .route("/order", post(checkout::create_order))
        .route("/order/{order_id}/capture", post(checkout::capture_order))
}
