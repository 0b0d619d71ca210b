pub mod cv;

use axum::Router;
use axum::routing::get;

use crate::state::SharedState;

pub fn view_routes() -> Router<SharedState> {
    Router::new().route("/cv/{id}", get(cv::show))
}
