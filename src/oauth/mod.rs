pub mod claims;
pub mod client;
pub mod handlers;
pub mod policy;

use axum::{routing::get, Router};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/authredirction", get(handlers::authorize))
        .route("/getCode", get(handlers::callback))
}
