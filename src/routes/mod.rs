use axum::{Router, routing::get};

use crate::state::AppState;

pub mod auth;
pub mod blind_date;
pub mod doc;
pub mod extract;
pub mod health;
pub mod matches;
pub mod messaging;
pub mod params;
pub mod profile;
pub mod settings;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/healthy", get(health::health_check))
        .nest("/auth", auth::router())
        .nest("/profile", profile::router())
        .nest("/matches", matches::router())
        .nest("/blind-date", blind_date::router())
        .nest("/messaging", messaging::router())
        .nest("/settings", settings::router())
}
