use axum::Router;

use crate::AppState;

pub mod distributions;
pub mod franchises;
pub mod health;
pub mod phones;
pub mod servers;

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new().nest(
        "/api",
        Router::new()
            .merge(distributions::router(state))
            .merge(franchises::router(state))
            .merge(phones::router(state))
            .merge(servers::router(state))
            .merge(health::router(state)),
    )
}
