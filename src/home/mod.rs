use crate::state::AppState;
use axum::Router;

pub mod calendar;
pub mod handlers;

pub fn router() -> Router<AppState> {
    handlers::home_routes()
}
