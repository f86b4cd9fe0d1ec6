pub mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod mapper;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use dto::PortfolioRecord;
pub use services::{PortfolioStore, SlugAvailability};

pub fn router() -> Router<AppState> {
    handlers::portfolio_routes()
}
