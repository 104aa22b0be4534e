//! EPC Prediction API Module
//! REST API: login, model selection and rating prediction

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use routes::create_router;
pub use types::*;
