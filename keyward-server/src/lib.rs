//! HTTP adapter over the Keyward identity core.
//!
//! Every route is a `POST` with a JSON body and answers with an
//! [`api_response::ApiResponse`] envelope. Protected routes go through
//! [`handlers::middleware::require_session`].

pub mod api_response;
pub mod errors;
pub mod handlers;
pub mod infra;
pub mod routes;
pub mod validation;

pub use infra::app_state::AppState;
pub use routes::create_router;
