pub mod auth;
pub mod middleware;
pub mod roles;
pub mod users;

use axum::extract::FromRequest;
use tracing::error;

use crate::errors::{AppError, AppResult};

/// JSON body extractor whose rejections use the standard error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Run CPU-heavy work (Argon2) off the async executor.
pub(crate) async fn run_blocking<T, F>(work: F) -> AppResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await.map_err(|err| {
        error!(error = %err, "blocking task failed");
        AppError::internal("internal error")
    })
}
