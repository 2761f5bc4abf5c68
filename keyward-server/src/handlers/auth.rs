use axum::{
    Extension, Json,
    extract::State,
    http::HeaderValue,
    response::{IntoResponse, Response},
};
use keyward_core::Session;
use serde::Deserialize;
use tracing::{info, warn};

use super::{ApiJson, middleware::TOKEN_HEADER, run_blocking};
use crate::{
    api_response::ApiResponse,
    errors::{AppError, AppResult},
    infra::app_state::AppState,
    validation,
};

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// Exchange credentials for a session token.
///
/// Unknown usernames and wrong passwords produce the same response. The
/// token is returned in the `token` response header and in the body.
pub async fn issue_token(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TokenRequest>,
) -> AppResult<Response> {
    let username = validation::username(&request.username)?;
    let password = validation::password(&request.password)?.to_owned();

    let identity = state.identity().clone();
    let account = identity
        .credentials()
        .get(&username)
        .map_err(|_| AppError::bad_credentials())?;

    let verified = {
        let identity = identity.clone();
        let account = account.clone();
        run_blocking(move || {
            identity.credentials().verify_password(&account, &password)
        })
        .await?
    };
    if !verified {
        warn!(username = %username, "password verification failed");
        return Err(AppError::bad_credentials());
    }

    let session = identity.sessions().issue(&account)?;
    info!(
        username = %account.username(),
        token = %session.token(),
        expires_at = %session.expires_at(),
        "session issued"
    );

    let header = HeaderValue::from_str(session.token().as_str())
        .map_err(|_| AppError::internal("could not encode session token"))?;
    let mut response = Json(ApiResponse::success(session)).into_response();
    response.headers_mut().insert(TOKEN_HEADER, header);
    Ok(response)
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.identity().sessions().revoke(&session)?;

    info!(
        username = %session.username(),
        token = %session.token(),
        "session revoked"
    );
    Ok(Json(ApiResponse::ok()))
}
