use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use keyward_core::{SessionError, ValidatedSession};
use tracing::debug;

use crate::{errors::AppError, infra::app_state::AppState};

/// Request and response header carrying the session token.
pub const TOKEN_HEADER: &str = "token";

/// Gate for protected routes: validates the presented token and hands the
/// live `Account` and its `Session` to downstream handlers as extensions.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(request.headers())?;

    let ValidatedSession { account, session } = state
        .identity()
        .sessions()
        .validate(&token)
        .map_err(|err| {
            debug!(reason = %err, "session rejected");
            AppError::from(err)
        })?;

    request.extensions_mut().insert(account);
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

/// Token from the `token` header, falling back to `Authorization: Bearer`.
/// Absent yields an empty string so validation reports it as missing.
fn extract_token(headers: &HeaderMap) -> Result<String, SessionError> {
    if let Some(value) = headers.get(TOKEN_HEADER) {
        return value
            .to_str()
            .map(str::to_owned)
            .map_err(|_| SessionError::TokenMalformed);
    }

    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(String::new());
    };
    let value = value.to_str().map_err(|_| SessionError::TokenMalformed)?;
    match value.strip_prefix("Bearer ") {
        Some(token) => Ok(token.trim().to_owned()),
        None => Err(SessionError::TokenMalformed),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    const TOKEN: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn token_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, HeaderValue::from_static(TOKEN));
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer other"),
        );
        assert_eq!(extract_token(&headers).unwrap(), TOKEN);
    }

    #[test]
    fn bearer_is_the_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {TOKEN}")).unwrap(),
        );
        assert_eq!(extract_token(&headers).unwrap(), TOKEN);
    }

    #[test]
    fn missing_token_is_empty() {
        assert_eq!(extract_token(&HeaderMap::new()).unwrap(), "");
    }

    #[test]
    fn non_bearer_authorization_is_malformed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Basic dXNlcjpwdw=="),
        );
        assert!(matches!(
            extract_token(&headers),
            Err(SessionError::TokenMalformed)
        ));
    }
}
