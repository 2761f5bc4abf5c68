use std::{borrow::Borrow, fmt};

use serde::Serialize;

use super::SessionError;

/// Exact length of every session token, in hex characters.
pub const TOKEN_LENGTH: usize = 32;

const PREVIEW_LENGTH: usize = 8;

/// Opaque bearer token identifying one live session.
///
/// Always exactly [`TOKEN_LENGTH`] lowercase-or-uppercase hex characters.
/// `Display` and `Debug` only reveal a short prefix so tokens never end up in
/// logs whole.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Check the shape of a client-supplied token without touching any store.
    pub fn parse(raw: &str) -> Result<Self, SessionError> {
        if raw.is_empty() {
            return Err(SessionError::TokenMissing);
        }
        if raw.len() != TOKEN_LENGTH
            || !raw.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(SessionError::TokenMalformed);
        }
        Ok(Self(raw.to_owned()))
    }

    pub(crate) fn from_minted(value: String) -> Self {
        debug_assert_eq!(value.len(), TOKEN_LENGTH);
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First few characters, for log correlation.
    pub fn preview(&self) -> &str {
        &self.0[..PREVIEW_LENGTH.min(self.0.len())]
    }
}

impl Borrow<str> for SessionToken {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SessionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}...", self.preview())
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionToken")
            .field(&format_args!("{}...", self.preview()))
            .finish()
    }
}
