use std::collections::HashMap;

use crate::sensitive::Sensitive;
use crate::{
    AccessToken, HandshakeError, HandshakeResult, TemporaryToken, OAUTH_CALLBACK_CONFIRMED_KEY,
    OAUTH_TOKEN_KEY, OAUTH_TOKEN_SECRET_KEY,
};

/// Represents response of token acquisition.
#[derive(Debug, Clone)]
pub struct TokenResponse {
    /// OAuth Token
    pub oauth_token: String,
    /// OAuth Token Secret
    pub oauth_token_secret: Sensitive<String>,
    /// Other contents
    pub remain: HashMap<String, String>,
}

impl TokenResponse {
    pub fn into_temporary_token(mut self) -> TemporaryToken {
        let callback_confirmed = self
            .remain
            .remove(OAUTH_CALLBACK_CONFIRMED_KEY)
            .map(|v| v.eq_ignore_ascii_case("true"));
        TemporaryToken {
            token: self.oauth_token,
            token_secret: self.oauth_token_secret,
            callback_confirmed,
            extra: self.remain,
        }
    }

    pub fn into_access_token(self) -> AccessToken {
        AccessToken {
            token: self.oauth_token,
            token_secret: self.oauth_token_secret,
            extra: self.remain,
        }
    }
}

/// Parse a form-encoded token response body.
///
/// Both `oauth_token` and `oauth_token_secret` must be present; either may be
/// empty. The error carries the parameter names seen, never their values.
pub fn read_oauth_token(text: &str) -> HandshakeResult<TokenResponse> {
    let mut destructured = url::form_urlencoded::parse(text.as_bytes())
        .into_owned()
        .collect::<HashMap<String, String>>();
    let oauth_token = destructured.remove(OAUTH_TOKEN_KEY);
    let oauth_token_secret = destructured.remove(OAUTH_TOKEN_SECRET_KEY);
    match (oauth_token, oauth_token_secret) {
        (Some(t), Some(s)) => Ok(TokenResponse {
            oauth_token: t,
            oauth_token_secret: Sensitive::new(s),
            remain: destructured,
        }),
        (None, _) => Err(HandshakeError::TokenKeyNotFound(
            OAUTH_TOKEN_KEY,
            received_keys(text),
        )),
        (_, _) => Err(HandshakeError::TokenKeyNotFound(
            OAUTH_TOKEN_SECRET_KEY,
            received_keys(text),
        )),
    }
}

pub(crate) fn received_keys(text: &str) -> String {
    let keys = url::form_urlencoded::parse(text.as_bytes())
        .map(|(k, _)| k.into_owned())
        .collect::<Vec<_>>();
    format!("[{}]", keys.join(", "))
}
