//! OAuth token pairs and the delegated-login reply.

use std::fmt;

use serde::Deserialize;

/// An OAuth 1.0a token and its secret.
///
/// Used for both request tokens and access tokens. The secret is never
/// printed by the `Debug` implementation.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    /// The public token value (`oauth_token`).
    pub token: String,
    /// The token secret (`oauth_token_secret`).
    pub secret: String,
}

impl Token {
    /// Creates a token pair.
    pub fn new(token: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("token", &self.token)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Reply from the `login_as_owner` and `login_as` endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginReply {
    /// The issued access token, absent when the login was refused.
    #[serde(default)]
    pub token: Option<LoginToken>,
}

/// Access token as returned by the delegated-login endpoints.
#[derive(Clone, Deserialize)]
pub struct LoginToken {
    /// Access token value.
    pub oauth_token: String,
    /// Access token secret.
    pub oauth_token_secret: String,
}

impl From<LoginToken> for Token {
    fn from(value: LoginToken) -> Self {
        Token::new(value.oauth_token, value.oauth_token_secret)
    }
}

impl fmt::Debug for LoginToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginToken")
            .field("oauth_token", &self.oauth_token)
            .finish_non_exhaustive()
    }
}
