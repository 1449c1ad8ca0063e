//! OAuth 1.0a support.
//!
//! This module drives the three-legged handshake against the `/oauth/*`
//! endpoints of a UserVoice site. Signatures are produced by
//! [`oauth1_request`] with HMAC-SHA1. It is used by
//! [`Client`](crate::client::Client) and not usually needed directly.
//!
//! # Security
//!
//! Secrets take part in the signing key only. They are never logged and
//! never sent over the wire.

use std::fmt;

use oauth1_request as oauth;
use reqwest::Method;
use url::Url;

use crate::client::send_error;
use crate::error::{Result, UserVoiceError};
use crate::models::Token;

/// Callback value meaning "show the verifier to the user" (out-of-band).
pub const OUT_OF_BAND: &str = "oob";

/// OAuth 1.0a provider bound to one UserVoice site.
///
/// Cloning is cheap; the underlying HTTP client is shared.
#[derive(Clone)]
pub struct OAuthService {
    http: reqwest::Client,
    base_url: String,
    consumer: oauth::Credentials,
    callback: String,
}

impl fmt::Debug for OAuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthService")
            .field("base_url", &self.base_url)
            .field("consumer_key", &self.consumer.identifier)
            .field("callback", &self.callback)
            .finish_non_exhaustive()
    }
}

impl OAuthService {
    /// Creates a provider for the site at `base_url`.
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        callback: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            consumer: oauth::Credentials::new(consumer_key.into(), consumer_secret.into()),
            callback: callback.into(),
        }
    }

    /// The consumer key (safe to log).
    pub fn consumer_key(&self) -> &str {
        self.consumer.identifier()
    }

    /// Secret that must be scrubbed from any message derived from a response.
    pub(crate) fn consumer_secret(&self) -> &str {
        self.consumer.secret()
    }

    /// Obtains a fresh request token.
    pub async fn request_token(&self) -> Result<Token> {
        let url = format!("{}/oauth/request_token", self.base_url);
        let mut builder = self.builder(None);
        builder.callback(self.callback.as_str());
        self.token_exchange(&url, &builder).await
    }

    /// URL the user visits to authorize `request_token`.
    pub fn authorization_url(&self, request_token: &Token) -> String {
        format!(
            "{}/oauth/authorize?oauth_token={}",
            self.base_url,
            urlencoding::encode(&request_token.token)
        )
    }

    /// Exchanges an authorized request token and its verifier for an access token.
    pub async fn access_token(&self, request_token: &Token, verifier: &str) -> Result<Token> {
        let url = format!("{}/oauth/access_token", self.base_url);
        let mut builder = self.builder(Some(request_token));
        builder.verifier(verifier);
        self.token_exchange(&url, &builder).await
    }

    /// Builds the `Authorization` header for a request.
    ///
    /// Without a token the request is signed with the consumer credentials
    /// only (two-legged).
    pub fn authorization_header(
        &self,
        method: &Method,
        url: &Url,
        token: Option<&Token>,
    ) -> String {
        sign(&self.builder(token), method, url)
    }

    fn builder<'a>(&'a self, token: Option<&'a Token>) -> Signer<'a> {
        let mut builder = oauth::Builder::new(self.consumer.as_ref(), oauth::HMAC_SHA1);
        builder
            .token(token.map(|t| oauth::Credentials::new(t.token.as_str(), t.secret.as_str())))
            .version(true);
        builder
    }

    async fn token_exchange(&self, url: &str, builder: &Signer<'_>) -> Result<Token> {
        let parsed = Url::parse(url)
            .map_err(|e| UserVoiceError::invalid_config(format!("invalid OAuth URL {url}: {e}")))?;
        let authorization = sign(builder, &Method::POST, &parsed);

        tracing::debug!(url = %url, "Requesting OAuth token");

        let response = self
            .http
            .post(parsed)
            .header("Authorization", authorization)
            .send()
            .await
            .map_err(|e| send_error(e, format!("POST {url}")))?;

        let status = response.status();
        let body = response.text().await.map_err(UserVoiceError::Http)?;
        if !status.is_success() {
            return Err(UserVoiceError::oauth(format!(
                "{url} returned {status}: {}",
                UserVoiceError::sanitize_message(&body, self.consumer.secret())
            )));
        }

        parse_token_reply(&body)
    }
}

type Signer<'a> = oauth::Builder<'a, oauth::HmacSha1, &'a str>;

/// Signs `method url`, folding the query string into the signature.
fn sign(builder: &Signer<'_>, method: &Method, url: &Url) -> String {
    let params: oauth::ParameterList<String, String> = url
        .query_pairs()
        .map(|(k, v)| (urlencoding::encode(&k).into_owned(), v.into_owned()))
        .collect();
    builder.authorize(method.as_str(), base_uri(url), &params)
}

/// Scheme, host, non-default port and path; no query or fragment.
fn base_uri(url: &Url) -> String {
    format!("{}{}", url.origin().ascii_serialization(), url.path())
}

/// Parses a form-encoded `oauth_token=..&oauth_token_secret=..` reply.
pub fn parse_token_reply(body: &str) -> Result<Token> {
    let mut token = None;
    let mut secret = None;
    for (key, value) in url::form_urlencoded::parse(body.trim().as_bytes()) {
        match key.as_ref() {
            "oauth_token" => token = Some(value.into_owned()),
            "oauth_token_secret" => secret = Some(value.into_owned()),
            _ => {}
        }
    }
    match (token, secret) {
        (Some(token), Some(secret)) => Ok(Token::new(token, secret)),
        _ => Err(UserVoiceError::oauth(
            "token reply is missing oauth_token or oauth_token_secret",
        )),
    }
}
