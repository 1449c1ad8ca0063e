//! HTTP client for the UserVoice API.
//!
//! This module provides the `Client` struct, which signs requests with
//! OAuth 1.0a, sends them, and turns `errors` envelopes into typed errors.
//! It also owns the authentication lifecycle: request token, authorization
//! URL, verifier exchange and the delegated `login_as` flows.
//!
//! Every login operation returns a *new* client. The receiver is never
//! mutated, so clones held elsewhere keep their credentials.
//!
//! # Security
//!
//! Consumer and token secrets are never logged. Bodies of failed responses
//! are sanitized before they end up in an error.

use std::fmt;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use url::Url;

use crate::collection::Collection;
use crate::error::{Result, UserVoiceError};
use crate::models::{check_errors, LoginReply, Token};
use crate::oauth::{OAuthService, OUT_OF_BAND};

/// Host suffix of hosted UserVoice sites.
pub const DEFAULT_DOMAIN: &str = "uservoice.com";

/// Protocol used when none is given.
pub const DEFAULT_PROTOCOL: &str = "https";

/// Value of the `API-Client` header sent with every request.
pub const API_CLIENT: &str = concat!("uservoice-rust-", env!("CARGO_PKG_VERSION"));

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum length for non-JSON error bodies kept in an error.
const MAX_ERROR_BODY_LEN: usize = 500;

const LOGIN_AS_OWNER_PATH: &str = "/api/v1/users/login_as_owner";
const LOGIN_AS_PATH: &str = "/api/v1/users/login_as";

/// Settings for building a [`Client`].
///
/// Only the subdomain and API key are required. The rest fall back to:
///
/// | Option   | Default                |
/// |----------|------------------------|
/// | secret   | the API key            |
/// | callback | `oob` (out-of-band)    |
/// | domain   | `uservoice.com`        |
/// | protocol | `https`                |
#[derive(Clone, Default)]
pub struct ClientOptions {
    /// Site subdomain, e.g. `acme` for `acme.uservoice.com`.
    pub subdomain: String,
    /// Consumer key.
    pub api_key: String,
    /// Consumer secret.
    pub api_secret: Option<String>,
    /// OAuth callback URL.
    pub callback: Option<String>,
    /// Pre-existing access token.
    pub access_token: Option<Token>,
    /// Host suffix.
    pub domain: Option<String>,
    /// `http` or `https`.
    pub protocol: Option<String>,
    /// Full server URL, overriding protocol, subdomain and domain.
    pub base_url: Option<String>,
}

impl ClientOptions {
    /// Creates options for `subdomain` with the given consumer key.
    pub fn new(subdomain: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            subdomain: subdomain.into(),
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Sets the consumer secret.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.api_secret = Some(secret.into());
        self
    }

    /// Sets the OAuth callback URL.
    pub fn with_callback(mut self, callback: impl Into<String>) -> Self {
        self.callback = Some(callback.into());
        self
    }

    /// Binds the client to an existing access token.
    pub fn with_access_token(mut self, token: impl Into<String>, secret: impl Into<String>) -> Self {
        self.access_token = Some(Token::new(token, secret));
        self
    }

    /// Sets the host suffix (default `uservoice.com`).
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Sets the protocol (default `https`).
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// Points the client at an explicit server URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// The server location, `protocol://subdomain.domain` unless overridden.
    pub fn server_url(&self) -> String {
        if let Some(base_url) = &self.base_url {
            return base_url.trim_end_matches('/').to_string();
        }
        format!(
            "{}://{}.{}",
            self.protocol.as_deref().unwrap_or(DEFAULT_PROTOCOL),
            self.subdomain,
            self.domain.as_deref().unwrap_or(DEFAULT_DOMAIN)
        )
    }
}

/// Client for one UserVoice site and credential.
///
/// Cloning is cheap: the HTTP connection pool is shared.
///
/// # Example
///
/// ```ignore
/// let client = Client::new(ClientOptions::new("acme", "key").with_secret("secret"))?;
/// let owner = client.login_as_owner().await?;
///
/// let tickets = owner.collection("/api/v1/tickets", Some(10));
/// for ticket in tickets.to_vec().await? {
///     println!("{}", ticket["subject"]);
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    oauth: OAuthService,
    request_token: Option<Token>,
    access_token: Option<Token>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("oauth", &self.oauth)
            .field("request_token", &self.request_token)
            .field("access_token", &self.access_token)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client from options.
    ///
    /// # Errors
    ///
    /// Returns `UserVoiceError::Config` if the server URL is invalid and
    /// `UserVoiceError::HttpClient` if the HTTP client fails to initialize.
    pub fn new(options: ClientOptions) -> Result<Self> {
        let base_url = options.server_url();
        Url::parse(&base_url).map_err(|e| {
            UserVoiceError::invalid_config(format!("invalid server URL {base_url}: {e}"))
        })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(UserVoiceError::HttpClient)?;

        let secret = options
            .api_secret
            .unwrap_or_else(|| options.api_key.clone());
        let callback = options
            .callback
            .unwrap_or_else(|| OUT_OF_BAND.to_string());
        let oauth = OAuthService::new(
            http.clone(),
            base_url.clone(),
            options.api_key,
            secret,
            callback,
        );

        tracing::debug!(base_url = %base_url, "UserVoice client created");

        Ok(Self {
            http,
            base_url,
            oauth,
            request_token: None,
            access_token: options.access_token,
        })
    }

    /// The server location, e.g. `https://acme.uservoice.com`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// True when requests are signed with an access token.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// The access token this client signs with, if any.
    pub fn access_token(&self) -> Option<&Token> {
        self.access_token.as_ref()
    }

    /// The request token stored by [`authorize_url`](Self::authorize_url).
    pub fn request_token(&self) -> Option<&Token> {
        self.request_token.as_ref()
    }

    /// Starts the three-legged flow.
    ///
    /// Obtains a request token, stores it on this client and returns the URL
    /// where the user authorizes it. Follow up with
    /// [`login_with_verifier`](Self::login_with_verifier).
    pub async fn authorize_url(&mut self) -> Result<String> {
        let request_token = self.oauth.request_token().await?;
        let url = self.oauth.authorization_url(&request_token);
        self.request_token = Some(request_token);
        Ok(url)
    }

    /// Returns a client bound to the given access token.
    pub fn login_with_access_token(
        &self,
        token: impl Into<String>,
        secret: impl Into<String>,
    ) -> Client {
        self.with_access_token(Token::new(token, secret))
    }

    fn with_access_token(&self, access_token: Token) -> Client {
        Client {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            oauth: self.oauth.clone(),
            request_token: None,
            access_token: Some(access_token),
        }
    }

    /// Exchanges the stored request token and `verifier` for an access token.
    ///
    /// # Errors
    ///
    /// Returns `UserVoiceError::Unauthorized` if
    /// [`authorize_url`](Self::authorize_url) was not called first.
    pub async fn login_with_verifier(&self, verifier: &str) -> Result<Client> {
        let request_token = self.request_token.as_ref().ok_or_else(|| {
            UserVoiceError::unauthorized("no request token; call authorize_url first")
        })?;
        let access = self.oauth.access_token(request_token, verifier).await?;
        tracing::info!("Logged in with verifier");
        Ok(self.with_access_token(access))
    }

    /// Logs in as the first owner of the site.
    ///
    /// Requires a trusted API key.
    pub async fn login_as_owner(&self) -> Result<Client> {
        let request_token = self.oauth.request_token().await?;
        let reply = self
            .post(
                LOGIN_AS_OWNER_PATH,
                json!({ "request_token": request_token.token }),
            )
            .await?;
        let client = self.client_from_login_reply(reply)?;
        tracing::info!("Logged in as owner");
        Ok(client)
    }

    /// Logs in as the user with the given email address.
    ///
    /// Requires a trusted API key.
    pub async fn login_as(&self, email: &str) -> Result<Client> {
        let request_token = self.oauth.request_token().await?;
        let reply = self
            .post(
                LOGIN_AS_PATH,
                json!({
                    "request_token": request_token.token,
                    "user": { "email": email },
                }),
            )
            .await?;
        let client = self.client_from_login_reply(reply)?;
        tracing::info!("Logged in as user");
        Ok(client)
    }

    fn client_from_login_reply(&self, reply: Value) -> Result<Client> {
        let token = serde_json::from_value::<LoginReply>(reply)
            .ok()
            .and_then(|reply| reply.token)
            .ok_or_else(|| UserVoiceError::unauthorized("Could not get Request Token"))?;
        Ok(self.with_access_token(token.into()))
    }

    /// Makes a GET request. Query parameters go in `path` after `?`.
    pub async fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::GET, path, None).await
    }

    /// Makes a DELETE request.
    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.request(Method::DELETE, path, None).await
    }

    /// Makes a POST request with `params` as the JSON body.
    pub async fn post(&self, path: &str, params: Value) -> Result<Value> {
        self.request(Method::POST, path, Some(params)).await
    }

    /// Makes a PUT request with `params` as the JSON body.
    pub async fn put(&self, path: &str, params: Value) -> Result<Value> {
        self.request(Method::PUT, path, Some(params)).await
    }

    /// Makes a signed request and classifies the response.
    ///
    /// # Errors
    ///
    /// A non-null `errors` object in the body is turned into
    /// `Unauthorized`, `NotFound`, `ApplicationError` or `Api` according to
    /// its `type`, whatever the HTTP status.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        params: Option<Value>,
    ) -> Result<Value> {
        let raw_url = format!("{}{}", self.base_url, path);
        let url = Url::parse(&raw_url)
            .map_err(|e| UserVoiceError::invalid_config(format!("invalid path {path}: {e}")))?;

        tracing::debug!(
            method = %method,
            path = %path,
            "Making UserVoice API request"
        );

        let authorization = self
            .oauth
            .authorization_header(&method, &url, self.access_token.as_ref());

        let mut req = self
            .http
            .request(method.clone(), url)
            .header("Content-Type", "application/json")
            .header("API-Client", API_CLIENT)
            .header("Accept", "application/json")
            .header("Authorization", authorization);

        if let Some(params) = params {
            req = req.body(serde_json::to_string(&params)?);
        }

        let response = req
            .send()
            .await
            .map_err(|e| send_error(e, format!("{} {}", method, path)))?;
        let status = response.status();
        let body = response.text().await.map_err(UserVoiceError::Http)?;

        tracing::trace!(body = %body, "UserVoice API response");

        let value = self.parse_body(status, &body)?;
        check_errors(&value)?;
        Ok(value)
    }

    fn parse_body(&self, status: StatusCode, body: &str) -> Result<Value> {
        if body.trim().is_empty() && status.is_success() {
            return Ok(Value::Null);
        }
        match serde_json::from_str(body) {
            Ok(value) => Ok(value),
            Err(_) if !status.is_success() => {
                tracing::warn!(status = %status, "UserVoice returned a non-JSON error body");
                Err(UserVoiceError::HttpStatus {
                    status,
                    body: self.sanitize_body(body),
                })
            }
            Err(e) => Err(UserVoiceError::Serialization(e)),
        }
    }

    fn sanitize_body(&self, body: &str) -> String {
        let mut body = UserVoiceError::sanitize_message(body, self.oauth.consumer_secret());
        if let Some(token) = &self.access_token {
            body = UserVoiceError::sanitize_message(&body, &token.secret);
        }
        if body.len() > MAX_ERROR_BODY_LEN {
            let cut = (0..=MAX_ERROR_BODY_LEN)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            format!("{}...[truncated]", &body[..cut])
        } else {
            body
        }
    }

    /// A lazily paginated view over the list endpoint at `path`.
    ///
    /// `limit` caps the number of items; `None` means all of them.
    pub fn collection(&self, path: impl Into<String>, limit: Option<usize>) -> Collection {
        Collection::new(self.clone(), path, limit)
    }
}

/// Converts a transport failure, singling out timeouts.
pub(crate) fn send_error(e: reqwest::Error, operation: String) -> UserVoiceError {
    if e.is_timeout() {
        return UserVoiceError::timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS), operation);
    }
    UserVoiceError::Http(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> Client {
        Client::new(ClientOptions::new("acme", "key").with_secret("secret")).unwrap()
    }

    #[test]
    fn test_server_url_defaults() {
        let options = ClientOptions::new("acme", "key");
        assert_eq!(options.server_url(), "https://acme.uservoice.com");
    }

    #[test]
    fn test_server_url_custom_domain_and_protocol() {
        let options = ClientOptions::new("acme", "key")
            .with_domain("feedback.example.com")
            .with_protocol("http");
        assert_eq!(options.server_url(), "http://acme.feedback.example.com");
    }

    #[test]
    fn test_server_url_override_drops_trailing_slash() {
        let options = ClientOptions::new("acme", "key").with_base_url("http://127.0.0.1:8080/");
        assert_eq!(options.server_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_secret_defaults_to_key() {
        let client = Client::new(ClientOptions::new("acme", "only-key")).unwrap();
        assert_eq!(client.oauth.consumer_secret(), "only-key");
        assert_eq!(client.oauth.consumer_key(), "only-key");
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        let result = Client::new(ClientOptions::new("acme", "key").with_base_url("not a url"));
        assert!(matches!(result, Err(UserVoiceError::Config(_))));
    }

    #[test]
    fn test_api_client_header() {
        assert!(API_CLIENT.starts_with("uservoice-rust-"));
        assert!(API_CLIENT.ends_with(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_login_with_access_token_leaves_receiver_untouched() {
        let client = test_client();
        let user = client.login_with_access_token("tok", "sec");

        assert!(!client.is_authenticated());
        assert!(user.is_authenticated());
        assert_eq!(user.access_token(), Some(&Token::new("tok", "sec")));
        assert_eq!(user.base_url(), client.base_url());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let user = test_client().login_with_access_token("tok", "token-secret");
        let printed = format!("{:?}", user);
        assert!(printed.contains("tok"));
        assert!(!printed.contains("token-secret"));
        assert!(!printed.contains("\"secret\""));
    }

    #[test]
    fn test_login_with_verifier_requires_request_token() {
        let client = test_client();
        let result = tokio_test::block_on(client.login_with_verifier("1234"));
        assert!(matches!(result, Err(UserVoiceError::Unauthorized(_))));
    }

    #[test]
    fn test_login_reply_without_token_is_unauthorized() {
        let client = test_client();
        let result = client.client_from_login_reply(json!({"user": {"id": 1}}));
        assert!(matches!(result, Err(UserVoiceError::Unauthorized(ref m)) if m == "Could not get Request Token"));
    }

    #[test]
    fn test_parse_body_empty_success() {
        let client = test_client();
        assert_eq!(client.parse_body(StatusCode::OK, "").unwrap(), Value::Null);
    }

    #[test]
    fn test_parse_body_html_error_is_truncated_and_sanitized() {
        let client = test_client();
        let body = format!("<html>secret {}</html>", "x".repeat(1000));
        let err = client
            .parse_body(StatusCode::BAD_GATEWAY, &body)
            .unwrap_err();
        match err {
            UserVoiceError::HttpStatus { status, body } => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert!(body.ends_with("...[truncated]"));
                assert!(!body.contains("secret"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_body_invalid_json_on_success() {
        let client = test_client();
        let err = client.parse_body(StatusCode::OK, "not json").unwrap_err();
        assert!(matches!(err, UserVoiceError::Serialization(_)));
    }
}
