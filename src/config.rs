//! Configuration loaded from the environment.
//!
//! This module reads UserVoice credentials from `UV_*` environment
//! variables and validates them before a [`Client`](crate::client::Client)
//! is built.

use std::env;

use crate::client::ClientOptions;
use crate::error::UserVoiceError;
use crate::models::Token;

/// Settings for connecting to a UserVoice site.
///
/// Secrets are stored but never logged or exposed in error messages.
#[derive(Clone)]
pub struct Config {
    /// Site subdomain (`UV_SUBDOMAIN`).
    pub subdomain: String,

    /// Consumer key (`UV_API_KEY`).
    pub api_key: String,

    /// Consumer secret (`UV_API_SECRET`).
    /// This value must never be logged or included in error messages.
    pub api_secret: Option<String>,

    /// OAuth callback URL (`UV_CALLBACK`).
    pub callback: Option<String>,

    /// Access token (`UV_ACCESS_TOKEN` and `UV_ACCESS_TOKEN_SECRET`).
    pub access_token: Option<Token>,

    /// Host suffix (`UV_DOMAIN`).
    pub domain: Option<String>,

    /// `http` or `https` (`UV_PROTOCOL`).
    pub protocol: Option<String>,

    /// Full server URL override (`UV_BASE_URL`).
    pub base_url: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Required Environment Variables
    ///
    /// - `UV_SUBDOMAIN`: the site subdomain, e.g. `acme`
    /// - `UV_API_KEY`: the consumer key
    ///
    /// # Errors
    ///
    /// Returns `UserVoiceError::Config` if a required variable is missing
    /// or a value fails validation.
    pub fn from_env() -> Result<Self, UserVoiceError> {
        let subdomain = Self::get_required_env("UV_SUBDOMAIN")?;
        let api_key = Self::get_required_env("UV_API_KEY")?;
        Self::validate_api_key(&api_key)?;

        let protocol = Self::get_optional_env("UV_PROTOCOL")
            .map(Self::validate_protocol)
            .transpose()?;

        let access_token = match (
            Self::get_optional_env("UV_ACCESS_TOKEN"),
            Self::get_optional_env("UV_ACCESS_TOKEN_SECRET"),
        ) {
            (Some(token), Some(secret)) => Some(Token::new(token, secret)),
            (None, None) => None,
            _ => {
                return Err(UserVoiceError::invalid_config(
                    "UV_ACCESS_TOKEN and UV_ACCESS_TOKEN_SECRET must be set together",
                ))
            }
        };

        Ok(Config {
            subdomain: subdomain.trim().to_string(),
            api_key,
            api_secret: Self::get_optional_env("UV_API_SECRET"),
            callback: Self::get_optional_env("UV_CALLBACK"),
            access_token,
            domain: Self::get_optional_env("UV_DOMAIN"),
            protocol,
            base_url: Self::get_optional_env("UV_BASE_URL"),
        })
    }

    /// Converts the configuration into client options.
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            subdomain: self.subdomain.clone(),
            api_key: self.api_key.clone(),
            api_secret: self.api_secret.clone(),
            callback: self.callback.clone(),
            access_token: self.access_token.clone(),
            domain: self.domain.clone(),
            protocol: self.protocol.clone(),
            base_url: self.base_url.clone(),
        }
    }

    /// Gets a required environment variable, returning an error if missing or empty.
    fn get_required_env(name: &str) -> Result<String, UserVoiceError> {
        Self::get_optional_env(name).ok_or_else(|| UserVoiceError::missing_env(name))
    }

    /// Gets an optional environment variable, treating blank values as unset.
    fn get_optional_env(name: &str) -> Option<String> {
        env::var(name).ok().filter(|value| !value.trim().is_empty())
    }

    /// Accepts `http` or `https`, case-insensitively.
    fn validate_protocol(protocol: String) -> Result<String, UserVoiceError> {
        let protocol = protocol.trim().to_lowercase();
        match protocol.as_str() {
            "http" | "https" => Ok(protocol),
            _ => Err(UserVoiceError::invalid_config(
                "UV_PROTOCOL must be http or https",
            )),
        }
    }

    /// Validates the API key is not a placeholder value.
    fn validate_api_key(key: &str) -> Result<(), UserVoiceError> {
        let key_lower = key.to_lowercase();
        let placeholder_patterns = [
            "your_api_key",
            "your_key",
            "placeholder",
            "xxx",
            "changeme",
        ];

        for pattern in placeholder_patterns {
            if key_lower.contains(pattern) {
                return Err(UserVoiceError::invalid_config(
                    "UV_API_KEY appears to be a placeholder value",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_protocol() {
        assert_eq!(Config::validate_protocol("HTTPS".to_string()).unwrap(), "https");
        assert_eq!(Config::validate_protocol(" http ".to_string()).unwrap(), "http");
        assert!(Config::validate_protocol("ftp".to_string()).is_err());
    }

    #[test]
    fn test_validate_api_key_rejects_placeholder() {
        assert!(Config::validate_api_key("your_api_key_here").is_err());
    }

    #[test]
    fn test_validate_api_key_accepts_real_key() {
        assert!(Config::validate_api_key("aBc123dEf456").is_ok());
    }

    #[test]
    fn test_client_options_carry_everything() {
        let config = Config {
            subdomain: "acme".to_string(),
            api_key: "key".to_string(),
            api_secret: Some("secret".to_string()),
            callback: None,
            access_token: Some(Token::new("t", "s")),
            domain: Some("example.com".to_string()),
            protocol: Some("http".to_string()),
            base_url: None,
        };
        let options = config.client_options();
        assert_eq!(options.server_url(), "http://acme.example.com");
        assert_eq!(options.api_secret.as_deref(), Some("secret"));
        assert_eq!(options.access_token, Some(Token::new("t", "s")));
    }
}
