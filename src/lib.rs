//! # UserVoice
//!
//! A client for the UserVoice REST API.
//!
//! ## Features
//!
//! - **OAuth 1.0a**: three-legged authorization with verifier exchange,
//!   plus delegated `login_as_owner` / `login_as` for trusted API keys
//! - **Typed errors**: `errors` envelopes become `Unauthorized`, `NotFound`,
//!   `ApplicationError` or a generic API error
//! - **Collections**: list endpoints as lazily paginated, memoized sequences
//!   that fetch each page at most once
//! - **Security**: secrets are never logged or exposed in error messages
//!
//! ## Architecture
//!
//! - [`config`] - Configuration loading from environment variables
//! - [`error`] - Error types and API error classification
//! - [`client`] - Signed requests and the authentication lifecycle
//! - [`collection`] - Paginated list resources
//! - [`oauth`] - OAuth 1.0a handshake and request signing
//! - [`models`] - Response envelopes and tokens
//!
//! ## Example
//!
//! ```ignore
//! use uservoice::client::{Client, ClientOptions};
//!
//! async fn example() -> Result<(), uservoice::error::UserVoiceError> {
//!     let client = Client::new(ClientOptions::new("acme", "key").with_secret("secret"))?;
//!
//!     // Three-legged flow
//!     let mut client = client;
//!     println!("Visit {}", client.authorize_url().await?);
//!     let user = client.login_with_verifier("verifier-from-user").await?;
//!
//!     let me = user.get("/api/v1/users/current").await?;
//!     println!("Hello {}", me["user"]["name"]);
//!
//!     let tickets = user.collection("/api/v1/tickets", None);
//!     println!("{} tickets", tickets.size().await?);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod client;
pub mod collection;
pub mod config;
pub mod error;
pub mod models;
pub mod oauth;

pub use client::{Client, ClientOptions};
pub use collection::Collection;
pub use error::{Result, UserVoiceError};
