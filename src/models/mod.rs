//! Data models for the UserVoice API.
//!
//! This module contains the response envelopes the client inspects
//! (errors, paginated lists, delegated-login replies) and the OAuth
//! token pair.

mod envelope;
mod token;

pub use envelope::*;
pub use token::*;
