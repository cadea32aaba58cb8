//! Gmail integration
//!
//! Sends mail through the Gmail REST API (`users.messages.send`) and keeps
//! the OAuth access token fresh via Google's token endpoint.
//!
//! ## Flow
//!
//! 1. [`GoogleToken`] and [`ClientSecretFile`] are read from the JSON files
//!    produced by Google's installed-app OAuth flow.
//! 2. [`OAuthClient::refresh`] exchanges the refresh token for an access token.
//! 3. [`build_raw_message`] renders a multipart/alternative MIME message and
//!    [`GmailClient::send_raw`] submits it.

mod client;
mod config;
mod error;
mod mime;
mod oauth;
mod token;

pub use client::{GmailClient, SentMessage};
pub use config::GmailConfig;
pub use error::GmailError;
pub use mime::{EmailComposition, build_raw_message, encode_raw};
pub use oauth::{OAuthClient, RefreshedToken};
pub use token::{ClientSecretFile, GoogleToken, OAuthClientInfo, parse_expiry};
