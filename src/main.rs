//! uservoice - dump a UserVoice list endpoint as JSON lines
//!
//! Every item of the collection at `<path>` is printed to stdout as one
//! JSON document per line. Logs go to stderr.
//!
//! # Configuration
//!
//! Set the following environment variables (or use a `.env` file):
//!
//! - `UV_SUBDOMAIN`: site subdomain, e.g. `acme`
//! - `UV_API_KEY`: consumer key
//! - `UV_API_SECRET`: consumer secret (optional)
//! - `UV_ACCESS_TOKEN` / `UV_ACCESS_TOKEN_SECRET`: act as an existing user (optional)
//! - `UV_LOGIN_AS`: `owner` or an email address, for trusted keys (optional)
//!
//! # Usage
//!
//! ```bash
//! uservoice /api/v1/tickets 250
//! UV_LOGIN_AS=owner uservoice "/api/v1/suggestions?sort=newest"
//! ```

use std::io::Write;
use std::pin::pin;

use anyhow::{bail, Context, Result};
use futures::StreamExt;
use tracing_subscriber::{fmt, EnvFilter};

use uservoice::{config, Client};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore errors if not found)
    dotenvy::dotenv().ok();

    // stdout carries the items, so logs go to stderr
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("uservoice=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: uservoice <path> [limit]");
    };
    let limit = args
        .next()
        .map(|raw| raw.parse::<usize>())
        .transpose()
        .context("limit must be a non-negative integer")?;

    let config = config::Config::from_env().context("Failed to load configuration")?;
    let client = Client::new(config.client_options()).context("Failed to create client")?;

    tracing::debug!(base_url = %client.base_url(), "Client initialized");

    let client = match std::env::var("UV_LOGIN_AS").ok().as_deref() {
        None | Some("") => client,
        Some("owner") => client
            .login_as_owner()
            .await
            .context("login as owner failed")?,
        Some(email) => client
            .login_as(email)
            .await
            .with_context(|| format!("login as {email} failed"))?,
    };

    let collection = client.collection(path.as_str(), limit);
    let size = collection
        .size()
        .await
        .with_context(|| format!("Failed to read {path}"))?;
    tracing::info!(path = %path, size = size, "Fetching collection");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut items = pin!(collection.items());
    while let Some(item) = items.next().await {
        let item = item.with_context(|| format!("Failed to read {path}"))?;
        writeln!(out, "{}", serde_json::to_string(&item)?)?;
    }

    tracing::info!("Done");

    Ok(())
}
