use anyhow::{Context, Result};
use reqwest::blocking::Client;

use crate::config::ServiceConfig;

const USER_AGENT: &str = concat!("coach_terminal/", env!("CARGO_PKG_VERSION"));

/// Blocking client for the analysis service. Without a configured timeout a
/// hung request blocks its worker thread until the service answers.
pub fn http_client(cfg: &ServiceConfig) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(cfg.request_timeout)
        .build()
        .context("failed to build http client")
}
