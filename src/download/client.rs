//! Default HTTP client construction.

use std::time::Duration;

use reqwest::Client;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};

/// User-Agent sent by the default client, e.g. `rangedl/0.1.0`.
#[must_use]
pub fn default_user_agent() -> String {
    format!("rangedl/{}", env!("CARGO_PKG_VERSION"))
}

/// Builds the client used when the caller doesn't supply one.
///
/// The read timeout bounds the gap between body reads rather than the whole
/// transfer, so large chunks aren't cut off.
pub(crate) fn build_client(
    connect_timeout_secs: u64,
    read_timeout_secs: u64,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .read_timeout(Duration::from_secs(read_timeout_secs))
        .user_agent(default_user_agent())
        .build()
}

/// Builds the client with the default timeouts.
pub(crate) fn build_default_client() -> Result<Client, reqwest::Error> {
    build_client(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
}
