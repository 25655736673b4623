//! Size probing: learns the resource length and confirms range support.
//!
//! A `HEAD` is tried first. When the server rejects it (405/403) or omits
//! `Content-Length`, a `GET` with `Range: bytes=0-0` is sent instead and the
//! total is read from the trailing `/TOTAL` of `Content-Range`. The prober
//! never retries.

use reqwest::header::{ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, RANGE};
use reqwest::{Client, Response, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};
use url::Url;

use super::DownloadError;

/// What the probe learned about the remote resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceInfo {
    /// Length of the resource in bytes.
    pub total_size: u64,
    /// False when the `HEAD` answer carries `Accept-Ranges: none`; true for
    /// any size learned through a 206 answer.
    pub range_supported: bool,
}

/// Probes `url` for its length.
///
/// # Errors
///
/// - [`DownloadError::ProbeTransport`] if a probe request fails below HTTP
/// - [`DownloadError::ResourceMissing`] on 404
/// - [`DownloadError::RangeUnsupported`] on 416 or a non-206 answer to the
///   `bytes=0-0` probe
/// - [`DownloadError::ProbeFailed`] when neither strategy yields a length
/// - [`DownloadError::Cancelled`] if `cancel` fires first
#[instrument(skip(client, cancel), fields(url = %url))]
pub async fn probe(
    client: &Client,
    url: &Url,
    cancel: &CancellationToken,
) -> Result<ResourceInfo, DownloadError> {
    let response = cancel
        .run_until_cancelled(client.head(url.clone()).send())
        .await
        .ok_or_else(|| DownloadError::cancelled(url.as_str()))?
        // Transport failure is checked before looking at any status.
        .map_err(|e| DownloadError::probe_transport(url.as_str(), e))?;

    let status = response.status();
    match status {
        StatusCode::NOT_FOUND => return Err(DownloadError::resource_missing(url.as_str())),
        StatusCode::RANGE_NOT_SATISFIABLE => {
            return Err(DownloadError::range_unsupported(url.as_str(), status.as_u16()));
        }
        StatusCode::METHOD_NOT_ALLOWED | StatusCode::FORBIDDEN => {
            debug!(status = status.as_u16(), "HEAD rejected, falling back to ranged GET");
        }
        s if s.is_success() => {
            if let Some(total_size) = header_u64(&response, CONTENT_LENGTH.as_str()) {
                let range_supported = !declines_ranges(&response);
                debug!(total_size, range_supported, "size from HEAD");
                return Ok(ResourceInfo {
                    total_size,
                    range_supported,
                });
            }
            debug!("HEAD has no Content-Length, falling back to ranged GET");
        }
        s => {
            return Err(DownloadError::probe_failed(
                url.as_str(),
                format!("HEAD returned HTTP {}", s.as_u16()),
            ));
        }
    }

    probe_with_range_get(client, url, cancel).await
}

async fn probe_with_range_get(
    client: &Client,
    url: &Url,
    cancel: &CancellationToken,
) -> Result<ResourceInfo, DownloadError> {
    let response = cancel
        .run_until_cancelled(client.get(url.clone()).header(RANGE, "bytes=0-0").send())
        .await
        .ok_or_else(|| DownloadError::cancelled(url.as_str()))?
        .map_err(|e| DownloadError::probe_transport(url.as_str(), e))?;

    let status = response.status();
    match status {
        StatusCode::PARTIAL_CONTENT => {
            let total_size = response
                .headers()
                .get(CONTENT_RANGE)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_content_range_total)
                .ok_or_else(|| {
                    DownloadError::probe_failed(url.as_str(), "missing or unparsable Content-Range")
                })?;
            debug!(total_size, "size from Content-Range");
            Ok(ResourceInfo {
                total_size,
                range_supported: true,
            })
        }
        StatusCode::NOT_FOUND => Err(DownloadError::resource_missing(url.as_str())),
        StatusCode::METHOD_NOT_ALLOWED | StatusCode::FORBIDDEN => Err(DownloadError::probe_failed(
            url.as_str(),
            format!("HEAD and ranged GET both rejected (HTTP {})", status.as_u16()),
        )),
        _ => Err(DownloadError::range_unsupported(url.as_str(), status.as_u16())),
    }
}

fn header_u64(response: &Response, name: &str) -> Option<u64> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

fn declines_ranges(response: &Response) -> bool {
    response
        .headers()
        .get(ACCEPT_RANGES)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("none"))
}

/// Extracts `TOTAL` from a `Content-Range: bytes S-E/TOTAL` value.
///
/// Returns `None` for an unknown (`*`) or malformed total.
#[must_use]
pub fn parse_content_range_total(value: &str) -> Option<u64> {
    let (_, total) = value.rsplit_once('/')?;
    total.trim().parse().ok()
}
