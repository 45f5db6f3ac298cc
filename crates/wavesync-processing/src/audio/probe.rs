//! Remote duration probe
//!
//! Strategy A streams a 1 MiB prefix (`Range: bytes=0-1048576`) into the container
//! parser. Strategy B, reserved for known object-storage hosts that sometimes reject
//! ranged requests, buffers up to 5 MiB of the whole file and parses that.

use super::error::ProbeError;
use super::parse::{read_duration_secs, FormatHint};
use super::source::ForwardOnlySource;
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, RANGE};
use reqwest::{Response, Url};
use std::io::{self, Cursor};
use std::time::Instant;
use symphonia::core::io::MediaSource;
use tokio::io::AsyncReadExt;
use tokio_util::io::{StreamReader, SyncIoBridge};
use tokio_util::sync::CancellationToken;
use wavesync_core::models::DurationProbeResult;
use wavesync_core::ProbeSettings;

/// Determines the duration of a remote audio resource.
#[async_trait]
pub trait DurationProbe: Send + Sync {
    async fn probe(&self, url: &str) -> Result<DurationProbeResult, ProbeError>;
}

/// HTTP + container-header implementation of [`DurationProbe`].
#[derive(Clone)]
pub struct AudioMetadataExtractor {
    client: reqwest::Client,
    settings: ProbeSettings,
}

impl AudioMetadataExtractor {
    pub fn new(settings: ProbeSettings) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, settings })
    }

    pub fn with_client(client: reqwest::Client, settings: ProbeSettings) -> Self {
        Self { client, settings }
    }

    /// Whether `url` may be re-fetched whole: its host equals, or is a subdomain of, a fallback host.
    pub fn is_fallback_host(&self, url: &Url) -> bool {
        let Some(host) = url.host_str().map(str::to_lowercase) else {
            return false;
        };
        self.settings.fallback_hosts.iter().any(|allowed| {
            host == *allowed || host.ends_with(&format!(".{}", allowed))
        })
    }

    /// Strategy A, bounded by the overall probe deadline.
    async fn probe_ranged(&self, url: &Url) -> Result<f64, ProbeError> {
        let token = CancellationToken::new();
        // Cancelling ends the body stream, which unblocks the parser thread on every exit path.
        let _guard = token.clone().drop_guard();

        tokio::time::timeout(self.settings.deadline, self.probe_ranged_inner(url, token))
            .await
            .map_err(|_| ProbeError::Timeout("probe deadline"))?
    }

    async fn probe_ranged_inner(
        &self,
        url: &Url,
        token: CancellationToken,
    ) -> Result<f64, ProbeError> {
        let head = self
            .client
            .head(url.clone())
            .timeout(self.settings.head_timeout)
            .send()
            .await?;
        ensure_success(&head)?;

        let content_type = header_str(&head, CONTENT_TYPE);
        let content_length = header_str(&head, CONTENT_LENGTH)
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|len| *len > 0);

        tracing::debug!(
            content_type = content_type.as_deref().unwrap_or("unknown"),
            size_bytes = ?content_length,
            "Probe HEAD complete"
        );

        let response = self
            .client
            .get(url.clone())
            .header(RANGE, format!("bytes=0-{}", self.settings.prefix_bytes))
            .timeout(self.settings.range_timeout)
            .send()
            .await?;
        ensure_success(&response)?;

        let format_hint = FormatHint::from_url(url, content_type);

        let body = response
            .bytes_stream()
            .map_err(io::Error::other)
            .take_until(token.cancelled_owned());
        // Servers that ignore Range still stop at the prefix.
        let reader = StreamReader::new(Box::pin(body)).take(self.settings.prefix_bytes + 1);
        let reader = SyncIoBridge::new(Box::pin(reader));

        let source = ForwardOnlySource::new(Box::new(reader), content_length);
        parse_blocking(Box::new(source), format_hint).await
    }

    /// Strategy B: bounded whole-file fetch.
    async fn probe_buffered(&self, url: &Url) -> Result<f64, ProbeError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(self.settings.fallback_timeout)
            .send()
            .await?;
        ensure_success(&response)?;

        let max_bytes = self.settings.fallback_max_bytes;
        if let Some(len) = header_str(&response, CONTENT_LENGTH).and_then(|v| v.parse::<u64>().ok()) {
            if len > max_bytes as u64 {
                return Err(ProbeError::TooLarge);
            }
        }

        let format_hint = FormatHint::from_url(url, header_str(&response, CONTENT_TYPE));

        let mut buffer = Vec::new();
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            if buffer.len() + chunk.len() > max_bytes {
                // Dropping the body here closes the connection.
                return Err(ProbeError::TooLarge);
            }
            buffer.extend_from_slice(&chunk);
        }

        tracing::debug!(size_bytes = buffer.len(), "Fallback body buffered");

        parse_blocking(Box::new(Cursor::new(buffer)), format_hint).await
    }
}

#[async_trait]
impl DurationProbe for AudioMetadataExtractor {
    #[tracing::instrument(skip(self), fields(url = %url))]
    async fn probe(&self, url: &str) -> Result<DurationProbeResult, ProbeError> {
        let url = Url::parse(url).map_err(|e| ProbeError::InvalidUrl(e.to_string()))?;
        let start = Instant::now();

        let secs = match self.probe_ranged(&url).await {
            Ok(secs) => secs,
            Err(primary) if self.is_fallback_host(&url) => {
                tracing::warn!(error = %primary, "Ranged probe failed, trying full fetch");
                self.probe_buffered(&url).await.map_err(|fallback| {
                    tracing::warn!(error = %fallback, "Fallback probe failed");
                    fallback
                })?
            }
            Err(primary) => {
                tracing::warn!(error = %primary, "Ranged probe failed");
                return Err(primary);
            }
        };

        let result = DurationProbeResult::from_secs_f64(secs).ok_or(ProbeError::NoDuration)?;

        tracing::info!(
            duration_secs = result.total_seconds,
            formatted = %result.formatted(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Duration probed"
        );

        Ok(result)
    }
}

async fn parse_blocking(
    source: Box<dyn MediaSource>,
    format_hint: FormatHint,
) -> Result<f64, ProbeError> {
    tokio::task::spawn_blocking(move || read_duration_secs(source, &format_hint))
        .await
        .map_err(|e| ProbeError::Task(e.to_string()))?
}

fn ensure_success(response: &Response) -> Result<(), ProbeError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(ProbeError::Status(response.status().as_u16()))
    }
}

fn header_str(response: &Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
