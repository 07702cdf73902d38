//! Block blob upload to a pre-signed (SAS) URL.
//!
//! Small files go up in a single `PUT`. Larger files are staged as blocks
//! and committed with a block list. Transient failures are retried with
//! exponential backoff.

use std::path::Path;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use tokio::io::AsyncReadExt;

use crate::core::http::{classify_send_error, snippet};
use crate::core::models::Metadata;
use crate::error::{PfmpError, Result};

const BLOB_TYPE_HEADER: &str = "x-ms-blob-type";
const VERSION_HEADER: &str = "x-ms-version";
const STORAGE_VERSION: &str = "2021-08-06";
const META_PREFIX: &str = "x-ms-meta-";
const MIB: u64 = 1024 * 1024;

/// Retry and chunking settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadSettings {
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub block_size: u64,
    pub single_put_limit: u64,
    pub timeout: Duration,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_base_delay: Duration::from_millis(4000),
            block_size: 4 * MIB,
            single_put_limit: 64 * MIB,
            timeout: crate::core::http::DEFAULT_TIMEOUT,
        }
    }
}

/// Outcome of a successful upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadReport {
    pub bytes: u64,
    /// Zero for a single `PUT`.
    pub blocks: usize,
}

/// Uploads files to block blobs.
#[derive(Debug, Clone)]
pub struct BlobUploader {
    http: Client,
    settings: UploadSettings,
}

/// Whether a storage response status is worth retrying.
#[must_use]
pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 408 | 429)
        || (status.is_server_error()
            && status != StatusCode::NOT_IMPLEMENTED
            && status != StatusCode::HTTP_VERSION_NOT_SUPPORTED)
}

/// Delay before retry number `attempt` (zero-based).
#[must_use]
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}

/// Block id for block `index`. All ids of a blob must have the same length.
#[must_use]
pub fn block_id(index: usize) -> String {
    STANDARD.encode(format!("block-{index:08}"))
}

/// XML body committing `ids` in order.
#[must_use]
pub fn block_list_xml(ids: &[String]) -> String {
    let mut xml = String::from(r#"<?xml version="1.0" encoding="utf-8"?><BlockList>"#);
    for id in ids {
        xml.push_str("<Latest>");
        xml.push_str(id);
        xml.push_str("</Latest>");
    }
    xml.push_str("</BlockList>");
    xml
}

fn metadata_headers(metadata: &Metadata) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (key, value) in metadata {
        let name = HeaderName::from_bytes(format!("{META_PREFIX}{}", key.to_lowercase()).as_bytes())
            .map_err(|_| PfmpError::InvalidArgument(format!("invalid metadata key '{key}'")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| PfmpError::InvalidArgument(format!("invalid metadata value for '{key}'")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

fn with_query(url: &Url, pairs: &[(&str, &str)]) -> Url {
    let mut url = url.clone();
    {
        let mut query = url.query_pairs_mut();
        for (key, value) in pairs {
            query.append_pair(key, value);
        }
    }
    url
}

async fn read_chunk(file: &mut tokio::fs::File, size: u64) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    file.take(size).read_to_end(&mut buf).await?;
    Ok(buf)
}

impl BlobUploader {
    #[must_use]
    pub const fn new(http: Client, settings: UploadSettings) -> Self {
        Self { http, settings }
    }

    #[must_use]
    pub const fn settings(&self) -> &UploadSettings {
        &self.settings
    }

    /// Upload `path` to `sas_url`, attaching `metadata` to the blob.
    ///
    /// # Errors
    /// Returns `InvalidArgument` for a malformed URL or metadata, `Io` if the
    /// file cannot be read, and `Upload`/`Network`/`Timeout` once retries are
    /// exhausted.
    pub async fn upload_file(
        &self,
        sas_url: &str,
        path: &Path,
        metadata: &Metadata,
    ) -> Result<UploadReport> {
        let url = Url::parse(sas_url)
            .map_err(|e| PfmpError::InvalidArgument(format!("invalid upload URL: {e}")))?;
        let meta = metadata_headers(metadata)?;
        let mut file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len();

        if size <= self.settings.single_put_limit {
            tracing::debug!(size, "uploading blob in a single request");
            let body = read_chunk(&mut file, size).await?;
            self.send_with_retry("put blob", || {
                self.http
                    .put(url.clone())
                    .header(BLOB_TYPE_HEADER, "BlockBlob")
                    .header(VERSION_HEADER, STORAGE_VERSION)
                    .headers(meta.clone())
                    .body(body.clone())
            })
            .await?;
            return Ok(UploadReport {
                bytes: size,
                blocks: 0,
            });
        }

        let block_size = self.settings.block_size.max(1);
        let mut ids = Vec::new();
        let mut sent = 0u64;
        while sent < size {
            let chunk = read_chunk(&mut file, block_size).await?;
            if chunk.is_empty() {
                break;
            }
            let id = block_id(ids.len());
            let block_url = with_query(&url, &[("comp", "block"), ("blockid", &id)]);
            self.send_with_retry("put block", || {
                self.http
                    .put(block_url.clone())
                    .header(VERSION_HEADER, STORAGE_VERSION)
                    .body(chunk.clone())
            })
            .await?;
            sent += chunk.len() as u64;
            tracing::debug!(block = ids.len(), sent, size, "block uploaded");
            ids.push(id);
        }

        let list_url = with_query(&url, &[("comp", "blocklist")]);
        let xml = block_list_xml(&ids);
        self.send_with_retry("put block list", || {
            self.http
                .put(list_url.clone())
                .header(VERSION_HEADER, STORAGE_VERSION)
                .header(reqwest::header::CONTENT_TYPE, "application/xml")
                .headers(meta.clone())
                .body(xml.clone())
        })
        .await?;

        Ok(UploadReport {
            bytes: sent,
            blocks: ids.len(),
        })
    }

    /// Send a request built by `build`, retrying transient failures.
    async fn send_with_retry<F>(&self, what: &str, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0u32;
        loop {
            let error = match build().timeout(self.settings.timeout).send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    let error = PfmpError::Upload {
                        status: Some(status.as_u16()),
                        message: format!("{what} returned {status}: {}", snippet(&body)),
                    };
                    if !is_retryable_status(status) {
                        return Err(error);
                    }
                    error
                }
                Err(e) if e.is_connect() || e.is_timeout() || e.is_request() => {
                    classify_send_error(&e, self.settings.timeout)
                }
                Err(e) => return Err(classify_send_error(&e, self.settings.timeout)),
            };

            if attempt >= self.settings.max_retries {
                tracing::warn!(what, attempts = attempt + 1, "giving up on upload request");
                return Err(error);
            }
            let delay = backoff_delay(self.settings.retry_base_delay, attempt);
            tracing::debug!(what, attempt, ?delay, error = %error, "retrying upload request");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_statuses() {
        for code in [408, 429, 500, 502, 503, 504] {
            assert!(is_retryable_status(StatusCode::from_u16(code).unwrap()), "{code}");
        }
        for code in [400, 403, 404, 409, 501, 505] {
            assert!(!is_retryable_status(StatusCode::from_u16(code).unwrap()), "{code}");
        }
    }

    #[test]
    fn backoff_doubles() {
        let base = Duration::from_millis(4000);
        assert_eq!(backoff_delay(base, 0), Duration::from_millis(4000));
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(8000));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(32000));
    }

    #[test]
    fn block_ids_have_equal_length() {
        let first = block_id(0);
        let later = block_id(12_345);
        assert_eq!(first.len(), later.len());
        assert_ne!(first, later);
    }

    #[test]
    fn block_list_keeps_order() {
        let xml = block_list_xml(&["a".to_string(), "b".to_string()]);
        assert!(xml.ends_with("<BlockList><Latest>a</Latest><Latest>b</Latest></BlockList>"));
    }

    #[test]
    fn query_pairs_are_appended_to_sas() {
        let url = Url::parse("https://acct.blob.core.windows.net/c/a.zip?sv=1&sig=x%2By").unwrap();
        let block = with_query(&url, &[("comp", "block"), ("blockid", "YQ==")]);
        let query = block.query().unwrap();
        assert!(query.starts_with("sv=1&sig=x%2By&comp=block&blockid="));
        let pairs: Vec<(String, String)> = block.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("blockid".to_string(), "YQ==".to_string())));
    }

    #[test]
    fn metadata_becomes_prefixed_headers() {
        let mut metadata = Metadata::new();
        metadata.insert("Version".to_string(), "1.2".to_string());
        let headers = metadata_headers(&metadata).unwrap();
        assert_eq!(headers.get("x-ms-meta-version").unwrap(), "1.2");

        metadata.insert("bad key".to_string(), "x".to_string());
        assert!(metadata_headers(&metadata).is_err());
    }
}
