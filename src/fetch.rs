use crate::config::{FetchConfig, sanitize_for_path};
use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Clone)]
pub struct ArchivedPage {
    pub url: String,
    pub path: PathBuf,
    pub bytes: usize,
}

pub fn fetch_report_pages(
    urls: &[String],
    archive_dir: &Path,
    config: &FetchConfig,
) -> Result<Vec<ArchivedPage>> {
    let client = build_client(config)?;
    std::fs::create_dir_all(archive_dir)
        .with_context(|| format!("failed to create archive dir {}", archive_dir.display()))?;

    let mut pages = Vec::new();
    for url in urls {
        let file_name = archive_file_name(url)?;
        let bytes = fetch_with_retries(
            &client,
            url,
            config.retry_attempts,
            config.retry_backoff_ms,
        )?;

        let path = archive_dir.join(&file_name);
        std::fs::write(&path, &bytes)
            .with_context(|| format!("failed to write archived page {}", path.display()))?;

        info!(%url, file = %path.display(), bytes = bytes.len(), "archived page");
        pages.push(ArchivedPage {
            url: url.clone(),
            path,
            bytes: bytes.len(),
        });
    }

    Ok(pages)
}

fn build_client(config: &FetchConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    for (k, v) in &config.headers {
        let name = HeaderName::from_bytes(k.as_bytes())
            .with_context(|| format!("invalid header name {k}"))?;
        let value =
            HeaderValue::from_str(v).with_context(|| format!("invalid header value for {k}"))?;
        headers.insert(name, value);
    }

    if let Some(user_agent) = &config.user_agent {
        headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);
    }

    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .default_headers(headers)
        .build()
        .context("failed to build reqwest client")
}

fn fetch_with_retries(
    client: &Client,
    url: &str,
    retry_attempts: u8,
    retry_backoff_ms: u64,
) -> Result<Vec<u8>> {
    let attempts = retry_attempts.max(1);

    for attempt in 1..=attempts {
        match client.get(url).send() {
            Ok(resp) => {
                if !resp.status().is_success() {
                    let status = resp.status();
                    if attempt == attempts {
                        bail!("request to {url} failed with status {status}");
                    }
                    warn!(%url, %status, attempt, "request failed; retrying");
                } else {
                    return Ok(resp.bytes()?.to_vec());
                }
            }
            Err(err) => {
                if attempt == attempts {
                    return Err(err).with_context(|| format!("request to {url} failed"));
                }
                warn!(%url, attempt, error = %err, "request errored; retrying");
            }
        }

        std::thread::sleep(Duration::from_millis(retry_backoff_ms));
    }

    bail!("request to {url} failed after retries")
}

// Last path segment plus `.html`; bare hosts fall back to host and path.
pub fn archive_file_name(url: &str) -> Result<String> {
    let parsed = Url::parse(url).with_context(|| format!("invalid report url {url}"))?;

    let segment = parsed
        .path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .map(ToString::to_string);

    let name = match segment {
        Some(segment) => sanitize_for_path(&segment),
        None => sanitize_for_path(&format!(
            "{}{}",
            parsed.host_str().unwrap_or_default(),
            parsed.path()
        )),
    };
    if name.is_empty() {
        bail!("cannot derive an archive file name from {url}");
    }

    let is_html = Path::new(&name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"));
    if is_html {
        Ok(name)
    } else {
        Ok(format!("{name}.html"))
    }
}
