//! Orchestration: fetch each enabled source and persist its payload.
//!
//! The two fetches are independent and run sequentially, GitHub first.
//! What happens when a source's retry budget is exhausted (or its write
//! fails) is the caller's decision, expressed as [`OnExhausted`], not
//! baked into the client: GitHub data is required for the site build,
//! Medium data is not.

use anyhow::{Context, Result};
use log::{error, info, warn};
use reqwest::Client;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::http::HttpClient;
use crate::runtime::Runtime;
use crate::source::{GithubSource, MediumSource, Source};

/// What to do when a source fails past its retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnExhausted {
    /// Abort the whole run with an error.
    Fail,
    /// Log the failure and continue without this source's data.
    Skip,
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Directory the JSON payloads are written into.
    pub output_dir: PathBuf,
    /// Override for the GitHub API base URL.
    pub github_api_url: Option<String>,
    /// Override for the rss2json API base URL.
    pub medium_api_url: Option<String>,
}

/// Runs the full import for every enabled source.
#[tracing::instrument(skip(runtime, config, options))]
pub async fn import<R: Runtime>(
    runtime: &R,
    config: &Config,
    options: &ImportOptions,
) -> Result<()> {
    let http = HttpClient::new(Client::new());

    runtime
        .create_dir_all(&options.output_dir)
        .with_context(|| format!("Failed to create {}", options.output_dir.display()))?;

    match &config.github {
        Some(github) => {
            let source = GithubSource::new(github, options.github_api_url.clone());
            fetch_and_write(runtime, &http, &source, &options.output_dir, OnExhausted::Fail)
                .await?;
        }
        None => warn!("GitHub data fetching is disabled, skipping"),
    }

    match &config.medium {
        Some(medium) => {
            let source = MediumSource::new(medium, options.medium_api_url.clone());
            fetch_and_write(runtime, &http, &source, &options.output_dir, OnExhausted::Skip)
                .await?;
        }
        None => warn!("Medium data fetching is disabled, skipping"),
    }

    info!("All data fetching completed");
    Ok(())
}

/// Fetches one source and writes its payload byte-for-byte.
///
/// A failure anywhere on this path (fetch or write) is resolved by the
/// caller's exhaustion policy.
#[tracing::instrument(skip(runtime, http, source, output_dir))]
pub async fn fetch_and_write<R: Runtime, S: Source>(
    runtime: &R,
    http: &HttpClient,
    source: &S,
    output_dir: &Path,
    on_exhausted: OnExhausted,
) -> Result<()> {
    let path = output_dir.join(source.file_name());

    let outcome = match source.fetch(http).await {
        Ok(body) => write_payload(runtime, &path, body.as_bytes(), source.description()),
        Err(e) => Err(e),
    };

    match outcome {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Failed to fetch {}: {:#}", source.description(), e);
            match on_exhausted {
                OnExhausted::Fail => {
                    Err(e.context(format!("Failed to fetch {}", source.description())))
                }
                OnExhausted::Skip => {
                    warn!("Continuing without {}...", source.description());
                    Ok(())
                }
            }
        }
    }
}

fn write_payload<R: Runtime>(
    runtime: &R,
    path: &Path,
    data: &[u8],
    description: &str,
) -> Result<()> {
    runtime
        .write(path, data)
        .with_context(|| format!("Error writing {}", description))?;
    info!("Successfully saved {} to {}", description, path.display());
    Ok(())
}
