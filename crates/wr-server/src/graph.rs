//! Startup graph loading for every [`GraphSource`].

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context};

use wr_core::BBox;
use wr_spatial::{overpass, WalkNetwork};

use crate::config::GraphSource;

/// Overpass server-side timeout, in seconds.  The HTTP timeout adds slack
/// on top so the server reports its own timeout first.
pub const OVERPASS_TIMEOUT_SECS: u32 = 180;

/// Load (or fetch and build) the walk network.  An empty result is an error.
pub async fn load_network(source: &GraphSource, user_agent: &str) -> anyhow::Result<WalkNetwork> {
    let started = Instant::now();
    let network = match source {
        GraphSource::Bundle(path) => load_bundle(path.clone()).await?,
        GraphSource::Overpass { url, bbox, keep_largest } => {
            let body = fetch_overpass(url, bbox, OVERPASS_TIMEOUT_SECS, user_agent).await?;
            let keep_largest = *keep_largest;
            tokio::task::spawn_blocking(move || overpass::network_from_json(&body, keep_largest))
                .await
                .context("overpass parse task panicked")?
                .context("failed to build network from overpass response")?
        }
        GraphSource::Pbf { path, keep_largest } => load_pbf(path, *keep_largest).await?,
    };

    if network.is_empty() {
        bail!("walk network from {source:?} has no nodes");
    }
    tracing::info!(
        nodes = network.node_count(),
        edges = network.edge_count(),
        elapsed = ?started.elapsed(),
        "walk network ready"
    );
    Ok(network)
}

async fn load_bundle(path: PathBuf) -> anyhow::Result<WalkNetwork> {
    tracing::info!(path = %path.display(), "loading graph bundle");
    tokio::task::spawn_blocking(move || {
        wr_spatial::bundle::load_bundle(&path)
            .with_context(|| format!("failed to load graph bundle {}", path.display()))
    })
    .await
    .context("bundle load task panicked")?
}

#[cfg(feature = "osm")]
async fn load_pbf(path: &Path, keep_largest: bool) -> anyhow::Result<WalkNetwork> {
    tracing::info!(path = %path.display(), "loading OSM PBF extract");
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        wr_spatial::osm::load_from_pbf(&path, keep_largest)
            .with_context(|| format!("failed to load PBF {}", path.display()))
    })
    .await
    .context("pbf load task panicked")?
}

#[cfg(not(feature = "osm"))]
async fn load_pbf(path: &Path, _keep_largest: bool) -> anyhow::Result<WalkNetwork> {
    bail!(
        "cannot load {}: PBF support requires building with `--features osm`",
        path.display()
    )
}

/// POST the walk query for `bbox` to an Overpass endpoint and return the
/// raw `[out:json]` body.
pub async fn fetch_overpass(
    url: &str,
    bbox: &BBox,
    timeout_secs: u32,
    user_agent: &str,
) -> anyhow::Result<String> {
    let query = overpass::walk_query(bbox, timeout_secs);
    tracing::info!(url, %bbox, "fetching walk network from overpass");

    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(u64::from(timeout_secs) + 30))
        .build()
        .context("failed to build HTTP client")?;

    let body = client
        .post(url)
        .form(&[("data", query.as_str())])
        .send()
        .await
        .with_context(|| format!("overpass request to {url} failed"))?
        .error_for_status()
        .context("overpass returned an error status")?
        .text()
        .await
        .context("failed to read overpass response")?;

    tracing::debug!(bytes = body.len(), "overpass response received");
    Ok(body)
}
