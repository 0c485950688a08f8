//! Build a JSON graph bundle for `walkroute` ahead of time.
//!
//! ```text
//! prepare_bundle --bbox 37.70,-122.52,37.83,-122.35 --out graph_bundle.json
//! prepare_bundle --pbf california-latest.osm.pbf --out ca.json   # needs --features osm
//! ```

use std::fs::File;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use wr_core::BBox;
use wr_server::config::{DEFAULT_BBOX, DEFAULT_OVERPASS_URL, GraphSource};
use wr_server::{graph, logging};
use wr_spatial::bundle::write_json;

#[derive(Parser, Debug)]
#[command(version, about = "Fetch a walk network and write it as a JSON graph bundle")]
struct Args {
    /// Area to fetch from Overpass: south,west,north,east.
    #[arg(long, default_value = DEFAULT_BBOX)]
    bbox: BBox,

    /// Read a local OSM PBF extract instead of querying Overpass.
    #[arg(long, conflicts_with = "bbox")]
    pbf: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_OVERPASS_URL)]
    overpass_url: String,

    #[arg(long, short, default_value = "graph_bundle.json")]
    out: PathBuf,

    /// Keep every connected component, not just the largest.
    #[arg(long)]
    keep_all: bool,

    #[arg(long, default_value_t = concat!("walkroute-prepare/", env!("CARGO_PKG_VERSION")).to_string())]
    user_agent: String,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    logging::init();

    if let Err(e) = run(Args::parse()).await {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let keep_largest = !args.keep_all;
    let source = match args.pbf {
        Some(path) => GraphSource::Pbf { path, keep_largest },
        None => GraphSource::Overpass { url: args.overpass_url, bbox: args.bbox, keep_largest },
    };

    let network = graph::load_network(&source, &args.user_agent).await?;

    let file = File::create(&args.out)
        .with_context(|| format!("failed to create {}", args.out.display()))?;
    write_json(&network, file)
        .with_context(|| format!("failed to write {}", args.out.display()))?;

    tracing::info!(
        out = %args.out.display(),
        nodes = network.node_count(),
        edges = network.edge_count(),
        "bundle written"
    );
    Ok(())
}
