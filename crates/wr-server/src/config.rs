//! Service configuration from environment variables.
//!
//! A `.env` file in the working directory is honoured (loaded by `main`
//! before [`Config::from_env`] runs).
//!
//! | Variable                | Default                                  |
//! |-------------------------|------------------------------------------|
//! | `LISTEN_ADDR`           | `0.0.0.0:8000`                           |
//! | `GEOCODER`              | `nominatim` (or `google`)                |
//! | `GOOGLE_API_KEY`        | required for `google`; falls back to `NEXT_PUBLIC_GOOGLE_API_KEY` |
//! | `GOOGLE_GEOCODE_URL`    | `https://maps.googleapis.com`            |
//! | `NOMINATIM_URL`         | `https://nominatim.openstreetmap.org`    |
//! | `GEOCODER_USER_AGENT`   | `walkroute/<version>`                    |
//! | `GEOCODER_TIMEOUT_SECS` | `10`                                     |
//! | `GRAPH_SOURCE`          | `bundle` (or `overpass`, `pbf`)          |
//! | `GRAPH_PATH`            | `graph_bundle.json`                      |
//! | `OVERPASS_URL`          | `https://overpass-api.de/api/interpreter`|
//! | `GRAPH_BBOX`            | `37.70,-122.52,37.83,-122.35`            |
//! | `GRAPH_LARGEST_COMPONENT` | `true`                                 |
//! | `SNAP_WARN_M`           | `500`                                    |
//! | `CORS_ORIGINS`          | `*`                                      |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};

use wr_core::BBox;
use wr_geocode::{ClientSettings, Geocoder, GoogleGeocoder, NominatimGeocoder};

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_GRAPH_PATH: &str = "graph_bundle.json";
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";
/// San Francisco.
pub const DEFAULT_BBOX: &str = "37.70,-122.52,37.83,-122.35";
pub const DEFAULT_SNAP_WARN_M: f64 = 500.0;
pub const DEFAULT_GEOCODER_TIMEOUT_SECS: u64 = 10;

/// Which geocoding backend answers address lookups.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocoderConfig {
    Google { api_key: String, base_url: String },
    Nominatim { base_url: String },
}

impl GeocoderConfig {
    /// Instantiate the configured backend.
    pub fn build(&self, client: &ClientSettings) -> anyhow::Result<Arc<dyn Geocoder>> {
        let geocoder: Arc<dyn Geocoder> = match self {
            GeocoderConfig::Google { api_key, base_url } => Arc::new(
                GoogleGeocoder::new(api_key.as_str(), client)
                    .context("failed to build Google geocoder")?
                    .with_base_url(base_url.as_str()),
            ),
            GeocoderConfig::Nominatim { base_url } => Arc::new(
                NominatimGeocoder::new(client)
                    .context("failed to build Nominatim geocoder")?
                    .with_base_url(base_url.as_str()),
            ),
        };
        Ok(geocoder)
    }
}

/// Where the walk network comes from at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphSource {
    /// Prepared JSON file or CSV directory.
    Bundle(PathBuf),
    /// Fetched from an Overpass endpoint for a fixed area.
    Overpass { url: String, bbox: BBox, keep_largest: bool },
    /// Local OSM PBF extract (needs the `osm` feature).
    Pbf { path: PathBuf, keep_largest: bool },
}

/// Allowed CORS origins.
#[derive(Debug, Clone, PartialEq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr:  SocketAddr,
    pub geocoder:     GeocoderConfig,
    pub client:       ClientSettings,
    pub graph:        GraphSource,
    pub snap_warn_m:  f64,
    pub cors_origins: CorsOrigins,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any variable source.  Unset and empty variables
    /// are treated alike.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let or = |name: &str, default: &str| var(name).unwrap_or_else(|| default.to_string());

        let listen_addr = parse_var("LISTEN_ADDR", &or("LISTEN_ADDR", DEFAULT_LISTEN_ADDR))?;

        let geocoder = match or("GEOCODER", "nominatim").to_ascii_lowercase().as_str() {
            "google" => GeocoderConfig::Google {
                api_key: var("GOOGLE_API_KEY")
                    .or_else(|| var("NEXT_PUBLIC_GOOGLE_API_KEY"))
                    .ok_or_else(|| anyhow!("GOOGLE_API_KEY not set (required for GEOCODER=google)"))?,
                base_url: or("GOOGLE_GEOCODE_URL", wr_geocode::google::DEFAULT_BASE_URL),
            },
            "nominatim" => GeocoderConfig::Nominatim {
                base_url: or("NOMINATIM_URL", wr_geocode::nominatim::DEFAULT_BASE_URL),
            },
            other => bail!("GEOCODER: unknown backend {other:?} (expected \"google\" or \"nominatim\")"),
        };

        let mut client = ClientSettings::default();
        if let Some(ua) = var("GEOCODER_USER_AGENT") {
            client.user_agent = ua;
        }
        let timeout_secs: u64 = match var("GEOCODER_TIMEOUT_SECS") {
            Some(v) => parse_var("GEOCODER_TIMEOUT_SECS", &v)?,
            None => DEFAULT_GEOCODER_TIMEOUT_SECS,
        };
        if timeout_secs == 0 {
            bail!("GEOCODER_TIMEOUT_SECS: must be at least 1");
        }
        client.timeout = Duration::from_secs(timeout_secs);

        let keep_largest = match var("GRAPH_LARGEST_COMPONENT") {
            Some(v) => parse_bool("GRAPH_LARGEST_COMPONENT", &v)?,
            None => true,
        };
        let graph = match or("GRAPH_SOURCE", "bundle").to_ascii_lowercase().as_str() {
            "bundle" => GraphSource::Bundle(or("GRAPH_PATH", DEFAULT_GRAPH_PATH).into()),
            "overpass" => GraphSource::Overpass {
                url: or("OVERPASS_URL", DEFAULT_OVERPASS_URL),
                bbox: parse_var("GRAPH_BBOX", &or("GRAPH_BBOX", DEFAULT_BBOX))?,
                keep_largest,
            },
            "pbf" => GraphSource::Pbf {
                path: var("GRAPH_PATH")
                    .ok_or_else(|| anyhow!("GRAPH_PATH not set (required for GRAPH_SOURCE=pbf)"))?
                    .into(),
                keep_largest,
            },
            other => bail!("GRAPH_SOURCE: unknown source {other:?} (expected bundle, overpass or pbf)"),
        };

        let snap_warn_m: f64 = match var("SNAP_WARN_M") {
            Some(v) => parse_var("SNAP_WARN_M", &v)?,
            None => DEFAULT_SNAP_WARN_M,
        };
        if !snap_warn_m.is_finite() || snap_warn_m < 0.0 {
            bail!("SNAP_WARN_M: must be a finite, non-negative distance in metres (got {snap_warn_m})");
        }

        let cors_origins = match var("CORS_ORIGINS") {
            None => CorsOrigins::Any,
            Some(v) if v.trim() == "*" => CorsOrigins::Any,
            Some(v) => CorsOrigins::List(
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            ),
        };

        Ok(Self { listen_addr, geocoder, client, graph, snap_warn_m, cors_origins })
    }

    /// Log the effective configuration.  The API key is never printed.
    pub fn log(&self) {
        match &self.geocoder {
            GeocoderConfig::Google { base_url, .. } => {
                tracing::info!(backend = "google", base_url = %base_url, "geocoder configured");
            }
            GeocoderConfig::Nominatim { base_url } => {
                tracing::info!(backend = "nominatim", base_url = %base_url, "geocoder configured");
            }
        }
        tracing::info!(
            listen_addr = %self.listen_addr,
            graph = ?self.graph,
            timeout = ?self.client.timeout,
            snap_warn_m = self.snap_warn_m,
            cors = ?self.cors_origins,
            "configuration loaded"
        );
    }
}

fn parse_var<T>(name: &str, value: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("{name}: invalid value {value:?}"))
}

fn parse_bool(name: &str, value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => bail!("{name}: invalid boolean {value:?}"),
    }
}
