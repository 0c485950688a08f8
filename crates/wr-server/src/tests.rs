//! Unit tests for wr-server.
//!
//! The HTTP surface is driven in-process with `tower::ServiceExt::oneshot`;
//! geocoding is answered by `StaticGeocoder` so nothing leaves the machine.

#[cfg(test)]
mod helpers {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use wr_core::GeoPoint;
    use wr_geocode::StaticGeocoder;
    use wr_spatial::{DijkstraRouter, WalkNetwork, WalkNetworkBuilder};

    use crate::api::{self, ROUTE_PATH};
    use crate::config::CorsOrigins;
    use crate::service::RouteService;

    /// A(0,0) – B(0,1) – C(0,2), unit weights, plus an island D(10,10) – E(10,11).
    pub fn toy_network() -> WalkNetwork {
        let mut b = WalkNetworkBuilder::new();
        let a = b.add_node(GeoPoint::new(0.0, 0.0), 1);
        let bb = b.add_node(GeoPoint::new(0.0, 1.0), 2);
        let c = b.add_node(GeoPoint::new(0.0, 2.0), 3);
        let d = b.add_node(GeoPoint::new(10.0, 10.0), 4);
        let e = b.add_node(GeoPoint::new(10.0, 11.0), 5);
        b.add_road(a, bb, 1.0).unwrap();
        b.add_road(bb, c, 1.0).unwrap();
        b.add_road(d, e, 1.0).unwrap();
        b.build()
    }

    pub fn toy_geocoder() -> StaticGeocoder {
        StaticGeocoder::new()
            .with("Alpha Street", GeoPoint::new(0.0, 0.0))
            .with("Bravo Street", GeoPoint::new(0.001, 1.0))
            .with("Charlie Street", GeoPoint::new(0.0, 2.0))
            .with("Charlie Corner", GeoPoint::new(0.0001, 2.0001))
            .with("Delta Island", GeoPoint::new(10.0, 10.0))
            .with("Far Away", GeoPoint::new(-40.0, 170.0))
            .with_failure("Flaky Street")
    }

    pub fn service() -> Arc<RouteService> {
        Arc::new(RouteService::new(
            Arc::new(toy_network()),
            Arc::new(toy_geocoder()),
            Arc::new(DijkstraRouter),
            500.0,
        ))
    }

    pub fn app() -> axum::Router {
        let cors = api::cors_layer(&CorsOrigins::Any).unwrap();
        api::router(service(), cors)
    }

    pub async fn send(app: axum::Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, body)
    }

    pub async fn post_route(start: &str, end: &str) -> (StatusCode, Value) {
        let body = json!({"start_address": start, "end_address": end}).to_string();
        let req = Request::post(ROUTE_PATH)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        send(app(), req).await
    }
}

// ── Config ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    use wr_core::BBox;

    use crate::config::{Config, CorsOrigins, GeocoderConfig, GraphSource};

    fn from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = from(&[]).unwrap();
        assert_eq!(cfg.listen_addr.to_string(), "0.0.0.0:8000");
        assert_eq!(
            cfg.geocoder,
            GeocoderConfig::Nominatim { base_url: wr_geocode::nominatim::DEFAULT_BASE_URL.into() }
        );
        assert_eq!(cfg.graph, GraphSource::Bundle(PathBuf::from("graph_bundle.json")));
        assert_eq!(cfg.client.timeout, Duration::from_secs(10));
        assert_eq!(cfg.snap_warn_m, 500.0);
        assert_eq!(cfg.cors_origins, CorsOrigins::Any);
    }

    #[test]
    fn google_key_and_alias() {
        let cfg = from(&[("GEOCODER", "Google"), ("GOOGLE_API_KEY", "k1")]).unwrap();
        assert!(matches!(cfg.geocoder, GeocoderConfig::Google { ref api_key, .. } if api_key == "k1"));

        let cfg = from(&[("GEOCODER", "google"), ("NEXT_PUBLIC_GOOGLE_API_KEY", "k2")]).unwrap();
        assert!(matches!(cfg.geocoder, GeocoderConfig::Google { ref api_key, .. } if api_key == "k2"));

        let err = from(&[("GEOCODER", "google"), ("GOOGLE_API_KEY", "  ")]).unwrap_err();
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn overpass_source() {
        let cfg = from(&[
            ("GRAPH_SOURCE", "overpass"),
            ("GRAPH_BBOX", "37.76,-122.43,37.78,-122.41"),
            ("GRAPH_LARGEST_COMPONENT", "no"),
        ])
        .unwrap();
        assert_eq!(
            cfg.graph,
            GraphSource::Overpass {
                url: crate::config::DEFAULT_OVERPASS_URL.into(),
                bbox: BBox::new(37.76, -122.43, 37.78, -122.41).unwrap(),
                keep_largest: false,
            }
        );
    }

    #[test]
    fn pbf_needs_path() {
        assert!(from(&[("GRAPH_SOURCE", "pbf")]).is_err());
        let cfg = from(&[("GRAPH_SOURCE", "pbf"), ("GRAPH_PATH", "sf.osm.pbf")]).unwrap();
        assert_eq!(cfg.graph, GraphSource::Pbf { path: "sf.osm.pbf".into(), keep_largest: true });
    }

    #[test]
    fn cors_list_and_overrides() {
        let cfg = from(&[
            ("CORS_ORIGINS", "http://localhost:3000, https://walk.example"),
            ("LISTEN_ADDR", "127.0.0.1:9000"),
            ("GEOCODER_TIMEOUT_SECS", "3"),
            ("GEOCODER_USER_AGENT", "me/1"),
            ("SNAP_WARN_M", "250.5"),
        ])
        .unwrap();
        assert_eq!(
            cfg.cors_origins,
            CorsOrigins::List(vec!["http://localhost:3000".into(), "https://walk.example".into()])
        );
        assert_eq!(cfg.listen_addr.port(), 9000);
        assert_eq!(cfg.client.timeout, Duration::from_secs(3));
        assert_eq!(cfg.client.user_agent, "me/1");
        assert_eq!(cfg.snap_warn_m, 250.5);
    }

    #[test]
    fn bad_values_name_the_variable() {
        for (var, value) in [
            ("LISTEN_ADDR", "nowhere"),
            ("GEOCODER", "bing"),
            ("GRAPH_SOURCE", "sqlite"),
            ("GEOCODER_TIMEOUT_SECS", "-1"),
            ("GRAPH_LARGEST_COMPONENT", "maybe"),
            ("SNAP_WARN_M", "far"),
            ("GEOCODER_TIMEOUT_SECS", "0"),
            ("SNAP_WARN_M", "NaN"),
            ("SNAP_WARN_M", "-5"),
            ("SNAP_WARN_M", "inf"),
        ] {
            let mut vars = vec![(var, value)];
            if var == "GRAPH_LARGEST_COMPONENT" {
                vars.push(("GRAPH_SOURCE", "overpass"));
            }
            let err = from(&vars).unwrap_err();
            assert!(format!("{err:#}").contains(var), "{var}: {err:#}");
        }
        let err = from(&[("GRAPH_SOURCE", "overpass"), ("GRAPH_BBOX", "1,2,3")]).unwrap_err();
        assert!(format!("{err:#}").contains("GRAPH_BBOX"));
    }
}

// ── Service pipeline ──────────────────────────────────────────────────────────

#[cfg(test)]
mod service {
    use std::io;
    use std::sync::{Arc, Mutex};

    use wr_core::{GeoPoint, NodeId};

    use crate::error::RouteError;
    use crate::service::{directions, RouteResponse};

    /// Log sink shared between the subscriber and the test.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[tokio::test]
    async fn toy_route() {
        let svc = super::helpers::service();
        let resp = svc.route("Alpha Street", "Charlie Street").await.unwrap();
        assert_eq!(resp.path, vec![[0.0, 0.0], [0.0, 1.0], [0.0, 2.0]]);
        assert_eq!(resp.distance_m, 2.0);
        assert_eq!(resp.directions, vec!["Walk from Alpha Street to Charlie Street.".to_string()]);
    }

    #[tokio::test]
    async fn endpoints_are_snapped_nodes() {
        let svc = super::helpers::service();
        // Both geocodes sit slightly off-node.
        let resp = svc.route("Bravo Street", "Charlie Corner").await.unwrap();
        assert_eq!(resp.path.first(), Some(&[0.0, 1.0]));
        assert_eq!(resp.path.last(), Some(&[0.0, 2.0]));
    }

    #[tokio::test]
    async fn consecutive_nodes_share_an_edge() {
        let svc = super::helpers::service();
        let net = svc.network();
        let from = svc.nearest_node(GeoPoint::new(0.0, 0.0)).unwrap();
        let to = svc.nearest_node(GeoPoint::new(0.0, 2.0)).unwrap();
        let route = svc.shortest_path(from, to).await.unwrap();
        for pair in route.nodes.windows(2) {
            assert!(net.edge_between(pair[0], pair[1]).is_some());
        }
    }

    #[tokio::test]
    async fn repeated_requests_agree() {
        let svc = super::helpers::service();
        let first = svc.route("Alpha Street", "Charlie Street").await.unwrap();
        for _ in 0..5 {
            assert_eq!(svc.route("Alpha Street", "Charlie Street").await.unwrap(), first);
        }
    }

    #[tokio::test]
    async fn same_point_is_single_node() {
        let svc = super::helpers::service();
        let resp = svc.route("Charlie Street", "Charlie Corner").await.unwrap();
        assert_eq!(resp.path, vec![[0.0, 2.0]]);
        assert_eq!(resp.distance_m, 0.0);
    }

    #[tokio::test]
    async fn failures_by_stage() {
        let svc = super::helpers::service();
        assert!(matches!(
            svc.route("Alpha Street", "Nowhere").await,
            Err(RouteError::AddressNotFound(a)) if a == "Nowhere"
        ));
        assert!(matches!(
            svc.route("Flaky Street", "Alpha Street").await,
            Err(RouteError::UpstreamGeocoding)
        ));
        assert!(matches!(
            svc.route("Alpha Street", "Delta Island").await,
            Err(RouteError::NoPathFound)
        ));
    }

    #[tokio::test]
    async fn far_coordinate_still_snaps() {
        let svc = super::helpers::service();
        let node = svc.nearest_node(GeoPoint::new(-40.0, 170.0)).unwrap();
        assert_eq!(node, NodeId(4));
        assert!(svc.route("Far Away", "Delta Island").await.is_ok());
    }

    #[tokio::test]
    async fn internal_failure_is_logged_with_its_nodes() {
        let logs = Captured::default();
        let sink = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let svc = super::helpers::service();
        let err = svc.shortest_path(NodeId(0), NodeId(99)).await.unwrap_err();
        let response = axum::response::IntoResponse::into_response(err);
        assert_eq!(response.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);

        let text = logs.text();
        assert!(text.contains("routing failed"), "{text}");
        assert!(text.contains("NodeId(99)"), "{text}");
        assert_eq!(text.lines().count(), 1, "{text}");
    }

    #[tokio::test]
    async fn api_shares_the_service_response_type() {
        let svc = super::helpers::service();
        let resp: crate::api::RouteResponse = svc.route("Alpha Street", "Bravo Street").await.unwrap();
        let same: RouteResponse = resp.clone();
        assert_eq!(same.path, vec![[0.0, 0.0], [0.0, 1.0]]);
    }

    #[tokio::test]
    async fn out_of_range_node_is_internal() {
        let svc = super::helpers::service();
        let err = svc.shortest_path(NodeId(0), NodeId(99)).await.unwrap_err();
        assert!(matches!(err, RouteError::Internal(_)));
        assert_eq!(err.to_string(), "Internal server error.");
    }

    #[test]
    fn directions_placeholder() {
        assert_eq!(directions("a", "b"), vec!["Walk from a to b.".to_string()]);
    }
}

// ── HTTP API ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod api {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;

    use crate::api::{HEALTH_PATH, ROUTE_PATH, cors_layer};
    use crate::config::CorsOrigins;

    use super::helpers::{app, post_route, send};

    #[tokio::test]
    async fn shortest_path_ok() {
        let (status, body) = post_route("Alpha Street", "Charlie Street").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "path": [[0.0, 0.0], [0.0, 1.0], [0.0, 2.0]],
                "directions": ["Walk from Alpha Street to Charlie Street."],
                "distance_m": 2.0
            })
        );
    }

    #[tokio::test]
    async fn unknown_address_is_400_naming_it() {
        let (status, body) = post_route("Alpha Street", "Nowhere Lane").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"detail": "Address 'Nowhere Lane' not found."}));
    }

    #[tokio::test]
    async fn empty_address_is_400() {
        let (status, body) = post_route("", "Alpha Street").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Address '' not found.");
    }

    #[tokio::test]
    async fn upstream_failure_is_500() {
        let (status, body) = post_route("Alpha Street", "Flaky Street").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"detail": "Failed to geocode address."}));
    }

    #[tokio::test]
    async fn disconnected_is_500() {
        let (status, body) = post_route("Alpha Street", "Delta Island").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"detail": "No walking path found between the given addresses."}));
    }

    #[tokio::test]
    async fn same_address_single_point() {
        let (status, body) = post_route("Bravo Street", "Bravo Street").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["path"], json!([[0.0, 1.0]]));
    }

    #[tokio::test]
    async fn missing_field_is_rejected() {
        let req = Request::post(ROUTE_PATH)
            .header("content-type", "application/json")
            .body(Body::from(r#"{"start_address": "Alpha Street"}"#))
            .unwrap();
        let (status, body) = send(app(), req).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].as_str().unwrap().contains("end_address"));
    }

    #[tokio::test]
    async fn malformed_json_is_rejected() {
        let req = Request::post(ROUTE_PATH)
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(app(), req).await;
        assert!(status.is_client_error());
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn health_reports_counts() {
        let req = Request::get(HEALTH_PATH).body(Body::empty()).unwrap();
        let (status, body) = send(app(), req).await;
        assert_eq!(status, StatusCode::OK);
        // 3 undirected roads.
        assert_eq!(body, json!({"status": "ok", "nodes": 5, "edges": 6}));
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let req = Request::get(HEALTH_PATH)
            .header("origin", "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let resp = tower::ServiceExt::oneshot(app(), req).await.unwrap();
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    }

    #[test]
    fn cors_rejects_bad_origin() {
        assert!(cors_layer(&CorsOrigins::List(vec!["http://ok.example".into()])).is_ok());
        assert!(cors_layer(&CorsOrigins::List(vec!["bad\norigin".into()])).is_err());
    }
}

// ── Graph loading ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod graph {
    use std::collections::HashMap;
    use std::io::Write;

    use axum::routing::post;
    use axum::{Form, Router};

    use wr_core::BBox;

    use crate::config::GraphSource;
    use crate::graph::load_network;

    const UA: &str = "walkroute-test/1";

    const OVERPASS_BODY: &str = r#"{
        "elements": [
            {"type": "node", "id": 1, "lat": 37.770, "lon": -122.420},
            {"type": "node", "id": 2, "lat": 37.771, "lon": -122.420},
            {"type": "node", "id": 3, "lat": 37.780, "lon": -122.400},
            {"type": "node", "id": 4, "lat": 37.781, "lon": -122.400},
            {"type": "node", "id": 5, "lat": 37.782, "lon": -122.400},
            {"type": "way", "id": 10, "nodes": [1, 2], "tags": {"highway": "footway"}},
            {"type": "way", "id": 11, "nodes": [3, 4, 5], "tags": {"highway": "residential"}}
        ]
    }"#;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn json_bundle() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"nodes": [{{"id": 7, "lat": 0.0, "lon": 0.0}}, {{"id": 8, "lat": 0.0, "lon": 1.0}}],
                "edges": [{{"from": 7, "to": 8, "length": 1.0}}]}}"#
        )
        .unwrap();
        let net = load_network(&GraphSource::Bundle(file.path().into()), UA).await.unwrap();
        assert_eq!(net.node_count(), 2);
        assert_eq!(net.edge_count(), 2);
    }

    #[tokio::test]
    async fn empty_or_missing_bundle_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"nodes": [], "edges": []}}"#).unwrap();
        assert!(load_network(&GraphSource::Bundle(file.path().into()), UA).await.is_err());

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        let err = load_network(&GraphSource::Bundle(missing), UA).await.unwrap_err();
        assert!(format!("{err:#}").contains("absent.json"));
    }

    #[tokio::test]
    async fn overpass_fetch_keeps_largest_component() {
        async fn interpreter(Form(form): Form<HashMap<String, String>>) -> &'static str {
            assert!(form["data"].contains("[out:json]"));
            OVERPASS_BODY
        }
        let base = serve(Router::new().route("/api/interpreter", post(interpreter))).await;
        let source = GraphSource::Overpass {
            url: format!("{base}/api/interpreter"),
            bbox: BBox::new(37.7, -122.5, 37.8, -122.3).unwrap(),
            keep_largest: true,
        };
        let net = load_network(&source, UA).await.unwrap();
        assert_eq!(net.node_ref, vec![3, 4, 5]);
        assert_eq!(net.edge_count(), 4);
    }

    #[tokio::test]
    async fn overpass_error_status_fails() {
        async fn busy() -> (axum::http::StatusCode, &'static str) {
            (axum::http::StatusCode::TOO_MANY_REQUESTS, "rate limited")
        }
        let base = serve(Router::new().route("/api/interpreter", post(busy))).await;
        let source = GraphSource::Overpass {
            url: format!("{base}/api/interpreter"),
            bbox: BBox::new(37.7, -122.5, 37.8, -122.3).unwrap(),
            keep_largest: true,
        };
        assert!(load_network(&source, UA).await.is_err());
    }

    #[cfg(not(feature = "osm"))]
    #[tokio::test]
    async fn pbf_without_feature_fails() {
        let source = GraphSource::Pbf { path: "sf.osm.pbf".into(), keep_largest: true };
        let err = load_network(&source, UA).await.unwrap_err();
        assert!(err.to_string().contains("--features osm"));
    }
}
