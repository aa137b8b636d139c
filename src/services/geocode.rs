use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::MapConfig;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("AMAP_KEY is not set.")]
    NotConfigured,
    #[error("no geocode found for '{0}'")]
    NoMatch(String),
    #[error("geocoding failed: {0}")]
    Provider(String),
    #[error("geocoding network error: {0}")]
    Network(String),
    #[error("geocoding timed out after {0:?}")]
    Timeout(Duration),
    #[error("geocoding cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str, city: Option<&str>)
        -> Result<Coordinates, GeocodeError>;
}

/// AMap web-service geocoding (`/v3/geocode/geo`).
pub struct AmapGeocoder {
    client: Client,
    key: String,
    base_url: String,
}

impl AmapGeocoder {
    pub fn new(key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Deserialize)]
struct AmapResponse {
    status: String,
    #[serde(default)]
    info: String,
    #[serde(default)]
    geocodes: Vec<AmapGeocode>,
}

#[derive(Deserialize)]
struct AmapGeocode {
    location: String,
}

fn parse_lng_lat(raw: &str) -> Option<Coordinates> {
    let (lng, lat) = raw.split_once(',')?;
    Some(Coordinates {
        longitude: lng.trim().parse().ok()?,
        latitude: lat.trim().parse().ok()?,
    })
}

#[async_trait]
impl Geocoder for AmapGeocoder {
    async fn geocode(
        &self,
        address: &str,
        city: Option<&str>,
    ) -> Result<Coordinates, GeocodeError> {
        let mut query = vec![("key", self.key.as_str()), ("address", address)];
        if let Some(city) = city {
            query.push(("city", city));
        }

        let response: AmapResponse = self
            .client
            .get(format!("{}/v3/geocode/geo", self.base_url))
            .query(&query)
            .send()
            .await
            .map_err(|e| GeocodeError::Network(e.to_string()))?
            .error_for_status()
            .map_err(|e| GeocodeError::Provider(e.to_string()))?
            .json()
            .await
            .map_err(|e| GeocodeError::Provider(e.to_string()))?;

        if response.status != "1" {
            return Err(GeocodeError::Provider(response.info));
        }
        response
            .geocodes
            .first()
            .and_then(|geocode| parse_lng_lat(&geocode.location))
            .ok_or_else(|| GeocodeError::NoMatch(address.to_string()))
    }
}

/// Used when no map key is configured.
pub struct DisabledGeocoder;

#[async_trait]
impl Geocoder for DisabledGeocoder {
    async fn geocode(
        &self,
        _address: &str,
        _city: Option<&str>,
    ) -> Result<Coordinates, GeocodeError> {
        Err(GeocodeError::NotConfigured)
    }
}

pub fn geocoder_from_config(config: &MapConfig) -> Arc<dyn Geocoder> {
    match config.amap_key.as_ref() {
        Some(key) => Arc::new(AmapGeocoder::new(key.clone(), config.amap_base_url.clone())),
        None => Arc::new(DisabledGeocoder),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub name: String,
    pub position: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedPlace {
    pub name: String,
    pub reason: String,
}

/// Bounding box that fits every placed marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub south_west: Coordinates,
    pub north_east: Coordinates,
}

impl Viewport {
    pub fn fit(markers: &[Marker]) -> Option<Self> {
        let first = markers.first()?.position;
        let (mut sw, mut ne) = (first, first);
        for marker in &markers[1..] {
            let p = marker.position;
            sw.longitude = sw.longitude.min(p.longitude);
            sw.latitude = sw.latitude.min(p.latitude);
            ne.longitude = ne.longitude.max(p.longitude);
            ne.latitude = ne.latitude.max(p.latitude);
        }
        Some(Self {
            south_west: sw,
            north_east: ne,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerPlacement {
    pub markers: Vec<Marker>,
    pub failed: Vec<FailedPlace>,
    pub viewport: Option<Viewport>,
}

/// Geocodes every name concurrently. Each lookup is bounded by `timeout`;
/// firing `cancel` abandons all lookups still in flight. Individual failures
/// are logged and left out, and the viewport is fitted once every lookup has
/// resolved.
pub async fn place_markers(
    geocoder: &dyn Geocoder,
    names: &[String],
    city: Option<&str>,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<MarkerPlacement, GeocodeError> {
    let lookups = names.iter().map(|name| async move {
        let result = tokio::select! {
            _ = cancel.cancelled() => Err(GeocodeError::Cancelled),
            outcome = tokio::time::timeout(timeout, geocoder.geocode(name, city)) => {
                outcome.unwrap_or(Err(GeocodeError::Timeout(timeout)))
            }
        };
        (name, result)
    });
    let outcomes = join_all(lookups).await;

    if cancel.is_cancelled() {
        debug!(places = names.len(), "marker placement cancelled");
        return Err(GeocodeError::Cancelled);
    }

    let mut markers = Vec::new();
    let mut failed = Vec::new();
    for (name, result) in outcomes {
        match result {
            Ok(position) => markers.push(Marker {
                name: name.clone(),
                position,
            }),
            Err(err) => {
                warn!(place = %name, "geocoding failed: {err}");
                failed.push(FailedPlace {
                    name: name.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    let viewport = Viewport::fit(&markers);
    Ok(MarkerPlacement {
        markers,
        failed,
        viewport,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{extract::Query, routing::get, Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    use super::*;

    /// Resolves known names, fails the rest, and sleeps on names starting with "slow".
    struct TableGeocoder {
        known: HashMap<&'static str, Coordinates>,
    }

    #[async_trait]
    impl Geocoder for TableGeocoder {
        async fn geocode(
            &self,
            address: &str,
            _city: Option<&str>,
        ) -> Result<Coordinates, GeocodeError> {
            if address.starts_with("slow") {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            self.known
                .get(address)
                .copied()
                .ok_or_else(|| GeocodeError::NoMatch(address.to_string()))
        }
    }

    fn table() -> TableGeocoder {
        TableGeocoder {
            known: HashMap::from([
                ("Gion", Coordinates { longitude: 135.775, latitude: 35.003 }),
                ("Arashiyama", Coordinates { longitude: 135.672, latitude: 35.009 }),
                ("Kinkaku-ji", Coordinates { longitude: 135.729, latitude: 35.039 }),
            ]),
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn places_one_marker_per_success() {
        let places = names(&["Gion", "Atlantis", "Arashiyama", "Kinkaku-ji"]);
        let placement = place_markers(
            &table(),
            &places,
            Some("Kyoto"),
            Duration::from_secs(1),
            &CancellationToken::new(),
        )
        .await
        .expect("placement");

        assert_eq!(placement.markers.len(), 3);
        assert_eq!(placement.failed.len(), 1);
        assert_eq!(placement.failed[0].name, "Atlantis");
        let viewport = placement.viewport.expect("viewport");
        assert_eq!(viewport.south_west.longitude, 135.672);
        assert_eq!(viewport.south_west.latitude, 35.003);
        assert_eq!(viewport.north_east.longitude, 135.775);
        assert_eq!(viewport.north_east.latitude, 35.039);
    }

    #[tokio::test]
    async fn all_failures_leave_an_empty_map() {
        let places = names(&["Atlantis", "El Dorado"]);
        let placement = place_markers(
            &table(),
            &places,
            None,
            Duration::from_secs(1),
            &CancellationToken::new(),
        )
        .await
        .expect("placement");
        assert!(placement.markers.is_empty());
        assert_eq!(placement.failed.len(), 2);
        assert!(placement.viewport.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_lookups_time_out_without_blocking_others() {
        let places = names(&["Gion", "slow lane"]);
        let placement = place_markers(
            &table(),
            &places,
            None,
            Duration::from_millis(200),
            &CancellationToken::new(),
        )
        .await
        .expect("placement");
        assert_eq!(placement.markers.len(), 1);
        assert!(placement.failed[0].reason.contains("timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_abandons_the_fan_out() {
        let places = names(&["slow one", "slow two"]);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let geocoder = table();
        let result =
            place_markers(&geocoder, &places, None, Duration::from_secs(60), &cancel).await;
        assert!(matches!(result, Err(GeocodeError::Cancelled)));
    }

    #[tokio::test]
    async fn disabled_geocoder_reports_missing_key() {
        let err = DisabledGeocoder.geocode("Gion", None).await.unwrap_err();
        assert_eq!(err.to_string(), "AMAP_KEY is not set.");
    }

    #[test]
    fn parses_amap_location_pairs() {
        assert_eq!(
            parse_lng_lat("116.397428,39.90923"),
            Some(Coordinates { longitude: 116.397428, latitude: 39.90923 })
        );
        assert_eq!(parse_lng_lat("garbage"), None);
    }

    async fn spawn_amap(reply: Value) -> String {
        let app = Router::new().route(
            "/v3/geocode/geo",
            get(move |Query(params): Query<HashMap<String, String>>| {
                let mut reply = reply.clone();
                async move {
                    reply["echo"] = json!(params);
                    Json(reply)
                }
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn amap_geocoder_reads_first_geocode() {
        let base = spawn_amap(json!({
            "status": "1",
            "info": "OK",
            "geocodes": [{"location": "116.397428,39.90923"}]
        }))
        .await;
        let geocoder = AmapGeocoder::new("test-key".into(), base);
        let coords = geocoder.geocode("故宫博物院", Some("北京")).await.expect("coords");
        assert_eq!(coords.latitude, 39.90923);
    }

    #[tokio::test]
    async fn amap_geocoder_maps_provider_failures() {
        let base = spawn_amap(json!({ "status": "0", "info": "INVALID_USER_KEY" })).await;
        let geocoder = AmapGeocoder::new("bad".into(), base);
        let err = geocoder.geocode("Gion", None).await.unwrap_err();
        assert!(matches!(err, GeocodeError::Provider(ref info) if info == "INVALID_USER_KEY"));

        let base = spawn_amap(json!({ "status": "1", "info": "OK", "geocodes": [] })).await;
        let geocoder = AmapGeocoder::new("key".into(), base);
        let err = geocoder.geocode("Atlantis", None).await.unwrap_err();
        assert!(matches!(err, GeocodeError::NoMatch(_)));
    }
}
