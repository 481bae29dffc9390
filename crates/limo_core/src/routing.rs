//! Pluggable route providers for ETA and route-line display.
//!
//! Implementations, selectable via [`RouteProviderKind`]:
//!
//! - **`StraightLineRouteProvider`**: haversine distance at a fixed average speed. Never fails.
//! - **`OsrmRouteProvider`** (feature `osrm`): calls an OSRM HTTP endpoint.
//!
//! Remote providers are wrapped in a [`CachedRouteProvider`] keyed by H3 cells.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use async_trait::async_trait;
use h3o::{CellIndex, Resolution};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use tracing::debug;
#[cfg(feature = "osrm")]
use tracing::warn;

use crate::geo::Coordinate;

/// Average speed used when no road route is available (~40 km/h).
pub const FALLBACK_SPEED_MPS: f64 = 11.11;

/// Default route cache capacity.
pub const DEFAULT_ROUTE_CACHE_CAPACITY: usize = 2_048;

/// Resolution-11 cells are ~25 m across, fine enough for a cache key.
pub const DEFAULT_CACHE_RESOLUTION: Resolution = Resolution::Eleven;

/// A route between two points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    /// Ordered points along the road; first is the origin side, last the destination side.
    pub polyline: Vec<Coordinate>,
    pub distance_m: f64,
    pub duration_secs: f64,
}

/// Which routing backend to use.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteProviderKind {
    #[default]
    StraightLine,
    /// OSRM HTTP endpoint (e.g. `"http://localhost:5000"`).
    #[cfg(feature = "osrm")]
    Osrm { endpoint: String },
}

/// Routing backend. `None` means no route could be produced.
#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn route(&self, origin: Coordinate, destination: Coordinate) -> Option<RouteResult>;
}

/// Two-point route with haversine distance at [`FALLBACK_SPEED_MPS`].
pub fn straight_line_estimate(origin: Coordinate, destination: Coordinate) -> RouteResult {
    straight_line_at(origin, destination, FALLBACK_SPEED_MPS)
}

/// Same as [`straight_line_estimate`] at a caller-chosen speed.
pub fn straight_line_at(origin: Coordinate, destination: Coordinate, speed_mps: f64) -> RouteResult {
    let distance_m = origin.distance_m(destination);
    let duration_secs = if speed_mps > 0.0 {
        distance_m / speed_mps
    } else {
        0.0
    };
    RouteResult {
        polyline: vec![origin, destination],
        distance_m,
        duration_secs,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StraightLineRouteProvider {
    pub speed_mps: f64,
}

impl Default for StraightLineRouteProvider {
    fn default() -> Self {
        Self {
            speed_mps: FALLBACK_SPEED_MPS,
        }
    }
}

#[async_trait]
impl RouteProvider for StraightLineRouteProvider {
    async fn route(&self, origin: Coordinate, destination: Coordinate) -> Option<RouteResult> {
        Some(straight_line_at(origin, destination, self.speed_mps))
    }
}

/// LRU-cached wrapper around any [`RouteProvider`].
///
/// Cache key is the directional pair of H3 cells containing origin and
/// destination. On inner failure the straight-line estimate is used when
/// `fallback_to_straight_line` is set; fallback results are not cached so
/// the inner provider is retried next time.
pub struct CachedRouteProvider {
    inner: Box<dyn RouteProvider>,
    cache: Mutex<LruCache<(CellIndex, CellIndex), RouteResult>>,
    resolution: Resolution,
    fallback_to_straight_line: bool,
}

impl CachedRouteProvider {
    pub fn new(
        inner: Box<dyn RouteProvider>,
        capacity: usize,
        fallback_to_straight_line: bool,
    ) -> Self {
        Self::with_resolution(
            inner,
            capacity,
            DEFAULT_CACHE_RESOLUTION,
            fallback_to_straight_line,
        )
    }

    pub fn with_resolution(
        inner: Box<dyn RouteProvider>,
        capacity: usize,
        resolution: Resolution,
        fallback_to_straight_line: bool,
    ) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
            resolution,
            fallback_to_straight_line,
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    fn key(&self, origin: Coordinate, destination: Coordinate) -> Option<(CellIndex, CellIndex)> {
        Some((
            origin.cell(self.resolution)?,
            destination.cell(self.resolution)?,
        ))
    }
}

#[async_trait]
impl RouteProvider for CachedRouteProvider {
    async fn route(&self, origin: Coordinate, destination: Coordinate) -> Option<RouteResult> {
        let key = self.key(origin, destination);

        if let Some(key) = key {
            if let Ok(mut cache) = self.cache.lock() {
                if let Some(cached) = cache.get(&key) {
                    return Some(cached.clone());
                }
            }
        }

        match self.inner.route(origin, destination).await {
            Some(route) => {
                if let (Some(key), Ok(mut cache)) = (key, self.cache.lock()) {
                    cache.put(key, route.clone());
                }
                Some(route)
            }
            None if self.fallback_to_straight_line => {
                debug!("route provider returned nothing, using straight line");
                Some(straight_line_estimate(origin, destination))
            }
            None => None,
        }
    }
}

/// Construct a boxed [`RouteProvider`] from a [`RouteProviderKind`] descriptor.
///
/// `StraightLine` is returned uncached. `Osrm` is wrapped in a
/// [`CachedRouteProvider`] with straight-line fallback; if its HTTP client
/// cannot be built the straight-line provider is used instead.
pub fn build_route_provider(kind: &RouteProviderKind) -> Box<dyn RouteProvider> {
    match kind {
        RouteProviderKind::StraightLine => Box::new(StraightLineRouteProvider::default()),

        #[cfg(feature = "osrm")]
        RouteProviderKind::Osrm { endpoint } => match osrm::OsrmRouteProvider::new(endpoint) {
            Ok(provider) => Box::new(CachedRouteProvider::new(
                Box::new(provider),
                DEFAULT_ROUTE_CACHE_CAPACITY,
                true,
            )),
            Err(err) => {
                warn!(%endpoint, error = %err, "failed to build OSRM client, using straight line");
                Box::new(StraightLineRouteProvider::default())
            }
        },
    }
}

#[cfg(feature = "osrm")]
pub mod osrm {
    use std::time::Duration;

    use async_trait::async_trait;
    use reqwest::Client;
    use serde::Deserialize;
    use tracing::debug;

    use super::{RouteProvider, RouteResult};
    use crate::geo::Coordinate;

    const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

    /// Routes via an OSRM HTTP endpoint.
    pub struct OsrmRouteProvider {
        client: Client,
        endpoint: String,
    }

    impl OsrmRouteProvider {
        pub fn new(endpoint: &str) -> Result<Self, reqwest::Error> {
            let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
            Ok(Self {
                client,
                endpoint: endpoint.trim_end_matches('/').to_string(),
            })
        }

        fn url(&self, origin: Coordinate, destination: Coordinate) -> String {
            format!(
                "{}/route/v1/driving/{},{};{},{}?overview=full&geometries=geojson",
                self.endpoint, origin.lon, origin.lat, destination.lon, destination.lat,
            )
        }
    }

    #[derive(Deserialize)]
    struct OsrmResponse {
        code: String,
        routes: Option<Vec<OsrmRoute>>,
    }

    #[derive(Deserialize)]
    struct OsrmRoute {
        distance: f64,
        duration: f64,
        geometry: OsrmGeometry,
    }

    #[derive(Deserialize)]
    struct OsrmGeometry {
        // [lon, lat]
        coordinates: Vec<[f64; 2]>,
    }

    fn parse_response(resp: OsrmResponse) -> Option<RouteResult> {
        if resp.code != "Ok" {
            return None;
        }
        let route = resp.routes?.into_iter().next()?;
        let polyline: Vec<Coordinate> = route
            .geometry
            .coordinates
            .iter()
            .map(|[lon, lat]| Coordinate::new(*lat, *lon))
            .collect();
        if polyline.len() < 2 {
            return None;
        }
        Some(RouteResult {
            polyline,
            distance_m: route.distance,
            duration_secs: route.duration,
        })
    }

    #[async_trait]
    impl RouteProvider for OsrmRouteProvider {
        async fn route(&self, origin: Coordinate, destination: Coordinate) -> Option<RouteResult> {
            let response = match self.client.get(self.url(origin, destination)).send().await {
                Ok(response) => response,
                Err(err) => {
                    debug!(error = %err, "OSRM request failed");
                    return None;
                }
            };
            match response.json::<OsrmResponse>().await {
                Ok(parsed) => parse_response(parsed),
                Err(err) => {
                    debug!(error = %err, "OSRM response was not valid JSON");
                    None
                }
            }
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const ORIGIN: Coordinate = Coordinate::new(42.3601, -71.0589);
    const DESTINATION: Coordinate = Coordinate::new(42.3656, -71.0096);

    struct CountingProvider {
        calls: Arc<AtomicUsize>,
        succeed: bool,
    }

    #[async_trait]
    impl RouteProvider for CountingProvider {
        async fn route(&self, origin: Coordinate, destination: Coordinate) -> Option<RouteResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.succeed.then(|| RouteResult {
                polyline: vec![origin, destination],
                distance_m: 5_000.0,
                duration_secs: 600.0,
            })
        }
    }

    #[test]
    fn straight_line_uses_fallback_speed() {
        let route = straight_line_estimate(ORIGIN, DESTINATION);
        assert_eq!(route.polyline, vec![ORIGIN, DESTINATION]);
        assert!((route.duration_secs - route.distance_m / FALLBACK_SPEED_MPS).abs() < 1e-9);
    }

    #[tokio::test]
    async fn cache_hit_skips_inner_provider() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = CachedRouteProvider::new(
            Box::new(CountingProvider {
                calls: Arc::clone(&calls),
                succeed: true,
            }),
            8,
            false,
        );

        let first = provider.route(ORIGIN, DESTINATION).await;
        let second = provider.route(ORIGIN, DESTINATION).await;
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.cached_len(), 1);
    }

    #[tokio::test]
    async fn failure_falls_back_without_caching() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = CachedRouteProvider::new(
            Box::new(CountingProvider {
                calls: Arc::clone(&calls),
                succeed: false,
            }),
            8,
            true,
        );

        let route = provider.route(ORIGIN, DESTINATION).await.expect("fallback");
        assert_eq!(route.polyline.len(), 2);
        provider.route(ORIGIN, DESTINATION).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(provider.cached_len(), 0);
    }

    #[tokio::test]
    async fn failure_without_fallback_is_none() {
        let provider = CachedRouteProvider::new(
            Box::new(CountingProvider {
                calls: Arc::new(AtomicUsize::new(0)),
                succeed: false,
            }),
            8,
            false,
        );
        assert!(provider.route(ORIGIN, DESTINATION).await.is_none());
    }

    #[tokio::test]
    async fn default_kind_builds_straight_line() {
        let provider = build_route_provider(&RouteProviderKind::default());
        let route = provider.route(ORIGIN, DESTINATION).await.expect("route");
        assert!(route.distance_m > 4_000.0);
    }
}
