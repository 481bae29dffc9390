//! Geographic primitives: coordinates, great-circle distance and polyline snapping.
//!
//! Distances use the Haversine formula on a spherical earth. Snapping projects
//! onto each polyline segment in a local equirectangular frame centred on the
//! query point, which is accurate to well under a metre at the ~100 m scale
//! the tracking engine works at.

use h3o::{CellIndex, LatLng, Resolution};
use serde::{Deserialize, Serialize};

/// Mean earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(alias = "latitude")]
    pub lat: f64,
    #[serde(alias = "lng", alias = "longitude")]
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to `other` in metres.
    pub fn distance_m(self, other: Coordinate) -> f64 {
        let (lat1, lon1) = (self.lat.to_radians(), self.lon.to_radians());
        let (lat2, lon2) = (other.lat.to_radians(), other.lon.to_radians());
        let sin_dlat = ((lat2 - lat1) * 0.5).sin();
        let sin_dlon = ((lon2 - lon1) * 0.5).sin();
        let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
        let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
        EARTH_RADIUS_M * c
    }

    /// True when both axes differ by at most `tolerance_deg` degrees.
    pub fn within_degrees(self, other: Coordinate, tolerance_deg: f64) -> bool {
        (self.lat - other.lat).abs() <= tolerance_deg
            && (self.lon - other.lon).abs() <= tolerance_deg
    }

    /// Checked conversion. `None` for non-finite values.
    pub fn to_lat_lng(self) -> Option<LatLng> {
        LatLng::new(self.lat, self.lon).ok()
    }

    /// H3 cell containing this coordinate at `resolution`.
    pub fn cell(self, resolution: Resolution) -> Option<CellIndex> {
        self.to_lat_lng().map(|ll| ll.to_cell(resolution))
    }

    /// Move by the given metres north and east (flat-earth approximation).
    pub fn offset_m(self, north_m: f64, east_m: f64) -> Coordinate {
        let dlat = (north_m / EARTH_RADIUS_M).to_degrees();
        let dlon = (east_m / (EARTH_RADIUS_M * self.lat.to_radians().cos())).to_degrees();
        Coordinate::new(self.lat + dlat, self.lon + dlon)
    }
}

/// Nearest point on a polyline to a query coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// Projected position on the polyline.
    pub coordinate: Coordinate,
    /// Index of the segment start vertex the projection landed on.
    pub segment_index: usize,
    /// Distance from the query point to `coordinate`, in metres.
    pub offset_m: f64,
}

/// Project `point` onto the closest segment of `polyline`.
///
/// Returns `None` for polylines with fewer than two vertices.
pub fn nearest_point_on_polyline(point: Coordinate, polyline: &[Coordinate]) -> Option<SnapResult> {
    if polyline.len() < 2 {
        return None;
    }

    let cos_lat = point.lat.to_radians().cos();
    let to_xy = |c: Coordinate| {
        (
            (c.lon - point.lon).to_radians() * cos_lat * EARTH_RADIUS_M,
            (c.lat - point.lat).to_radians() * EARTH_RADIUS_M,
        )
    };

    let mut best: Option<SnapResult> = None;
    for (segment_index, pair) in polyline.windows(2).enumerate() {
        let (start, end) = (pair[0], pair[1]);
        let (ax, ay) = to_xy(start);
        let (bx, by) = to_xy(end);
        let (dx, dy) = (bx - ax, by - ay);
        let len_sq = dx * dx + dy * dy;
        // The query point is the origin of the local frame.
        let t = if len_sq > 0.0 {
            ((-ax * dx - ay * dy) / len_sq).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let coordinate = Coordinate::new(
            start.lat + (end.lat - start.lat) * t,
            start.lon + (end.lon - start.lon) * t,
        );
        let offset_m = point.distance_m(coordinate);
        if best.map_or(true, |current| offset_m < current.offset_m) {
            best = Some(SnapResult {
                coordinate,
                segment_index,
                offset_m,
            });
        }
    }
    best
}

/// Snap `point` onto `polyline` when it lies within `max_snap_m` metres of it.
pub fn snap_to_polyline(
    point: Coordinate,
    polyline: &[Coordinate],
    max_snap_m: f64,
) -> Option<SnapResult> {
    nearest_point_on_polyline(point, polyline).filter(|snap| snap.offset_m <= max_snap_m)
}
