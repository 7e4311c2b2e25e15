//! Geographic primitives shared by the API and its clients.

use anyhow::{bail, Context, Result};

/// Mean earth radius, m
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A point on the sphere, degrees.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Rectangular lat/lng region given by its opposite corners.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bounds {
    pub north_east: GeoPoint,
    pub south_west: GeoPoint,
}

/// Great-circle midpoint of two points (not a planar average).
pub fn midpoint(a: GeoPoint, b: GeoPoint) -> GeoPoint {
    let lat1 = a.lat.to_radians();
    let lng1 = a.lng.to_radians();
    let lat2 = b.lat.to_radians();
    let lng2 = b.lng.to_radians();

    let dlng = lng2 - lng1;
    let bx = lat2.cos() * dlng.cos();
    let by = lat2.cos() * dlng.sin();
    let lat_mid = (lat1.sin() + lat2.sin())
        .atan2(((lat1.cos() + bx) * (lat1.cos() + bx) + by * by).sqrt());
    let lng_mid = lng1 + by.atan2(lat1.cos() + bx);

    GeoPoint {
        lat: lat_mid.to_degrees(),
        lng: lng_mid.to_degrees(),
    }
}

/// Great-circle distance using the haversine formula, meters.
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// The two remaining corners of `bounds`, in the order the sensor API's
/// `bbox` query parameter wants them: `[[neLat, swLng], [swLat, neLng]]`.
pub fn bounds_to_bounding_box(bounds: &Bounds) -> [[f64; 2]; 2] {
    [
        [bounds.north_east.lat, bounds.south_west.lng],
        [bounds.south_west.lat, bounds.north_east.lng],
    ]
}

/// Radius of the largest circle centered at `center` that still fits inside
/// `bounds`: the smallest distance from the center to one of the four edge
/// midpoints, meters.
pub fn max_inscribed_radius(bounds: &Bounds, center: GeoPoint) -> f64 {
    let ne = bounds.north_east;
    let sw = bounds.south_west;
    let edges = [
        GeoPoint::new(center.lat, sw.lng),
        GeoPoint::new(sw.lat, center.lng),
        GeoPoint::new(center.lat, ne.lng),
        GeoPoint::new(ne.lat, center.lng),
    ];

    edges
        .iter()
        .map(|edge| distance_meters(*edge, center))
        .fold(f64::INFINITY, f64::min)
}

/// Parses the sensor API's coordinate encoding `"lat1:lng1,lat2:lng2"` into
/// a typed pair of corner points. Done once at the boundary so nothing
/// downstream has to re-split strings.
pub fn parse_corner_pair(coordinates: &str) -> Result<(GeoPoint, GeoPoint)> {
    let mut points = coordinates.split(',');

    let (Some(first), Some(second), None) = (points.next(), points.next(), points.next()) else {
        bail!("expected exactly two points in '{coordinates}'");
    };

    Ok((parse_point(first)?, parse_point(second)?))
}

fn parse_point(point: &str) -> Result<GeoPoint> {
    let (lat, lng) = point
        .trim()
        .split_once(':')
        .with_context(|| format!("missing ':' in point '{point}'"))?;

    Ok(GeoPoint {
        lat: lat.trim().parse()?,
        lng: lng.trim().parse()?,
    })
}
