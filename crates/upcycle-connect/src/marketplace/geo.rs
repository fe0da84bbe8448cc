//! Great-circle proximity filtering over located records.
//!
//! Both entry points are pure and total: they never fail, never mutate their
//! inputs, and complete in one pass over the candidate set (plus a stable
//! sort for the survivors).

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine computation, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Radius applied when a nearby search does not supply one.
pub const DEFAULT_RADIUS_KM: f64 = 10.0;

/// A point on the globe in decimal degrees.
///
/// Coordinates are not range-checked: latitudes outside [-90, 90] or
/// longitudes outside [-180, 180] produce mathematically valid but
/// meaningless distances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// A record that survived proximity filtering, with its distance attached.
///
/// Serializes as the record's own fields plus a `distance` field in
/// kilometers, so HTTP responses keep the original record shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Positioned<T> {
    #[serde(flatten)]
    pub record: T,
    #[serde(rename = "distance")]
    pub distance_km: f64,
}

/// Haversine distance between two points in kilometers, rounded to one
/// decimal place.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos()
            * b.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    round_tenth(EARTH_RADIUS_KM * c)
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Keep the records within `radius_km` of `origin`, ordered by increasing
/// distance.
///
/// `position` yields a record's coordinates; `None` or a non-finite
/// coordinate marks the record as not locatable and excludes it without
/// computing a distance. Ties in distance keep their input order. A radius
/// of zero or less retains only records coincident with the origin.
pub fn filter_by_distance<T, F>(
    records: Vec<T>,
    origin: GeoPoint,
    radius_km: f64,
    position: F,
) -> Vec<Positioned<T>>
where
    F: Fn(&T) -> Option<GeoPoint>,
{
    let mut nearby: Vec<Positioned<T>> = records
        .into_iter()
        .filter_map(|record| {
            let point = position(&record).filter(GeoPoint::is_finite)?;
            let distance_km = distance_km(origin, point);
            // A NaN distance (non-finite origin) fails the comparison and
            // drops the record, matching the "not locatable" rule.
            (distance_km <= radius_km).then_some(Positioned {
                record,
                distance_km,
            })
        })
        .collect();

    // Stable sort keeps input order for equal distances.
    nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    nearby
}
