// Donation center ranking - great-circle distance on a spherical Earth
use crate::models::{Coordinate, DonationCenter};

/// Mean Earth radius in kilometres
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two coordinates, in kilometres.
///
/// Symmetric, non-negative, zero for coincident points. The haversine term
/// is clamped to [0, 1] before the square roots: floating round-off can push
/// it a hair outside the domain for coincident or antipodal points.
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// A center paired with its distance from the query coordinate.
/// Computed fresh per query, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCenter {
    pub center: DonationCenter,
    pub distance_km: f64,
}

/// Outcome of a ranking query.
///
/// An unknown location is a first-class state, not an empty list and not an
/// error - callers branch on it before touching the ranked entries.
#[derive(Debug, Clone, PartialEq)]
pub enum Ranking {
    LocationUnknown,
    Ranked(Vec<RankedCenter>),
}

impl Ranking {
    /// The closest center, if any. None both when the location is unknown
    /// and when the catalog is empty; check `is_location_unknown` first
    /// when the difference matters to the caller.
    pub fn nearest(&self) -> Option<&RankedCenter> {
        match self {
            Ranking::Ranked(centers) => centers.first(),
            Ranking::LocationUnknown => None,
        }
    }

    pub fn is_location_unknown(&self) -> bool {
        matches!(self, Ranking::LocationUnknown)
    }
}

/// Ranks a fixed catalog of donation centers by proximity to a coordinate
pub struct DonationMatcher {
    centers: Vec<DonationCenter>,
}

impl DonationMatcher {
    pub fn new(centers: Vec<DonationCenter>) -> Self {
        Self { centers }
    }

    pub fn centers(&self) -> &[DonationCenter] {
        &self.centers
    }

    /// Rank every catalog center by distance from the coordinate, ascending.
    /// The sort is stable, so equal distances keep catalog order.
    pub fn rank(&self, coordinate: Option<Coordinate>) -> Ranking {
        let Some(coordinate) = coordinate else {
            return Ranking::LocationUnknown;
        };

        let mut ranked: Vec<RankedCenter> = self
            .centers
            .iter()
            .map(|center| RankedCenter {
                distance_km: distance_km(coordinate, center.coordinate()),
                center: center.clone(),
            })
            .collect();

        ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        Ranking::Ranked(ranked)
    }
}
