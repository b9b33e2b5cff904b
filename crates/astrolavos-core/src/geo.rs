//! Great-circle geometry between tracked devices.
//!
//! Distance and bearing use the haversine formulation over a spherical
//! Earth, which is plenty for the sub-30 km ranges a LoRa handheld cares
//! about. Bearings are degrees clockwise from true north in `[0, 360)`.

use embassy_time::Instant;
use libm::{atan2f, cosf, sinf, sqrtf};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f32 = 6_371_000.0;

/// Anything farther than this is treated as noise rather than a fix.
/// The radio tops out well below this range.
pub const MAX_PLAUSIBLE_DISTANCE_M: f32 = 30_000.0;

const DEG_TO_RAD: f32 = core::f32::consts::PI / 180.0;
const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

/// A known GNSS fix. "No fix yet" is `Option<GeoPosition>` at rest, so a
/// value of this type always carries real coordinates.
///
/// The timestamp is the local clock at the time the fix was observed or
/// received; it is never the remote sender's clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPosition {
    /// Degrees, positive north.
    pub latitude: f32,
    /// Degrees, positive east.
    pub longitude: f32,
    /// Local observation time.
    pub timestamp: Instant,
}

impl GeoPosition {
    pub fn new(latitude: f32, longitude: f32, timestamp: Instant) -> Self {
        Self {
            latitude,
            longitude,
            timestamp,
        }
    }
}

/// A magnetometer heading sample, degrees clockwise from north in `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Heading {
    pub degrees: f32,
    /// Local sample time.
    pub timestamp: Instant,
}

impl Heading {
    pub fn new(degrees: f32, timestamp: Instant) -> Self {
        Self { degrees, timestamp }
    }
}

/// One of the eight compass octants relative to the device's own heading.
///
/// `Front` spans `[337.5, 360) ∪ [0, 22.5)` of relative angle; each other
/// variant covers the next 45° clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Front,
    FrontRight,
    Right,
    BackRight,
    Back,
    BackLeft,
    Left,
    FrontLeft,
}

/// Clockwise bucket order starting at Front.
const BUCKETS: [Direction; 8] = [
    Direction::Front,
    Direction::FrontRight,
    Direction::Right,
    Direction::BackRight,
    Direction::Back,
    Direction::BackLeft,
    Direction::Left,
    Direction::FrontLeft,
];

impl Direction {
    /// Two-character label used on the 160x80 panel.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Direction::Front => "F",
            Direction::FrontRight => "FR",
            Direction::Right => "R",
            Direction::BackRight => "BR",
            Direction::Back => "B",
            Direction::BackLeft => "BL",
            Direction::Left => "L",
            Direction::FrontLeft => "FL",
        }
    }
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn normalize_angle(degrees: f32) -> f32 {
    let wrapped = degrees % 360.0;
    if wrapped < 0.0 { wrapped + 360.0 } else { wrapped }
}

/// Haversine distance between two fixes, in meters.
///
/// Symmetric, and exactly zero for identical coordinates.
pub fn haversine_distance(from: &GeoPosition, to: &GeoPosition) -> f32 {
    let lat1 = from.latitude * DEG_TO_RAD;
    let lat2 = to.latitude * DEG_TO_RAD;
    let d_lat = (to.latitude - from.latitude) * DEG_TO_RAD;
    let d_lon = (to.longitude - from.longitude) * DEG_TO_RAD;

    let a = sinf(d_lat / 2.0) * sinf(d_lat / 2.0)
        + cosf(lat1) * cosf(lat2) * sinf(d_lon / 2.0) * sinf(d_lon / 2.0);
    let c = 2.0 * atan2f(sqrtf(a), sqrtf(1.0 - a));

    EARTH_RADIUS_M * c
}

/// Initial great-circle bearing from `from` toward `to`, degrees clockwise
/// from true north in `[0, 360)`.
pub fn initial_bearing(from: &GeoPosition, to: &GeoPosition) -> f32 {
    let lat1 = from.latitude * DEG_TO_RAD;
    let lat2 = to.latitude * DEG_TO_RAD;
    let d_lon = (to.longitude - from.longitude) * DEG_TO_RAD;

    let y = sinf(d_lon) * cosf(lat2);
    let x = cosf(lat1) * sinf(lat2) - sinf(lat1) * cosf(lat2) * cosf(d_lon);

    normalize_angle(atan2f(y, x) * RAD_TO_DEG)
}

/// Quantize a target bearing into an octant relative to the device's own
/// heading.
///
/// Both angles may lie outside `[0, 360)`; the relative angle is wrapped
/// first. A tie on a 22.5° boundary goes to the higher (more clockwise)
/// bucket, so `octant(0.0, 22.5)` is `FrontRight`. Total over all finite
/// inputs; never panics.
pub fn octant(own_heading_deg: f32, bearing_deg: f32) -> Direction {
    let relative = normalize_angle(bearing_deg - own_heading_deg);
    // Shift by half a bucket so Front straddles zero, then index clockwise.
    let bucket = ((relative + 22.5) / 45.0) as usize % 8;
    BUCKETS[bucket]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(latitude: f32, longitude: f32) -> GeoPosition {
        GeoPosition::new(latitude, longitude, Instant::from_micros(0))
    }

    #[test]
    fn test_distance_zero_for_identical_points() {
        let a = pos(52.52, 13.405);
        assert_eq!(haversine_distance(&a, &a), 0.0);
    }

    #[test]
    fn test_distance_symmetric() {
        let a = pos(52.52, 13.405);
        let b = pos(52.53, 13.42);
        let ab = haversine_distance(&a, &b);
        let ba = haversine_distance(&b, &a);
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_distance_one_degree_north() {
        // 1 degree of latitude is roughly 111 km.
        let a = pos(0.0, 0.0);
        let b = pos(1.0, 0.0);
        let d = haversine_distance(&a, &b);
        assert!((d - 111_000.0).abs() < 1_000.0, "distance {} m", d);
    }

    #[test]
    fn test_berlin_east_walk() {
        // Two points on the same parallel, 0.01 degrees of longitude apart.
        let a = pos(52.5200, 13.4050);
        let b = pos(52.5200, 13.4150);

        let d = haversine_distance(&a, &b);
        assert!((d - 690.0).abs() < 690.0 * 0.05, "distance {} m", d);

        let bearing = initial_bearing(&a, &b);
        assert!((bearing - 90.0).abs() < 2.0, "bearing {} deg", bearing);

        // Facing north, a target due east sits on the right.
        assert_eq!(octant(0.0, bearing), Direction::Right);
    }

    #[test]
    fn test_bearing_cardinals() {
        let origin = pos(0.0, 0.0);
        let north = initial_bearing(&origin, &pos(1.0, 0.0));
        let east = initial_bearing(&origin, &pos(0.0, 1.0));
        let south = initial_bearing(&pos(1.0, 0.0), &origin);
        let west = initial_bearing(&origin, &pos(0.0, -1.0));

        assert!(north.abs() < 1.0, "north {}", north);
        assert!((east - 90.0).abs() < 1.0, "east {}", east);
        assert!((south - 180.0).abs() < 1.0, "south {}", south);
        assert!((west - 270.0).abs() < 1.0, "west {}", west);
    }

    #[test]
    fn test_octant_boundaries() {
        assert_eq!(octant(0.0, 22.4999), Direction::Front);
        assert_eq!(octant(0.0, 22.5), Direction::FrontRight);
        assert_eq!(octant(0.0, 337.5), Direction::Front);
        assert_eq!(octant(0.0, 337.4999), Direction::FrontLeft);
    }

    #[test]
    fn test_octant_all_buckets() {
        assert_eq!(octant(0.0, 0.0), Direction::Front);
        assert_eq!(octant(0.0, 45.0), Direction::FrontRight);
        assert_eq!(octant(0.0, 90.0), Direction::Right);
        assert_eq!(octant(0.0, 135.0), Direction::BackRight);
        assert_eq!(octant(0.0, 180.0), Direction::Back);
        assert_eq!(octant(0.0, 225.0), Direction::BackLeft);
        assert_eq!(octant(0.0, 270.0), Direction::Left);
        assert_eq!(octant(0.0, 315.0), Direction::FrontLeft);
    }

    #[test]
    fn test_octant_relative_to_heading() {
        // Facing east, a target due east is in front.
        assert_eq!(octant(90.0, 90.0), Direction::Front);
        // Facing east, a target due north is on the left.
        assert_eq!(octant(90.0, 0.0), Direction::Left);
    }

    #[test]
    fn test_octant_accepts_unnormalized_angles() {
        assert_eq!(octant(0.0, 450.0), Direction::Right);
        assert_eq!(octant(0.0, -45.0), Direction::FrontLeft);
        assert_eq!(octant(-90.0, 0.0), Direction::Right);
        assert_eq!(octant(720.0, 180.0), Direction::Back);
    }

    #[test]
    fn test_normalize_angle() {
        assert_eq!(normalize_angle(0.0), 0.0);
        assert_eq!(normalize_angle(359.0), 359.0);
        assert_eq!(normalize_angle(360.0), 0.0);
        assert_eq!(normalize_angle(-1.0), 359.0);
        assert_eq!(normalize_angle(725.0), 5.0);
    }

    #[test]
    fn test_direction_abbreviations() {
        assert_eq!(Direction::Front.abbreviation(), "F");
        assert_eq!(Direction::BackLeft.abbreviation(), "BL");
        assert_eq!(Direction::FrontLeft.abbreviation(), "FL");
    }
}
