//! Lat/lon bounding boxes and their geodesic lower bound
//!
//! Boxes only ever prune; the final answer is always a full geodesic
//! distance. The bound is the great-circle angle from the point to the
//! nearest point of the box on the unit sphere, scaled by the smallest
//! WGS84 radius of curvature
//! ([`crate::Ellipsoid::min_radius_of_curvature_m`]), which can only
//! under-estimate the ellipsoidal distance.

use serde::Serialize;
use tidemark_common::GeoPoint;

use crate::geodesy::WGS84;

/// Absorbs the precision `acos` loses close to 1 (~0.1 m).
const LOWER_BOUND_SLACK_M: f64 = 1.0;

/// Axis-aligned box in degrees. Boxes never wrap the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn of_segment(a: GeoPoint, b: GeoPoint) -> Self {
        Self {
            min_lat: a.latitude.min(b.latitude),
            min_lon: a.longitude.min(b.longitude),
            max_lat: a.latitude.max(b.latitude),
            max_lon: a.longitude.max(b.longitude),
        }
    }

    /// `[lon, lat]` corners, the order the R-tree uses
    pub fn corners(&self) -> ([f64; 2], [f64; 2]) {
        ([self.min_lon, self.min_lat], [self.max_lon, self.max_lat])
    }

    pub fn from_corners(lower: [f64; 2], upper: [f64; 2]) -> Self {
        Self {
            min_lat: lower[1],
            min_lon: lower[0],
            max_lat: upper[1],
            max_lon: upper[0],
        }
    }

    fn spans_longitude(&self, lon: f64) -> bool {
        (self.min_lon..=self.max_lon).contains(&lon)
    }

    pub fn contains(&self, p: GeoPoint) -> bool {
        self.spans_longitude(p.longitude) && (self.min_lat..=self.max_lat).contains(&p.latitude)
    }

    /// Smallest great-circle angle (radians) from `p` to any point of the box
    /// on the unit sphere.
    pub fn min_central_angle(&self, p: GeoPoint) -> f64 {
        if self.contains(p) {
            return 0.0;
        }

        if self.spans_longitude(p.longitude) {
            // Straight north or south along the point's own meridian
            return if p.latitude > self.max_lat {
                p.lat_rad() - self.max_lat.to_radians()
            } else {
                self.min_lat.to_radians() - p.lat_rad()
            };
        }

        // Outside the longitude span the closest point sits on one of the
        // two meridian edges: along a parallel the angle shrinks towards the
        // nearer longitude, which is a corner.
        let west = angle_to_meridian_arc(p, self.min_lon, self.min_lat, self.max_lat);
        let east = angle_to_meridian_arc(p, self.max_lon, self.min_lat, self.max_lat);
        west.min(east)
    }

    /// Lower bound (meters) on the WGS84 geodesic distance from `p` to any
    /// point inside the box.
    pub fn lower_bound_m(&self, p: GeoPoint) -> f64 {
        let radius_m = WGS84.min_radius_of_curvature_m();
        (self.min_central_angle(p) * radius_m - LOWER_BOUND_SLACK_M).max(0.0)
    }
}

/// Angle from `p` to the arc of meridian `lon` between `lat_lo` and `lat_hi`.
///
/// Along the meridian, cos(angle) = A·sin φ' + B·cos φ', a sinusoid in φ'
/// peaking at atan2(A, B). If the peak falls inside the arc it is the
/// foot of the perpendicular; otherwise an endpoint is closest.
fn angle_to_meridian_arc(p: GeoPoint, lon: f64, lat_lo: f64, lat_hi: f64) -> f64 {
    let (sin_phi, cos_phi) = p.lat_rad().sin_cos();
    let dlon = p.lon_rad() - lon.to_radians();
    let a = sin_phi;
    let b = cos_phi * dlon.cos();

    let lo = lat_lo.to_radians();
    let hi = lat_hi.to_radians();
    let peak = a.atan2(b);

    let best_cos = if (lo..=hi).contains(&peak) {
        a.hypot(b)
    } else {
        let at = |phi: f64| a * phi.sin() + b * phi.cos();
        at(lo).max(at(hi))
    };

    best_cos.clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::distance_m;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn p(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    fn boxed(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> BoundingBox {
        BoundingBox {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    #[test]
    fn inside_is_zero() {
        let b = boxed(10.0, 10.0, 20.0, 20.0);
        assert_eq!(b.lower_bound_m(p(15.0, 15.0)), 0.0);
        assert_eq!(b.lower_bound_m(p(10.0, 20.0)), 0.0);
    }

    #[test]
    fn directly_south_is_latitude_gap() {
        let b = boxed(10.0, 10.0, 20.0, 20.0);
        let angle = b.min_central_angle(p(5.0, 15.0));
        assert!((angle - 5f64.to_radians()).abs() < 1e-15);
    }

    #[test]
    fn bound_is_angle_times_smallest_radius() {
        let b = boxed(10.0, 10.0, 20.0, 20.0);
        let expected = 5f64.to_radians() * WGS84.min_radius_of_curvature_m() - 1.0;
        assert!((b.lower_bound_m(p(5.0, 15.0)) - expected).abs() < 1e-6);
    }

    #[test]
    fn beside_the_box_uses_cross_track_distance() {
        // Equator point due west of a box straddling the equator
        let b = boxed(-1.0, 10.0, 1.0, 11.0);
        let angle = b.min_central_angle(p(0.0, 5.0));
        assert!((angle - 5f64.to_radians()).abs() < 1e-12);
    }

    #[test]
    fn diagonal_gap_reaches_the_corner() {
        let b = boxed(10.0, 10.0, 20.0, 20.0);
        let q = p(0.0, 0.0);
        let bound = b.lower_bound_m(q);
        let corner = distance_m(q, p(10.0, 10.0)).unwrap();
        assert!(bound <= corner);
        // Within the ellipsoid/sphere ratio of the corner distance
        assert!(bound > corner * 0.99);
    }

    #[test]
    fn corners_round_trip() {
        let b = boxed(-2.0, 3.0, 5.0, 7.0);
        let (lower, upper) = b.corners();
        assert_eq!(BoundingBox::from_corners(lower, upper), b);
    }

    #[test]
    fn bound_never_exceeds_distance_to_points_inside() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..2000 {
            let lat0 = rng.gen_range(-85.0..80.0);
            let lon0 = rng.gen_range(-180.0..175.0);
            let b = boxed(
                lat0,
                lon0,
                lat0 + rng.gen_range(0.0..5.0),
                lon0 + rng.gen_range(0.0..5.0),
            );
            let q = p(rng.gen_range(-90.0..=90.0), rng.gen_range(-180.0..=180.0));
            let bound = b.lower_bound_m(q);

            for _ in 0..8 {
                let inside = p(
                    rng.gen_range(b.min_lat..=b.max_lat),
                    rng.gen_range(b.min_lon..=b.max_lon),
                );
                let Ok(d) = distance_m(q, inside) else {
                    continue;
                };
                assert!(bound <= d, "bound {bound} > {d} for {q} in {b:?}");
            }
        }
    }
}
