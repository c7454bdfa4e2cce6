//! Nearest point on a segment in a local tangent plane.
//!
//! The plane is centred on the query point with longitude differences
//! scaled by cos(latitude). Segments are short compared with the Earth's
//! curvature, so this locates the closest point well; the distance to it
//! is always measured geodesically by the caller.

use tidemark_common::GeoPoint;

/// Closest point on a segment and its parameter along the segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub point: GeoPoint,
    /// 0.0 at the start endpoint, 1.0 at the end endpoint
    pub t: f64,
}

/// Project `p` onto segment `a`-`b`, clamped to the segment.
///
/// The result is a convex combination of the endpoints, so it always lies
/// inside the segment's bounding box.
pub fn project_onto_segment(p: GeoPoint, a: GeoPoint, b: GeoPoint) -> Projection {
    // Put the query on the same side of the antimeridian as the segment
    let mid_lon = (a.longitude + b.longitude) / 2.0;
    let mut px = p.longitude;
    if px - mid_lon > 180.0 {
        px -= 360.0;
    } else if px - mid_lon < -180.0 {
        px += 360.0;
    }

    let scale_x = p.lat_rad().cos();

    let dx = (b.longitude - a.longitude) * scale_x;
    let dy = b.latitude - a.latitude;
    let len_sq = dx * dx + dy * dy;

    if len_sq == 0.0 {
        // Only reachable at a pole, where every parallel collapses
        return Projection { point: a, t: 0.0 };
    }

    // t = dot(P-A, B-A) / |B-A|²
    let t = (((px - a.longitude) * scale_x * dx + (p.latitude - a.latitude) * dy) / len_sq)
        .clamp(0.0, 1.0);

    let point = if t == 0.0 {
        a
    } else if t == 1.0 {
        b
    } else {
        GeoPoint {
            latitude: a.latitude + t * (b.latitude - a.latitude),
            longitude: a.longitude + t * (b.longitude - a.longitude),
        }
    };

    Projection { point, t }
}
