//! Synthetic coastline data for tests
//!
//! Generated datasets are deterministic for a given seed so failures can be
//! replayed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tidemark_common::{GeoPoint, Polyline};

/// Lat/lon window that generated data stays inside
#[derive(Debug, Clone, Copy)]
pub struct Region {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Region {
    pub const fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// A mid-latitude window roughly the size of the North Sea
    pub const NORTH_SEA: Region = Region::new(50.0, 60.0, -5.0, 10.0);

    /// The whole globe minus the polar caps
    pub const GLOBAL: Region = Region::new(-80.0, 80.0, -180.0, 180.0);

    fn random_point(&self, rng: &mut impl Rng) -> (f64, f64) {
        (
            rng.gen_range(self.min_lon..=self.max_lon),
            rng.gen_range(self.min_lat..=self.max_lat),
        )
    }

    fn clamp(&self, lon: f64, lat: f64) -> (f64, f64) {
        (
            lon.clamp(self.min_lon, self.max_lon),
            lat.clamp(self.min_lat, self.max_lat),
        )
    }
}

pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Random-walk polylines: each starts at a random spot and wanders with
/// steps of up to `step_deg` in each axis.
pub fn random_walk_coastline(
    rng: &mut impl Rng,
    region: Region,
    features: usize,
    vertices: usize,
    step_deg: f64,
) -> Vec<Polyline> {
    (0..features)
        .map(|f| {
            let (mut lon, mut lat) = region.random_point(rng);
            let mut coords = Vec::with_capacity(vertices);
            coords.push((lon, lat));
            for _ in 1..vertices {
                let next = region.clamp(
                    lon + rng.gen_range(-step_deg..=step_deg),
                    lat + rng.gen_range(-step_deg..=step_deg),
                );
                lon = next.0;
                lat = next.1;
                coords.push(next);
            }
            Polyline::new(format!("walk-{f}"), coords)
        })
        .collect()
}

/// Closed square ring around `(lat, lon)`
pub fn square_island(name: &str, lat: f64, lon: f64, half_side_deg: f64) -> Polyline {
    let h = half_side_deg;
    Polyline::new(
        name,
        vec![
            (lon - h, lat - h),
            (lon + h, lat - h),
            (lon + h, lat + h),
            (lon - h, lat + h),
            (lon - h, lat - h),
        ],
    )
}

pub fn random_points(rng: &mut impl Rng, region: Region, n: usize) -> Vec<GeoPoint> {
    (0..n)
        .map(|_| {
            let (lon, lat) = region.random_point(rng);
            GeoPoint {
                latitude: lat,
                longitude: lon,
            }
        })
        .collect()
}
