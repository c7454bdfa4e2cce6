//! Geodesic inverse problem on an ellipsoid (Vincenty 1975)
//!
//! Given two points, finds the length of the geodesic between them and the
//! azimuths at both ends. The iteration on the auxiliary-sphere longitude
//! converges quickly for every terrestrial pair except nearly antipodal
//! ones, where it reports [`GeodesyError::NonConvergent`] instead of
//! returning a wrong answer.

use std::f64::consts::PI;

use serde::Serialize;
use thiserror::Error;
use tidemark_common::GeoPoint;

/// Iteration cap for the λ refinement loop
pub const MAX_ITERATIONS: u32 = 200;

/// Convergence threshold on λ (radians); ~0.006 mm on the ground
pub const CONVERGENCE_EPSILON: f64 = 1e-12;

const WGS84_SEMI_MAJOR_M: f64 = 6_378_137.0;
const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeodesyError {
    #[error("geodesic inverse did not converge after {iterations} iterations (nearly antipodal points)")]
    NonConvergent { iterations: u32 },
}

/// Reference ellipsoid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub semi_major_m: f64,
    pub flattening: f64,
}

pub const WGS84: Ellipsoid = Ellipsoid {
    semi_major_m: WGS84_SEMI_MAJOR_M,
    flattening: WGS84_FLATTENING,
};

/// Solution of the inverse problem
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Inverse {
    /// Azimuth at the first point towards the second, degrees in (-180, 180]
    pub forward_azimuth_deg: f64,
    /// Azimuth at the second point back towards the first, degrees in (-180, 180]
    pub back_azimuth_deg: f64,
    pub distance_m: f64,
}

impl Inverse {
    /// Coincident points: zero length, azimuths reported as 0
    const COINCIDENT: Inverse = Inverse {
        forward_azimuth_deg: 0.0,
        back_azimuth_deg: 0.0,
        distance_m: 0.0,
    };

    pub fn distance_km(&self) -> f64 {
        self.distance_m / 1000.0
    }
}

impl Ellipsoid {
    pub fn semi_minor_m(&self) -> f64 {
        self.semi_major_m * (1.0 - self.flattening)
    }

    pub fn eccentricity_sq(&self) -> f64 {
        self.flattening * (2.0 - self.flattening)
    }

    /// Smallest radius of curvature: the meridional radius at the equator,
    /// a(1 - e²).
    ///
    /// Every infinitesimal step on the ellipsoid is at least this radius times
    /// the same step measured on the unit sphere, so it scales spherical angles
    /// into distances that never exceed the ellipsoidal ones.
    pub fn min_radius_of_curvature_m(&self) -> f64 {
        self.semi_major_m * (1.0 - self.eccentricity_sq())
    }

    /// Solve the inverse problem between `from` and `to`.
    ///
    /// Inputs are assumed valid (see [`GeoPoint::validate`]).
    pub fn inverse(&self, from: GeoPoint, to: GeoPoint) -> Result<Inverse, GeodesyError> {
        if from == to {
            return Ok(Inverse::COINCIDENT);
        }

        let a = self.semi_major_m;
        let b = self.semi_minor_m();
        let f = self.flattening;

        let l = wrap_pi(to.lon_rad() - from.lon_rad());

        // Reduced latitudes on the auxiliary sphere
        let u1 = ((1.0 - f) * from.lat_rad().tan()).atan();
        let u2 = ((1.0 - f) * to.lat_rad().tan()).atan();
        let (sin_u1, cos_u1) = u1.sin_cos();
        let (sin_u2, cos_u2) = u2.sin_cos();

        let mut lambda = l;
        let mut iterations = 0;

        let (sin_sigma, cos_sigma, sigma, cos_sq_alpha, cos_2sigma_m) = loop {
            if iterations >= MAX_ITERATIONS {
                return Err(GeodesyError::NonConvergent { iterations });
            }
            iterations += 1;

            let (sin_lambda, cos_lambda) = lambda.sin_cos();
            let t1 = cos_u2 * sin_lambda;
            let t2 = cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda;
            let sin_sigma = (t1 * t1 + t2 * t2).sqrt();
            let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;

            if sin_sigma == 0.0 {
                if cos_sigma > 0.0 {
                    return Ok(Inverse::COINCIDENT);
                }
                return Err(GeodesyError::NonConvergent { iterations });
            }

            let sigma = sin_sigma.atan2(cos_sigma);
            let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
            let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
            // Equatorial lines have cos²α = 0
            let cos_2sigma_m = if cos_sq_alpha != 0.0 {
                cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
            } else {
                0.0
            };
            let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));

            let previous = lambda;
            lambda = l
                + (1.0 - c)
                    * f
                    * sin_alpha
                    * (sigma
                        + c * sin_sigma
                            * (cos_2sigma_m
                                + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

            if lambda.abs() > PI {
                return Err(GeodesyError::NonConvergent { iterations });
            }
            if (lambda - previous).abs() <= CONVERGENCE_EPSILON {
                break (sin_sigma, cos_sigma, sigma, cos_sq_alpha, cos_2sigma_m);
            }
        };

        let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
        let big_a =
            1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
        let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
        let cos_sq_2sigma_m = cos_2sigma_m * cos_2sigma_m;
        let delta_sigma = big_b
            * sin_sigma
            * (cos_2sigma_m
                + big_b / 4.0
                    * (cos_sigma * (-1.0 + 2.0 * cos_sq_2sigma_m)
                        - big_b / 6.0
                            * cos_2sigma_m
                            * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                            * (-3.0 + 4.0 * cos_sq_2sigma_m)));

        let distance_m = (b * big_a * (sigma - delta_sigma)).max(0.0);

        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let alpha1 = (cos_u2 * sin_lambda).atan2(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda);
        let alpha2 = (cos_u1 * sin_lambda).atan2(-sin_u1 * cos_u2 + cos_u1 * sin_u2 * cos_lambda);

        Ok(Inverse {
            forward_azimuth_deg: normalize_degrees(alpha1.to_degrees()),
            back_azimuth_deg: normalize_degrees(alpha2.to_degrees() + 180.0),
            distance_m,
        })
    }

    pub fn distance_m(&self, from: GeoPoint, to: GeoPoint) -> Result<f64, GeodesyError> {
        self.inverse(from, to).map(|inv| inv.distance_m)
    }
}

/// Inverse problem on WGS84
pub fn inverse(from: GeoPoint, to: GeoPoint) -> Result<Inverse, GeodesyError> {
    WGS84.inverse(from, to)
}

/// Geodesic distance on WGS84 in meters
pub fn distance_m(from: GeoPoint, to: GeoPoint) -> Result<f64, GeodesyError> {
    WGS84.distance_m(from, to)
}

fn wrap_pi(angle: f64) -> f64 {
    if angle > PI {
        angle - 2.0 * PI
    } else if angle < -PI {
        angle + 2.0 * PI
    } else {
        angle
    }
}

fn normalize_degrees(deg: f64) -> f64 {
    let wrapped = deg % 360.0;
    if wrapped > 180.0 {
        wrapped - 360.0
    } else if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}
