//! Vincenty's inverse and direct solutions on the WGS 84 ellipsoid.

use crate::error::{GeosampleError, Result};
use crate::models::GeoPoint;

/// WGS 84 semi-major axis in meters
pub const WGS84_A: f64 = 6_378_137.0;

/// WGS 84 flattening
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// WGS 84 semi-minor axis in meters
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);

/// Upper bound on lambda/sigma iterations
pub const MAX_ITERATIONS: usize = 200;

const CONVERGENCE_THRESHOLD: f64 = 1e-12;

/// Geodesic distance in meters (inverse problem)
pub fn inverse(p1: &GeoPoint, p2: &GeoPoint) -> Result<f64> {
    let (a, b, f) = (WGS84_A, WGS84_B, WGS84_F);

    let l = wrap_radians((p2.lon() - p1.lon()).to_radians());
    let u1 = ((1.0 - f) * p1.lat().to_radians().tan()).atan();
    let u2 = ((1.0 - f) * p2.lat().to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    let mut state = None;

    for _ in 0..MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();

        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            // Coincident points
            return Ok(0.0);
        }

        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;

        // Equatorial geodesics have cos²α = 0
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
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

        if lambda.abs() > std::f64::consts::PI {
            // Near-antipodal: the iteration diverges instead of converging
            break;
        }

        if (lambda - previous).abs() < CONVERGENCE_THRESHOLD {
            state = Some((sin_sigma, cos_sigma, sigma, cos_sq_alpha, cos_2sigma_m));
            break;
        }
    }

    let (sin_sigma, cos_sigma, sigma, cos_sq_alpha, cos_2sigma_m) =
        state.ok_or(GeosampleError::GeodesyNonConvergence {
            from_lat: p1.lat(),
            from_lon: p1.lon(),
            to_lat: p2.lat(),
            to_lon: p2.lon(),
            iterations: MAX_ITERATIONS,
        })?;

    let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
    let (big_a, big_b) = series_coefficients(u_sq);
    let delta_sigma = delta_sigma(big_b, sin_sigma, cos_sigma, cos_2sigma_m);

    Ok(b * big_a * (sigma - delta_sigma))
}

/// Point reached from `origin` along `bearing_deg` after `distance_m` (direct problem)
///
/// Returns `(lat, lon)` in degrees; the longitude is not yet normalized.
pub fn direct(origin: &GeoPoint, bearing_deg: f64, distance_m: f64) -> Result<(f64, f64)> {
    let (a, b, f) = (WGS84_A, WGS84_B, WGS84_F);

    let alpha1 = bearing_deg.to_radians();
    let (sin_alpha1, cos_alpha1) = alpha1.sin_cos();

    let tan_u1 = (1.0 - f) * origin.lat().to_radians().tan();
    let cos_u1 = 1.0 / (1.0 + tan_u1 * tan_u1).sqrt();
    let sin_u1 = tan_u1 * cos_u1;

    let sigma1 = tan_u1.atan2(cos_alpha1);
    let sin_alpha = cos_u1 * sin_alpha1;
    let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
    let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
    let (big_a, big_b) = series_coefficients(u_sq);

    let first_sigma = distance_m / (b * big_a);
    let mut sigma = first_sigma;
    let mut converged = false;

    for _ in 0..MAX_ITERATIONS {
        let cos_2sigma_m = (2.0 * sigma1 + sigma).cos();
        let (sin_sigma, cos_sigma) = sigma.sin_cos();
        let previous = sigma;
        sigma = first_sigma + delta_sigma(big_b, sin_sigma, cos_sigma, cos_2sigma_m);

        if (sigma - previous).abs() < CONVERGENCE_THRESHOLD {
            converged = true;
            break;
        }
    }

    if !converged {
        return Err(GeosampleError::GeodesyNonConvergence {
            from_lat: origin.lat(),
            from_lon: origin.lon(),
            to_lat: f64::NAN,
            to_lon: f64::NAN,
            iterations: MAX_ITERATIONS,
        });
    }

    let cos_2sigma_m = (2.0 * sigma1 + sigma).cos();
    let (sin_sigma, cos_sigma) = sigma.sin_cos();

    let x = sin_u1 * sin_sigma - cos_u1 * cos_sigma * cos_alpha1;
    let lat2 = (sin_u1 * cos_sigma + cos_u1 * sin_sigma * cos_alpha1)
        .atan2((1.0 - f) * (sin_alpha * sin_alpha + x * x).sqrt());
    let lambda =
        (sin_sigma * sin_alpha1).atan2(cos_u1 * cos_sigma - sin_u1 * sin_sigma * cos_alpha1);
    let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
    let l = lambda
        - (1.0 - c)
            * f
            * sin_alpha
            * (sigma
                + c * sin_sigma
                    * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

    Ok((lat2.to_degrees(), origin.lon() + l.to_degrees()))
}

/// Wrap a longitude difference into `[-π, π]`
fn wrap_radians(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    if angle > PI {
        angle - TAU
    } else if angle < -PI {
        angle + TAU
    } else {
        angle
    }
}

fn series_coefficients(u_sq: f64) -> (f64, f64) {
    let big_a =
        1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
    (big_a, big_b)
}

fn delta_sigma(big_b: f64, sin_sigma: f64, cos_sigma: f64, cos_2sigma_m: f64) -> f64 {
    let cos_2sigma_m_sq = cos_2sigma_m * cos_2sigma_m;
    big_b
        * sin_sigma
        * (cos_2sigma_m
            + big_b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m_sq)
                    - big_b / 6.0
                        * cos_2sigma_m
                        * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                        * (-3.0 + 4.0 * cos_2sigma_m_sq)))
}
