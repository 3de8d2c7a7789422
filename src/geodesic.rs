//! Direct and inverse geodesic problems on an ellipsoid.
//!
//! Both problems are solved with Vincenty's iteration on the auxiliary
//! sphere. The iteration stops once successive estimates differ by less than
//! `1e-12` radians, or fails with [`Error::NonConvergent`] after 100 rounds,
//! which happens for nearly antipodal points.

use log::{debug, warn};

use crate::{
    angle::{Angle, Latitude, Longitude},
    constants::{GEODESIC_MAX_ITERATIONS, GEODESIC_TOLERANCE},
    coords::point::GeodeticPoint2D,
    ellipsoid::Ellipsoid,
    utility::{dms, GeoMath},
    Error,
};

/// The geodesic between two points, with its length and end azimuths.
///
/// ```
/// use geodesy::{Ellipsoid, GeodeticArc, GeodeticPoint2D};
///
/// let flinders = GeodeticPoint2D::from_degrees(-37.951_033_416_666_67, 144.424_867_888_888_88).unwrap();
/// let buninyong = GeodeticPoint2D::from_degrees(-37.652_821_138_888_89, 143.926_495_527_777_77).unwrap();
///
/// let arc = GeodeticArc::inverse(&Ellipsoid::WGS84, &flinders, &buninyong).unwrap();
/// assert!((arc.distance() - 54_972.271).abs() < 1e-3);
/// assert!((arc.forward_azimuth().bearing() - 306.868_159).abs() < 1e-6);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeodeticArc {
    ellipsoid: Ellipsoid,
    point1: GeodeticPoint2D,
    point2: GeodeticPoint2D,
    distance: f64,
    forward_azimuth: Angle,
    final_azimuth: Angle,
}

/// Angular separations below this many radians (about 60 nm on the
/// Earth) are treated as coincident points.
const COINCIDENT_SIGMA: f64 = 1e-14;

/// Vincenty's A and B series in u².
fn series_ab(u2: f64) -> (f64, f64) {
    let a = 1. + u2 / 16384. * (4096. + u2 * (-768. + u2 * (320. - 175. * u2)));
    let b = u2 / 1024. * (256. + u2 * (-128. + u2 * (74. - 47. * u2)));
    (a, b)
}

fn delta_sigma(b: f64, sin_sigma: f64, cos_sigma: f64, cos_2sigma_m: f64) -> f64 {
    let c2 = cos_2sigma_m.powi(2);
    b * sin_sigma * (cos_2sigma_m + b / 4. * (
        cos_sigma * (-1. + 2. * c2)
        - b / 6. * cos_2sigma_m * (-3. + 4. * sin_sigma.powi(2)) * (-3. + 4. * c2)
    ))
}

/// Longitude at a pole is undefined; report 0.
fn pole_safe_longitude(lat: f64, lon: f64) -> f64 {
    let qd = f64::from(dms::QD);
    if (lat.abs() - qd).abs() < 1e-12 { 0. } else { lon }
}

fn log_iterations(problem: &str, iterations: usize) {
    if iterations > GEODESIC_MAX_ITERATIONS * 3 / 4 {
        warn!("{problem} geodesic needed {iterations} iterations to converge");
    } else {
        debug!("{problem} geodesic converged after {iterations} iterations");
    }
}

impl GeodeticArc {
    /// Solves the inverse problem: the distance and azimuths between two
    /// points.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NonConvergent`] if the iteration does not settle,
    /// which can occur for nearly antipodal points.
    #[allow(clippy::similar_names, clippy::many_single_char_names)]
    pub fn inverse(ellipsoid: &Ellipsoid, point1: &GeodeticPoint2D, point2: &GeodeticPoint2D) -> Result<GeodeticArc, Error> {
        let a = ellipsoid.a();
        let b = ellipsoid.b();
        let f = ellipsoid.f();

        let l = point1.longitude().degrees()
            .ang_diff(point2.longitude().degrees())
            .to_radians();
        let u1 = ((1. - f) * point1.latitude().radians().tan()).atan();
        let u2 = ((1. - f) * point2.latitude().radians().tan()).atan();
        let (sin_u1, cos_u1) = u1.sin_cos();
        let (sin_u2, cos_u2) = u2.sin_cos();

        let mut lambda = l;
        let mut converged = None;
        let mut state = (0., 0., 0., 0., 0.);

        for iteration in 1..=GEODESIC_MAX_ITERATIONS {
            let (sin_lambda, cos_lambda) = lambda.sin_cos();
            let sin_sigma = (cos_u2 * sin_lambda).hypot(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda);
            if sin_sigma < COINCIDENT_SIGMA {
                // Coincident points, including one pole under two longitudes
                return Ok(Self {
                    ellipsoid: *ellipsoid,
                    point1: *point1,
                    point2: *point2,
                    distance: 0.,
                    forward_azimuth: Angle::ZERO,
                    final_azimuth: Angle::ZERO,
                });
            }
            let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
            let sigma = sin_sigma.atan2(cos_sigma);
            let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
            let cos2_alpha = 1. - sin_alpha.powi(2);
            // Equatorial lines have cos2_alpha = 0
            let cos_2sigma_m = if cos2_alpha.is_zero() {
                0.
            } else {
                cos_sigma - 2. * sin_u1 * sin_u2 / cos2_alpha
            };
            let c = f / 16. * cos2_alpha * (4. + f * (4. - 3. * cos2_alpha));
            let previous = lambda;
            lambda = l + (1. - c) * f * sin_alpha * (
                sigma + c * sin_sigma * (cos_2sigma_m + c * cos_sigma * (-1. + 2. * cos_2sigma_m.powi(2)))
            );

            state = (sin_sigma, cos_sigma, sigma, cos2_alpha, cos_2sigma_m);
            if (lambda - previous).abs() < GEODESIC_TOLERANCE {
                converged = Some(iteration);
                break;
            }
        }

        let iterations = converged.ok_or(Error::NonConvergent { iterations: GEODESIC_MAX_ITERATIONS })?;
        log_iterations("Inverse", iterations);

        let (sin_sigma, cos_sigma, sigma, cos2_alpha, cos_2sigma_m) = state;
        let u_sq = cos2_alpha * (a.powi(2) - b.powi(2)) / b.powi(2);
        let (big_a, big_b) = series_ab(u_sq);
        let distance = b * big_a * (sigma - delta_sigma(big_b, sin_sigma, cos_sigma, cos_2sigma_m));

        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let alpha1 = (cos_u2 * sin_lambda).atan2(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda);
        let alpha2 = (cos_u1 * sin_lambda).atan2(-sin_u1 * cos_u2 + cos_u1 * sin_u2 * cos_lambda);

        Ok(Self {
            ellipsoid: *ellipsoid,
            point1: *point1,
            point2: *point2,
            distance,
            forward_azimuth: Angle::new(alpha1),
            final_azimuth: Angle::new(alpha2),
        })
    }

    /// Solves the direct problem: the point reached by travelling `distance`
    /// meters from `point1` along `azimuth`.
    ///
    /// ```
    /// use geodesy::{Angle, Ellipsoid, GeodeticArc, GeodeticPoint2D};
    ///
    /// let start = GeodeticPoint2D::from_degrees(0.0, 0.0).unwrap();
    /// let north = Angle::from_degrees(0.0).unwrap();
    /// let arc = GeodeticArc::direct(&Ellipsoid::WGS84, &start, north, 10_001_965.729).unwrap();
    ///
    /// // A quarter meridian from the equator reaches the pole
    /// assert!((arc.point2().latitude().degrees() - 90.0).abs() < 1e-6);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDistance`] if `distance` is negative or not
    /// finite, and [`Error::NonConvergent`] if the iteration does not settle.
    #[allow(clippy::similar_names, clippy::many_single_char_names)]
    pub fn direct(ellipsoid: &Ellipsoid, point1: &GeodeticPoint2D, azimuth: Angle, distance: f64) -> Result<GeodeticArc, Error> {
        if !distance.is_finite() || distance < 0. {
            return Err(Error::InvalidDistance(distance));
        }
        if distance == 0. {
            return Ok(Self {
                ellipsoid: *ellipsoid,
                point1: *point1,
                point2: *point1,
                distance,
                forward_azimuth: Angle::ZERO,
                final_azimuth: Angle::ZERO,
            });
        }

        let a = ellipsoid.a();
        let b = ellipsoid.b();
        let f = ellipsoid.f();

        let (sin_alpha1, cos_alpha1) = azimuth.radians().sin_cos();
        let tan_u1 = (1. - f) * point1.latitude().radians().tan();
        let cos_u1 = 1. / (1. + tan_u1.powi(2)).sqrt();
        let sin_u1 = tan_u1 * cos_u1;
        let sigma1 = tan_u1.atan2(cos_alpha1);
        let sin_alpha = cos_u1 * sin_alpha1;
        let cos2_alpha = 1. - sin_alpha.powi(2);
        let u_sq = cos2_alpha * (a.powi(2) - b.powi(2)) / b.powi(2);
        let (big_a, big_b) = series_ab(u_sq);

        let sigma0 = distance / (b * big_a);
        let mut sigma = sigma0;
        let mut converged = None;

        for iteration in 1..=GEODESIC_MAX_ITERATIONS {
            let cos_2sigma_m = (2. * sigma1 + sigma).cos();
            let (sin_sigma, cos_sigma) = sigma.sin_cos();
            let previous = sigma;
            sigma = sigma0 + delta_sigma(big_b, sin_sigma, cos_sigma, cos_2sigma_m);
            if (sigma - previous).abs() < GEODESIC_TOLERANCE {
                converged = Some(iteration);
                break;
            }
        }

        let iterations = converged.ok_or(Error::NonConvergent { iterations: GEODESIC_MAX_ITERATIONS })?;
        log_iterations("Direct", iterations);

        let cos_2sigma_m = (2. * sigma1 + sigma).cos();
        let (sin_sigma, cos_sigma) = sigma.sin_cos();
        let x = sin_u1 * sin_sigma - cos_u1 * cos_sigma * cos_alpha1;
        let lat2 = (sin_u1 * cos_sigma + cos_u1 * sin_sigma * cos_alpha1)
            .atan2((1. - f) * sin_alpha.hypot(x))
            .to_degrees();
        let lambda = (sin_sigma * sin_alpha1).atan2(cos_u1 * cos_sigma - sin_u1 * sin_sigma * cos_alpha1);
        let c = f / 16. * cos2_alpha * (4. + f * (4. - 3. * cos2_alpha));
        let l = lambda - (1. - c) * f * sin_alpha * (
            sigma + c * sin_sigma * (cos_2sigma_m + c * cos_sigma * (-1. + 2. * cos_2sigma_m.powi(2)))
        );
        let lon2 = pole_safe_longitude(lat2, point1.longitude().degrees() + l.to_degrees());
        let alpha2 = sin_alpha.atan2(-x);

        let point2 = GeodeticPoint2D::new(Latitude::clamped(lat2), Longitude::new(lon2));

        Ok(Self {
            ellipsoid: *ellipsoid,
            point1: *point1,
            point2,
            distance,
            forward_azimuth: azimuth,
            final_azimuth: Angle::new(alpha2),
        })
    }

    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    pub fn point1(&self) -> GeodeticPoint2D {
        self.point1
    }

    pub fn point2(&self) -> GeodeticPoint2D {
        self.point2
    }

    /// Length of the geodesic in meters.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Azimuth at `point1` toward `point2`.
    pub fn forward_azimuth(&self) -> Angle {
        self.forward_azimuth
    }

    /// Direction of travel on arrival at `point2`.
    pub fn final_azimuth(&self) -> Angle {
        self.final_azimuth
    }

    /// Azimuth at `point2` back toward `point1`.
    pub fn back_azimuth(&self) -> Angle {
        if self.distance == 0. {
            Angle::ZERO
        } else {
            self.final_azimuth + Angle::new_degrees(f64::from(dms::HD))
        }
    }
}
