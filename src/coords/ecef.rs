use crate::{
    angle::{Latitude, Longitude},
    coords::point::GeodeticPoint3D,
    ellipsoid::Ellipsoid,
};

/// Most refinement passes after Bowring's starting latitude.
const MAX_REFINEMENTS: usize = 5;
/// Refinement stops once the latitude moves less than this, in radians.
const LATITUDE_TOLERANCE: f64 = 1e-15;

/// Earth-centered, earth-fixed cartesian position in meters.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EcefPoint {
    x: f64,
    y: f64,
    z: f64,
}

impl EcefPoint {
    pub fn new(x: f64, y: f64, z: f64) -> EcefPoint {
        Self { x, y, z }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    /// ```
    /// use geodesy::{EcefPoint, Ellipsoid, GeodeticPoint3D};
    ///
    /// let point = GeodeticPoint3D::from_degrees(0.0, 90.0, 0.0).unwrap();
    /// let ecef = EcefPoint::from_geodetic(&Ellipsoid::WGS84, &point);
    /// assert!(ecef.x().abs() < 1e-6);
    /// assert!((ecef.y() - 6_378_137.0).abs() < 1e-6);
    /// ```
    pub fn from_geodetic(ellipsoid: &Ellipsoid, point: &GeodeticPoint3D) -> EcefPoint {
        let (sin_lat, cos_lat) = point.latitude().radians().sin_cos();
        let (sin_lon, cos_lon) = point.longitude().radians().sin_cos();
        let h = point.elevation();

        let n = ellipsoid.prime_vertical_radius(point.latitude().degrees());
        let x = (n + h) * cos_lat * cos_lon;
        let y = (n + h) * cos_lat * sin_lon;
        let z = (n * (1.0 - ellipsoid.e2()) + h) * sin_lat;

        Self::new(x, y, z)
    }

    /// Bowring's formula refined by fixed-point iteration on the latitude.
    /// Points on the polar axis get longitude 0.
    pub fn to_geodetic(&self, ellipsoid: &Ellipsoid) -> GeodeticPoint3D {
        let a = ellipsoid.a();
        let b = ellipsoid.b();
        let e2 = ellipsoid.e2();
        let ep2 = ellipsoid.ep2();

        let p = self.x.hypot(self.y);
        let lon = if p < f64::EPSILON { 0. } else { self.y.atan2(self.x) };

        let theta = (self.z * a).atan2(p * b);
        let (sin_theta, cos_theta) = theta.sin_cos();
        let mut lat = (self.z + ep2 * b * sin_theta.powi(3))
            .atan2(p - e2 * a * cos_theta.powi(3));

        for _ in 0..MAX_REFINEMENTS {
            let n = a / (1. - e2 * lat.sin().powi(2)).sqrt();
            let next = (self.z + e2 * n * lat.sin()).atan2(p);
            let converged = (next - lat).abs() < LATITUDE_TOLERANCE;
            lat = next;
            if converged {
                break;
            }
        }

        // Valid at the poles, unlike p / cos(lat) - N
        let (sin_lat, cos_lat) = lat.sin_cos();
        let h = p * cos_lat + self.z * sin_lat - a * (1. - e2 * sin_lat.powi(2)).sqrt();

        GeodeticPoint3D::new(
            Latitude::clamped(lat.to_degrees()),
            Longitude::new(lon.to_degrees()),
            h,
        )
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn equator_prime_meridian() {
        let point = GeodeticPoint3D::from_degrees(0., 0., 0.).unwrap();
        let ecef = EcefPoint::from_geodetic(&Ellipsoid::WGS84, &point);
        assert_abs_diff_eq!(ecef.x(), Ellipsoid::WGS84.a(), epsilon = 1e-6);
        assert_abs_diff_eq!(ecef.y(), 0., epsilon = 1e-6);
        assert_abs_diff_eq!(ecef.z(), 0., epsilon = 1e-6);
    }

    #[test]
    fn north_pole() {
        let pole = GeodeticPoint3D::from_degrees(90., 45., 100.).unwrap();
        let ecef = EcefPoint::from_geodetic(&Ellipsoid::WGS84, &pole);
        assert_abs_diff_eq!(ecef.z(), Ellipsoid::WGS84.b() + 100., epsilon = 1e-6);

        let back = EcefPoint::new(0., 0., ecef.z()).to_geodetic(&Ellipsoid::WGS84);
        assert_abs_diff_eq!(back.latitude().degrees(), 90., epsilon = 1e-12);
        assert_abs_diff_eq!(back.longitude().degrees(), 0.);
        assert_abs_diff_eq!(back.elevation(), 100., epsilon = 1e-6);
    }

    #[test]
    fn round_trips_on_every_preset() {
        let samples = [
            (38.889_097, -77.035, 10.),
            (-33.856_933, 151.215_108, 58.),
            (89.5, 179.9, -40.),
            (-72.3, -3.5, 8_000.),
            (0.001, 180., 400_000.),
        ];

        for ellipsoid in Ellipsoid::presets() {
            for (lat, lon, h) in samples {
                let point = GeodeticPoint3D::from_degrees(lat, lon, h).unwrap();
                let back = EcefPoint::from_geodetic(ellipsoid, &point).to_geodetic(ellipsoid);
                assert!(
                    back.proximally_equals(&point, 1e-6),
                    "{ellipsoid}: {point} came back as {back}"
                );
                assert_abs_diff_eq!(back.latitude().degrees(), lat, epsilon = 1e-11);
            }
        }
    }
}
