use lazy_static::lazy_static;

use crate::{
    angle::{Latitude, Longitude},
    constants::UPS_K0,
    coords::point::GeodeticPoint2D,
    ellipsoid::Ellipsoid,
    utility::{dms, GeoMath},
    Error, ThisOrThat,
};

lazy_static! {
    static ref UPS: PolarStereographic = PolarStereographic::new(&Ellipsoid::WGS84, UPS_K0);
}

/// Ellipsoidal polar stereographic projection centered on either pole.
#[derive(Clone, Debug)]
pub struct PolarStereographic {
    a: f64,
    e2: f64,
    k0: f64,
    es: f64,
    c: f64,
}

impl PolarStereographic {
    /// Builds the projection for `ellipsoid` with scale `k0` at the pole.
    pub fn new(ellipsoid: &Ellipsoid, k0: f64) -> PolarStereographic {
        let f = ellipsoid.f();
        let e2 = ellipsoid.e2();
        let es = (f < 0.).ternary(-1., 1.) * e2.abs().sqrt();
        let c = (1. - f) * 1_f64.eatanhe(es).exp();

        Self {
            a: ellipsoid.a(),
            e2,
            k0,
            es,
            c,
        }
    }

    /// Builds the projection whose scale is exactly 1 along the parallel
    /// `standard_parallel`. The sign of the latitude is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCoord`] for the equator.
    ///
    /// ```
    /// use geodesy::{projections::polar_stereographic::PolarStereographic, Ellipsoid, Latitude};
    ///
    /// let parallel = Latitude::from_degrees(81.114_527_8).unwrap();
    /// let ps = PolarStereographic::with_standard_parallel(&Ellipsoid::WGS84, parallel).unwrap();
    /// assert!((ps.k0() - 0.994).abs() < 1e-7);
    /// ```
    pub fn with_standard_parallel(ellipsoid: &Ellipsoid, standard_parallel: Latitude) -> Result<PolarStereographic, Error> {
        let lat = standard_parallel.degrees().abs();
        if lat.is_zero() {
            return Err(Error::InvalidCoord(
                "The standard parallel of a polar projection cannot be the equator".to_string(),
            ));
        }

        let unit = Self::new(ellipsoid, 1.);
        Ok(Self::new(ellipsoid, 1. / unit.scale(lat)))
    }

    /// The shared WGS84 instance with the UPS scale factor.
    pub fn ups() -> &'static PolarStereographic {
        &UPS
    }

    pub fn k0(&self) -> f64 {
        self.k0
    }

    /// Distance from the pole in meters for a latitude in the projection's
    /// own hemisphere, in degrees.
    fn rho(&self, lat: f64) -> f64 {
        let taup = lat.to_radians().tan().taupf(self.es);
        let rho = 1_f64.hypot(taup) + taup.abs();
        let rho = (taup >= 0.).ternary_lazy(|| (lat != f64::from(dms::QD)).ternary_lazy(|| 1. / rho, || 0.), || rho);
        rho * 2. * self.k0 * self.a / self.c
    }

    /// Point scale at latitude `lat` (degrees) measured from the
    /// projection's pole.
    pub fn scale(&self, lat: f64) -> f64 {
        let lat = lat.abs();
        if lat >= f64::from(dms::QD) {
            return self.k0;
        }

        let secphi = 1_f64.hypot(lat.to_radians().tan());
        (self.rho(lat) / self.a) * secphi * ((1. - self.e2) + self.e2 / secphi.powi(2)).sqrt()
    }

    /// Projects `point` about the north (`northp`) or south pole. Returns
    /// `(x, y)` in meters without any false origin.
    pub fn forward(&self, northp: bool, point: &GeodeticPoint2D) -> (f64, f64) {
        let lat = point.latitude().degrees() * northp.ternary(1., -1.);
        let rho = self.rho(lat);

        let (x, y) = point.longitude().radians().sin_cos();

        (x * rho, y * northp.ternary(-rho, rho))
    }

    /// Inverse of [`PolarStereographic::forward`].
    pub fn reverse(&self, northp: bool, x: f64, y: f64) -> GeodeticPoint2D {
        let rho = x.hypot(y);
        let t = (rho != 0.)
            .ternary_lazy(
                || rho / (2. * self.k0 * self.a / self.c),
                || f64::EPSILON.powi(2)
            );
        let taup = (1. / t - t) / 2.;
        let tau = taup.tauf(self.es);

        let lat = northp.ternary(1., -1.) * tau.atan().to_degrees();
        let lon = x.atan2(northp.ternary(-y, y)).to_degrees();

        GeodeticPoint2D::new(Latitude::clamped(lat), Longitude::new(lon))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::Hemisphere;

    #[test]
    fn ups_north_reference() {
        let ps = PolarStereographic::ups();
        let lat = Latitude::from_dms(Hemisphere::North, 88, 38, 33.24).unwrap();
        let lon = Longitude::from_dms(false, 79, 23, 13.7).unwrap();
        let point = GeodeticPoint2D::new(lat, lon);

        let (x, y) = ps.forward(true, &point);
        assert_abs_diff_eq!(x + 2_000_000., 1_851_863.92, epsilon = 0.01);
        assert_abs_diff_eq!(y + 2_000_000., 1_972_242.67, epsilon = 0.01);

        let back = ps.reverse(true, x, y);
        assert!(back.proximally_equals(&point, 1e-10));
    }

    #[test]
    fn south_pole_is_origin() {
        let ps = PolarStereographic::ups();
        let pole = GeodeticPoint2D::from_degrees(-90., 0.).unwrap();
        let (x, y) = ps.forward(false, &pole);
        assert_abs_diff_eq!(x, 0.);
        assert_abs_diff_eq!(y, 0.);

        let back = ps.reverse(false, 0., 0.);
        assert_abs_diff_eq!(back.latitude().degrees(), -90., epsilon = 1e-12);
    }

    #[test]
    fn meridian_directions() {
        // North of the north pole projection, 0° points down the grid and
        // 90°E points right
        let ps = PolarStereographic::ups();
        let prime = GeodeticPoint2D::from_degrees(85., 0.).unwrap();
        let (x, y) = ps.forward(true, &prime);
        assert_abs_diff_eq!(x, 0., epsilon = 1e-9);
        assert!(y < 0.);

        let east = GeodeticPoint2D::from_degrees(85., 90.).unwrap();
        let (x, y) = ps.forward(true, &east);
        assert!(x > 0.);
        assert_abs_diff_eq!(y, 0., epsilon = 1e-9);

        // The south projection flips the y axis
        let south = GeodeticPoint2D::from_degrees(-85., 0.).unwrap();
        let (_, y) = ps.forward(false, &south);
        assert!(y > 0.);
    }

    #[test]
    fn scale_at_pole_and_standard_parallel() {
        let ps = PolarStereographic::ups();
        assert_abs_diff_eq!(ps.scale(90.), 0.994);
        assert!(ps.scale(80.) > 1.);

        let parallel = Latitude::from_degrees(-71.).unwrap();
        let secant = PolarStereographic::with_standard_parallel(&Ellipsoid::WGS84, parallel).unwrap();
        assert_abs_diff_eq!(secant.scale(71.), 1., epsilon = 1e-12);
        assert!(secant.k0() < 1.);

        assert!(PolarStereographic::with_standard_parallel(&Ellipsoid::WGS84, Latitude::default()).is_err());
    }
}
