//! Transverse Mercator with Krüger's series to sixth order in the third
//! flattening, accurate to a few nanometers within 3900 km of the central
//! meridian.

use std::f64::consts::PI;

use lazy_static::lazy_static;
use num::Complex;

use crate::{
    angle::{Latitude, Longitude},
    constants::UTM_K0,
    coords::point::GeodeticPoint2D,
    ellipsoid::Ellipsoid,
    utility::{dms, polyval, GeoMath},
    ThisOrThat,
};

// ================================
// Transverse Mercator Constants
// ================================

const B1_COEFF: [f64; 5] = [
    // b1*(n+1), polynomial in n2 of order 3
    1., 4., 64., 256., 256.,
];  // count = 5

#[allow(clippy::unreadable_literal)]
const ALP_COEFF: [f64; 27] = [
    // alp[1]/n^1, polynomial in n of order 5
    31564., -66675., 34440., 47250., -100800., 75600., 151200.,
    // alp[2]/n^2, polynomial in n of order 4
    -1983433., 863232., 748608., -1161216., 524160., 1935360.,
    // alp[3]/n^3, polynomial in n of order 3
    670412., 406647., -533952., 184464., 725760.,
    // alp[4]/n^4, polynomial in n of order 2
    6601661., -7732800., 2230245., 7257600.,
    // alp[5]/n^5, polynomial in n of order 1
    -13675556., 3438171., 7983360.,
    // alp[6]/n^6, polynomial in n of order 0
    212378941., 319334400.,
];  // count = 27

#[allow(clippy::unreadable_literal)]
const BET_COEFF: [f64; 27] = [
    // bet[1]/n^1, polynomial in n of order 5
    384796., -382725., -6720., 932400., -1612800., 1209600., 2419200.,
    // bet[2]/n^2, polynomial in n of order 4
    -1118711., 1695744., -1174656., 258048., 80640., 3870720.,
    // bet[3]/n^3, polynomial in n of order 3
    22276., -16929., -15984., 12852., 362880.,
    // bet[4]/n^4, polynomial in n of order 2
    -830251., -158400., 197865., 7257600.,
    // bet[5]/n^5, polynomial in n of order 1
    -435388., 453717., 15966720.,
    // bet[6]/n^6, polynomial in n of order 0
    20648693., 638668800.,
];  // count = 27

const MAXPOW: usize = 6;

lazy_static! {
    static ref UTM: TransverseMercator = TransverseMercator::new(&Ellipsoid::WGS84, UTM_K0);
}

#[derive(Clone, Debug)]
pub struct TransverseMercator {
    k0: f64,
    es: f64,
    a1: f64,
    alp: [f64; MAXPOW + 1],
    bet: [f64; MAXPOW + 1],
}

impl TransverseMercator {
    /// Builds the projection for `ellipsoid` with central scale `k0`.
    pub fn new(ellipsoid: &Ellipsoid, k0: f64) -> TransverseMercator {
        let f = ellipsoid.f();
        let n = ellipsoid.n();
        let es = (f < 0.).ternary(-1., 1.) * ellipsoid.e2().abs().sqrt();

        let m = MAXPOW / 2;
        let b1 = polyval(&B1_COEFF[0..=m], n.powi(2)) / (B1_COEFF[m + 1] * (1. + n));
        // a1 is the equivalent radius for computing the circumference of
        // ellipse.
        let a1 = b1 * ellipsoid.a();

        let mut alp = [0_f64; MAXPOW + 1];
        let mut bet = [0_f64; MAXPOW + 1];

        let mut o = 0;
        let mut d = n;

        for l in 1..=MAXPOW {
            let m = MAXPOW - l;
            alp[l] = d * polyval(&ALP_COEFF[o..=o+m], n) / ALP_COEFF[o + m + 1];
            bet[l] = d * polyval(&BET_COEFF[o..=o+m], n) / BET_COEFF[o + m + 1];
            o += m + 2;
            d *= n;
        }

        Self {
            k0,
            es,
            a1,
            alp,
            bet,
        }
    }

    /// The shared WGS84 instance with the UTM scale factor.
    pub fn utm() -> &'static TransverseMercator {
        &UTM
    }

    pub fn k0(&self) -> f64 {
        self.k0
    }

    /// Projects `point` about central meridian `lon0` (degrees). Returns
    /// `(x, y)` in meters without any false origin.
    #[allow(clippy::similar_names)]
    pub fn forward(&self, lon0: f64, point: &GeodeticPoint2D) -> (f64, f64) {
        let lat = point.latitude().degrees();
        let lon = lon0.ang_diff(point.longitude().degrees());

        let mut lat_sign = lat.is_sign_negative().ternary(-1., 1.);
        let lon_sign = lon.is_sign_negative().ternary(-1., 1.);
        let lat = lat * lat_sign;
        let mut lon = lon * lon_sign;

        let backside = lon > f64::from(dms::QD);
        if backside {
            if lat.is_zero() {
                lat_sign = -1.;
            }
            lon = f64::from(dms::HD) - lon;
        }

        let (xip, etap) = if lat.eps_eq(f64::from(dms::QD)) {
            (PI / 2., 0.)
        } else {
            let taup = lat.to_radians().tan().taupf(self.es);
            let (slam, clam) = lon.to_radians().sin_cos();
            (taup.atan2(clam), (slam / taup.hypot(clam)).asinh())
        };

        let c0 = (2. * xip).cos();
        let ch0 = (2. * etap).cosh();
        let s0 = (2. * xip).sin();
        let sh0 = (2. * etap).sinh();

        // Clenshaw summation of the alp series
        let a = Complex::new(2. * c0 * ch0, -2. * s0 * sh0);
        let mut n = MAXPOW;
        let mut y0 = Complex::default();
        let mut y1 = Complex::default();

        while n > 0 {
            y1 = a * y0 - y1 + self.alp[n];
            n -= 1;
            y0 = a * y1 - y0 + self.alp[n];
            n -= 1;
        }

        let a = Complex::new(s0 * ch0, c0 * sh0);
        let y1 = Complex::new(xip, etap) + a * y0;

        let xi = backside.ternary(PI - y1.re, y1.re);
        let eta = y1.im;

        let x = self.a1 * self.k0 * eta * lon_sign;
        let y = self.a1 * self.k0 * xi * lat_sign;

        (x, y)
    }

    /// Inverse of [`TransverseMercator::forward`].
    pub fn reverse(&self, lon0: f64, x: f64, y: f64) -> GeodeticPoint2D {
        let mut xi = y / (self.a1 * self.k0);
        let mut eta = x / (self.a1 * self.k0);

        let xi_sign = (!xi.is_sign_positive()).ternary(-1., 1.);
        let eta_sign = (!eta.is_sign_positive()).ternary(-1., 1.);

        xi *= xi_sign;
        eta *= eta_sign;

        let backside = xi > PI/2.;
        if backside {
            xi = PI - xi;
        }

        let c0 = (2. * xi).cos();
        let ch0 = (2. * eta).cosh();
        let s0 = (2. * xi).sin();
        let sh0 = (2. * eta).sinh();

        let a = Complex::new(2. * c0 * ch0, -2. * s0 * sh0);
        let mut n = MAXPOW;

        let mut y0 = Complex::default();
        let mut y1 = Complex::default();

        while n > 0 {
            y1 = a * y0 - y1 - self.bet[n];
            n -= 1;
            y0 = a * y1 - y0 - self.bet[n];
            n -= 1;
        }

        let a = Complex::new(s0 * ch0, c0 * sh0);
        let y1 = Complex::new(xi, eta) + a * y0;

        let xip = y1.re;
        let etap = y1.im;
        let s = etap.sinh();
        let c = 0_f64.max(xip.cos());
        let r = s.hypot(c);

        let (mut lat, mut lon) = if r.is_zero() {
            (f64::from(dms::QD), 0.)
        } else {
            let lon = s.atan2(c).to_degrees();
            let tau = (xip.sin() / r).tauf(self.es);

            (tau.atan().to_degrees(), lon)
        };

        lat *= xi_sign;
        if backside {
            lon = f64::from(dms::HD) - lon;
        }
        lon *= eta_sign;

        GeodeticPoint2D::new(Latitude::clamped(lat), Longitude::new(lon + lon0))
    }
}
