use lazy_static::lazy_static;

use crate::{
    coords::{
        ecef::EcefPoint,
        point::{GeodeticPoint2D, GeodeticPoint3D},
    },
    ellipsoid::Ellipsoid,
    Error,
};

lazy_static! {
    static ref DEFAULT_FRAME: TopocentricFrame = TopocentricFrame::default();
}

/// Local east/north/up tangent plane at an origin on an ellipsoid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TopocentricFrame {
    ellipsoid: Ellipsoid,
    origin: GeodeticPoint3D,
    origin_ecef: EcefPoint,
    sin_lat: f64,
    cos_lat: f64,
    sin_lon: f64,
    cos_lon: f64,
}

impl TopocentricFrame {
    pub fn new(ellipsoid: Ellipsoid, origin: GeodeticPoint3D) -> TopocentricFrame {
        let (sin_lat, cos_lat) = origin.latitude().radians().sin_cos();
        let (sin_lon, cos_lon) = origin.longitude().radians().sin_cos();

        Self {
            ellipsoid,
            origin,
            origin_ecef: EcefPoint::from_geodetic(&ellipsoid, &origin),
            sin_lat,
            cos_lat,
            sin_lon,
            cos_lon,
        }
    }

    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    pub fn origin(&self) -> GeodeticPoint3D {
        self.origin
    }

    /// Rotates a local vector into earth-centered coordinates.
    pub fn to_ecef(&self, point: &Topocentric3DPoint) -> EcefPoint {
        let (e, n, u) = (point.east, point.north, point.up);
        let (sl, cl, so, co) = (self.sin_lat, self.cos_lat, self.sin_lon, self.cos_lon);

        EcefPoint::new(
            self.origin_ecef.x() - so * e - sl * co * n + cl * co * u,
            self.origin_ecef.y() + co * e - sl * so * n + cl * so * u,
            self.origin_ecef.z() + cl * n + sl * u,
        )
    }

    pub fn from_ecef(&self, point: &EcefPoint) -> Topocentric3DPoint {
        let dx = point.x() - self.origin_ecef.x();
        let dy = point.y() - self.origin_ecef.y();
        let dz = point.z() - self.origin_ecef.z();
        let (sl, cl, so, co) = (self.sin_lat, self.cos_lat, self.sin_lon, self.cos_lon);

        Topocentric3DPoint {
            east: -so * dx + co * dy,
            north: -sl * co * dx - sl * so * dy + cl * dz,
            up: cl * co * dx + cl * so * dy + sl * dz,
        }
    }

    pub fn to_geodetic(&self, point: &Topocentric3DPoint) -> GeodeticPoint3D {
        self.to_ecef(point).to_geodetic(&self.ellipsoid)
    }

    pub fn from_geodetic(&self, point: &GeodeticPoint3D) -> Topocentric3DPoint {
        self.from_ecef(&EcefPoint::from_geodetic(&self.ellipsoid, point))
    }
}

impl Default for TopocentricFrame {
    /// Latitude 0°, longitude 0°, elevation 0 m on WGS84.
    fn default() -> Self {
        Self::new(Ellipsoid::WGS84, GeodeticPoint3D::default())
    }
}

fn check_finite(values: &[f64]) -> Result<(), Error> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(v) => Err(Error::InvalidCoord(format!("Topocentric offset {v} is not finite"))),
        None => Ok(()),
    }
}

/// East, north and up offsets in meters from a [`TopocentricFrame`] origin.
///
/// ```
/// use geodesy::Topocentric3DPoint;
///
/// // Offsets from the default origin at (0°, 0°, 0 m) on WGS84
/// let local = Topocentric3DPoint::new(630_084.0, 4_833_439.0, 0.0).unwrap();
/// let point = local.to_geodetic();
///
/// assert!((point.latitude().degrees() - 37.168403).abs() < 1e-6);
/// assert!((point.longitude().degrees() - 5.641835).abs() < 1e-6);
/// assert!((point.elevation() - 1_657_072.47).abs() < 0.01);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Topocentric3DPoint {
    east: f64,
    north: f64,
    up: f64,
}

impl Topocentric3DPoint {
    /// # Errors
    ///
    /// Returns [`Error::InvalidCoord`] if an offset is not finite.
    pub fn new(east: f64, north: f64, up: f64) -> Result<Topocentric3DPoint, Error> {
        check_finite(&[east, north, up])?;
        Ok(Self { east, north, up })
    }

    pub fn east(&self) -> f64 {
        self.east
    }

    pub fn north(&self) -> f64 {
        self.north
    }

    pub fn up(&self) -> f64 {
        self.up
    }

    /// Converts relative to the default frame.
    pub fn to_geodetic(&self) -> GeodeticPoint3D {
        DEFAULT_FRAME.to_geodetic(self)
    }

    /// Converts relative to the default frame.
    pub fn from_geodetic(point: &GeodeticPoint3D) -> Topocentric3DPoint {
        DEFAULT_FRAME.from_geodetic(point)
    }

    pub fn to_geodetic_in(&self, frame: &TopocentricFrame) -> GeodeticPoint3D {
        frame.to_geodetic(self)
    }

    pub fn from_geodetic_in(point: &GeodeticPoint3D, frame: &TopocentricFrame) -> Topocentric3DPoint {
        frame.from_geodetic(point)
    }
}

/// East and north offsets in meters, lying in the tangent plane of a
/// [`TopocentricFrame`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Topocentric2DPoint {
    east: f64,
    north: f64,
}

impl Topocentric2DPoint {
    /// # Errors
    ///
    /// Returns [`Error::InvalidCoord`] if an offset is not finite.
    pub fn new(east: f64, north: f64) -> Result<Topocentric2DPoint, Error> {
        check_finite(&[east, north])?;
        Ok(Self { east, north })
    }

    pub fn east(&self) -> f64 {
        self.east
    }

    pub fn north(&self) -> f64 {
        self.north
    }

    /// The surface position under this tangent-plane point in the default
    /// frame. The height above the ellipsoid is dropped.
    pub fn to_geodetic(&self) -> GeodeticPoint2D {
        self.to_geodetic_in(&DEFAULT_FRAME)
    }

    pub fn to_geodetic_in(&self, frame: &TopocentricFrame) -> GeodeticPoint2D {
        frame.to_geodetic(&Topocentric3DPoint::from(*self)).to_2d()
    }

    /// Projects a surface point into the default frame's tangent plane,
    /// dropping the up offset.
    pub fn from_geodetic(point: &GeodeticPoint2D) -> Topocentric2DPoint {
        Self::from_geodetic_in(point, &DEFAULT_FRAME)
    }

    pub fn from_geodetic_in(point: &GeodeticPoint2D, frame: &TopocentricFrame) -> Topocentric2DPoint {
        frame.from_geodetic(&point.with_elevation(0.)).into()
    }
}

impl From<Topocentric2DPoint> for Topocentric3DPoint {
    fn from(value: Topocentric2DPoint) -> Self {
        Self {
            east: value.east,
            north: value.north,
            up: 0.,
        }
    }
}

impl From<Topocentric3DPoint> for Topocentric2DPoint {
    fn from(value: Topocentric3DPoint) -> Self {
        Self {
            east: value.east,
            north: value.north,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn origin_maps_to_zero() {
        let origin = GeodeticPoint3D::from_degrees(38.889_097, -77.035, 12.).unwrap();
        let frame = TopocentricFrame::new(Ellipsoid::WGS84, origin);
        let local = frame.from_geodetic(&origin);
        assert_abs_diff_eq!(local.east(), 0., epsilon = 1e-6);
        assert_abs_diff_eq!(local.north(), 0., epsilon = 1e-6);
        assert_abs_diff_eq!(local.up(), 0., epsilon = 1e-6);
    }

    #[test]
    fn axes_point_east_north_up() {
        let origin = GeodeticPoint3D::from_degrees(45., 10., 0.).unwrap();
        let frame = TopocentricFrame::new(Ellipsoid::WGS84, origin);

        let above = GeodeticPoint3D::from_degrees(45., 10., 1_000.).unwrap();
        let local = frame.from_geodetic(&above);
        assert_abs_diff_eq!(local.up(), 1_000., epsilon = 1e-6);
        assert_abs_diff_eq!(local.east(), 0., epsilon = 1e-6);

        let north = GeodeticPoint3D::from_degrees(45.001, 10., 0.).unwrap();
        let local = frame.from_geodetic(&north);
        assert!(local.north() > 110. && local.north() < 112.);
        assert!(local.up() < 0.);

        let east = GeodeticPoint3D::from_degrees(45., 10.001, 0.).unwrap();
        let local = frame.from_geodetic(&east);
        assert!(local.east() > 78. && local.east() < 80.);
    }

    #[test]
    fn round_trip_in_custom_frame() {
        let origin = GeodeticPoint3D::from_degrees(-33.856_933, 151.215_108, 50.).unwrap();
        let frame = TopocentricFrame::new(Ellipsoid::GRS80, origin);
        let local = Topocentric3DPoint::new(-1_250.5, 3_400.25, 17.).unwrap();

        let geodetic = local.to_geodetic_in(&frame);
        let back = Topocentric3DPoint::from_geodetic_in(&geodetic, &frame);
        assert_abs_diff_eq!(back.east(), local.east(), epsilon = 1e-6);
        assert_abs_diff_eq!(back.north(), local.north(), epsilon = 1e-6);
        assert_abs_diff_eq!(back.up(), local.up(), epsilon = 1e-6);
    }

    #[test]
    fn planar_points_drop_height() {
        let plane = Topocentric2DPoint::new(1_000., -2_000.).unwrap();
        let surface = plane.to_geodetic();
        assert!(surface.latitude().degrees() < 0.);
        assert!(surface.longitude().degrees() > 0.);

        let back = Topocentric2DPoint::from_geodetic(&surface);
        // The tangent plane and the surface separate by under a meter here
        assert_abs_diff_eq!(back.east(), 1_000., epsilon = 1.);
        assert_abs_diff_eq!(back.north(), -2_000., epsilon = 1.);
    }

    #[test]
    fn rejects_non_finite_offsets() {
        assert!(Topocentric3DPoint::new(f64::NAN, 0., 0.).is_err());
        assert!(Topocentric2DPoint::new(0., f64::INFINITY).is_err());
    }
}
