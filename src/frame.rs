use crate::{
    angle::Angle,
    constants::PROXIMITY_TOLERANCE_DEG,
    coords::{
        point::{GeodeticPoint2D, GeodeticPoint3D},
        topocentric::TopocentricFrame,
    },
    ellipsoid::Ellipsoid,
    geodesic::GeodeticArc,
    Error,
};

/// The ellipsoid, local origin and equality tolerance shared by a set of
/// computations.
///
/// ```
/// use geodesy::{Ellipsoid, FrameOfReference, GeodeticPoint3D};
///
/// let frame = FrameOfReference::default()
///     .with_ellipsoid(Ellipsoid::GRS80)
///     .with_origin(GeodeticPoint3D::from_degrees(51.4779, 0.0, 46.0).unwrap());
///
/// assert_eq!(frame.ellipsoid(), &Ellipsoid::GRS80);
/// assert_eq!(frame.proximity_tolerance(), 1e-9);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameOfReference {
    ellipsoid: Ellipsoid,
    origin: GeodeticPoint3D,
    /// In degrees
    proximity_tolerance: f64,
}

impl FrameOfReference {
    /// # Errors
    ///
    /// Returns [`Error::InvalidCoord`] if the tolerance is negative or not
    /// finite.
    pub fn new(ellipsoid: Ellipsoid, origin: GeodeticPoint3D, proximity_tolerance: f64) -> Result<FrameOfReference, Error> {
        check_tolerance(proximity_tolerance)?;
        Ok(Self {
            ellipsoid,
            origin,
            proximity_tolerance,
        })
    }

    pub fn with_ellipsoid(self, ellipsoid: Ellipsoid) -> FrameOfReference {
        Self { ellipsoid, ..self }
    }

    pub fn with_origin(self, origin: GeodeticPoint3D) -> FrameOfReference {
        Self { origin, ..self }
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidCoord`] if the tolerance is negative or not
    /// finite.
    pub fn with_tolerance(self, proximity_tolerance: f64) -> Result<FrameOfReference, Error> {
        check_tolerance(proximity_tolerance)?;
        Ok(Self { proximity_tolerance, ..self })
    }

    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    pub fn origin(&self) -> GeodeticPoint3D {
        self.origin
    }

    pub fn proximity_tolerance(&self) -> f64 {
        self.proximity_tolerance
    }

    /// The east/north/up frame at this origin.
    pub fn topocentric(&self) -> TopocentricFrame {
        TopocentricFrame::new(self.ellipsoid, self.origin)
    }

    pub fn points_equal(&self, a: &GeodeticPoint2D, b: &GeodeticPoint2D) -> bool {
        a.proximally_equals(b, self.proximity_tolerance)
    }

    /// # Errors
    ///
    /// See [`GeodeticArc::inverse`].
    pub fn arc(&self, from: &GeodeticPoint2D, to: &GeodeticPoint2D) -> Result<GeodeticArc, Error> {
        GeodeticArc::inverse(&self.ellipsoid, from, to)
    }

    /// # Errors
    ///
    /// See [`GeodeticArc::direct`].
    pub fn destination(&self, from: &GeodeticPoint2D, azimuth: Angle, distance: f64) -> Result<GeodeticPoint2D, Error> {
        Ok(GeodeticArc::direct(&self.ellipsoid, from, azimuth, distance)?.point2())
    }
}

impl Default for FrameOfReference {
    /// WGS84, origin at (0°, 0°, 0 m), tolerance 1e-9°.
    fn default() -> Self {
        Self {
            ellipsoid: Ellipsoid::WGS84,
            origin: GeodeticPoint3D::default(),
            proximity_tolerance: PROXIMITY_TOLERANCE_DEG,
        }
    }
}

fn check_tolerance(tolerance: f64) -> Result<(), Error> {
    if tolerance.is_finite() && tolerance >= 0. {
        Ok(())
    } else {
        Err(Error::InvalidCoord(format!("Proximity tolerance {tolerance} must be finite and non-negative")))
    }
}
