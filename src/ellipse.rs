use std::fmt::Display;

use crate::{
    angle::Angle,
    bounds::Bounds2D,
    coords::point::GeodeticPoint2D,
    ellipsoid::Ellipsoid,
    geodesic::GeodeticArc,
    Error,
};

/// An ellipse on the ellipsoid surface, given by its center, semi-axes in
/// meters and the azimuth of the semi-major axis.
///
/// The orientation is folded into `[0°, 180°)` on construction, so two
/// ellipses pointing in opposite directions compare equal.
///
/// ```
/// use geodesy::{Angle, GeodeticEllipse, GeodeticPoint2D};
///
/// let boston = GeodeticPoint2D::from_degrees(42.369_936, -71.027_861).unwrap();
/// let a = GeodeticEllipse::new(boston, 4000.0, 2500.0, Angle::from_degrees(45.0).unwrap()).unwrap();
/// let b = GeodeticEllipse::new(boston, 4000.0, 2500.0, Angle::from_degrees(-135.0).unwrap()).unwrap();
/// assert_eq!(a, b);
///
/// assert!(GeodeticEllipse::new(boston, 1000.0, 2500.0, Angle::ZERO).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeodeticEllipse {
    center: GeodeticPoint2D,
    semi_major: f64,
    semi_minor: f64,
    orientation: Angle,
}

impl GeodeticEllipse {
    /// # Errors
    ///
    /// Returns [`Error::InvalidEllipse`] if an axis is negative or not
    /// finite, or if the semi-major axis is shorter than the semi-minor.
    pub fn new(center: GeodeticPoint2D, semi_major: f64, semi_minor: f64, orientation: Angle) -> Result<GeodeticEllipse, Error> {
        for (label, value) in [("Semi-major", semi_major), ("Semi-minor", semi_minor)] {
            if !value.is_finite() || value < 0. {
                return Err(Error::InvalidEllipse(format!("{label} axis {value} must be finite and non-negative")));
            }
        }
        if semi_major < semi_minor {
            return Err(Error::InvalidEllipse(format!(
                "Semi-major axis {semi_major} is shorter than semi-minor axis {semi_minor}"
            )));
        }

        Ok(Self {
            center,
            semi_major,
            semi_minor,
            orientation: fold_orientation(orientation),
        })
    }

    /// A circle of `radius` meters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEllipse`] if the radius is negative or not
    /// finite.
    pub fn circle(center: GeodeticPoint2D, radius: f64) -> Result<GeodeticEllipse, Error> {
        Self::new(center, radius, radius, Angle::ZERO)
    }

    pub fn center(&self) -> GeodeticPoint2D {
        self.center
    }

    pub fn semi_major(&self) -> f64 {
        self.semi_major
    }

    pub fn semi_minor(&self) -> f64 {
        self.semi_minor
    }

    /// Azimuth of the semi-major axis, in `[0°, 180°)`.
    pub fn orientation(&self) -> Angle {
        self.orientation
    }

    /// Distance from the center to the perimeter along `azimuth`.
    pub fn radius_at(&self, azimuth: Angle) -> f64 {
        let theta = (azimuth - self.orientation).radians();
        let (sin, cos) = theta.sin_cos();
        let (a, b) = (self.semi_major, self.semi_minor);
        let denom = (b * cos).hypot(a * sin);
        if denom == 0. { 0. } else { a * b / denom }
    }

    /// The perimeter point along `azimuth` from the center.
    ///
    /// # Errors
    ///
    /// Propagates a geodesic failure.
    pub fn perimeter_point(&self, ellipsoid: &Ellipsoid, azimuth: Angle) -> Result<GeodeticPoint2D, Error> {
        let arc = GeodeticArc::direct(ellipsoid, &self.center, azimuth, self.radius_at(azimuth))?;
        Ok(arc.point2())
    }

    /// See [`Bounds2D::from_ellipse`].
    ///
    /// # Errors
    ///
    /// Propagates a geodesic failure.
    pub fn bounds(&self, ellipsoid: &Ellipsoid) -> Result<Bounds2D, Error> {
        Bounds2D::from_ellipse(ellipsoid, self)
    }
}

fn fold_orientation(orientation: Angle) -> Angle {
    let degrees = orientation.degrees().rem_euclid(180.);
    // rem_euclid rounds tiny negative values up to the modulus
    Angle::new_degrees(if degrees >= 180. { 0. } else { degrees })
}

impl Display for GeodeticEllipse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut buf = ryu::Buffer::new();
        let major = buf.format(self.semi_major).to_string();
        let minor = buf.format(self.semi_minor).to_string();
        write!(f, "{} {}m x {}m @ {}", self.center, major, minor, self.orientation)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn orientation_is_folded() {
        let center = GeodeticPoint2D::default();
        for (given, folded) in [(0., 0.), (45., 45.), (180., 0.), (-30., 150.), (225., 45.), (-180., 0.)] {
            let ellipse = GeodeticEllipse::new(center, 10., 5., Angle::from_degrees(given).unwrap()).unwrap();
            assert_abs_diff_eq!(ellipse.orientation().degrees(), folded, epsilon = 1e-9);
        }
    }

    #[test]
    fn axes_are_validated() {
        let center = GeodeticPoint2D::default();
        assert!(matches!(GeodeticEllipse::new(center, 1., 2., Angle::ZERO), Err(Error::InvalidEllipse(_))));
        assert!(matches!(GeodeticEllipse::new(center, 1., -1., Angle::ZERO), Err(Error::InvalidEllipse(_))));
        assert!(matches!(GeodeticEllipse::new(center, f64::NAN, 1., Angle::ZERO), Err(Error::InvalidEllipse(_))));
        assert!(GeodeticEllipse::new(center, 0., 0., Angle::ZERO).is_ok());
        assert!(GeodeticEllipse::circle(center, 500.).is_ok());
    }

    #[test]
    fn radius_follows_the_axes() {
        let center = GeodeticPoint2D::default();
        let ellipse = GeodeticEllipse::new(center, 4000., 1000., Angle::from_degrees(30.).unwrap()).unwrap();
        assert_abs_diff_eq!(ellipse.radius_at(Angle::from_degrees(30.).unwrap()), 4000., epsilon = 1e-6);
        assert_abs_diff_eq!(ellipse.radius_at(Angle::from_degrees(210.).unwrap()), 4000., epsilon = 1e-6);
        assert_abs_diff_eq!(ellipse.radius_at(Angle::from_degrees(120.).unwrap()), 1000., epsilon = 1e-6);

        let dot = GeodeticEllipse::new(center, 0., 0., Angle::ZERO).unwrap();
        assert_abs_diff_eq!(dot.radius_at(Angle::ZERO), 0.);
    }

    #[test]
    fn perimeter_point_lies_on_the_axis() {
        let center = GeodeticPoint2D::from_degrees(10., 20.).unwrap();
        let ellipse = GeodeticEllipse::new(center, 4000., 1000., Angle::ZERO).unwrap();
        let tip = ellipse.perimeter_point(&Ellipsoid::WGS84, Angle::ZERO).unwrap();
        let arc = GeodeticArc::inverse(&Ellipsoid::WGS84, &center, &tip).unwrap();
        assert_abs_diff_eq!(arc.distance(), 4000., epsilon = 1e-3);
        assert_abs_diff_eq!(tip.longitude().degrees(), 20., epsilon = 1e-9);
    }
}
