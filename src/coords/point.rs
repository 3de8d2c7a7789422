use std::{fmt::Display, str::FromStr};

use crate::{
    angle::{Latitude, Longitude},
    constants::PROXIMITY_TOLERANCE_DEG,
    coords::{mgrs::Mgrs, utm_ups::UtmUps},
    parse,
    utility::GeoMath,
    Error, ParseCoord,
};

/// A position on the ellipsoid surface.
///
/// Equality is exact numeric equality of the two angles; use
/// [`GeodeticPoint2D::proximally_equals`] for a tolerant comparison.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeodeticPoint2D {
    #[cfg_attr(feature = "serde", serde(alias = "lat"))]
    latitude: Latitude,
    #[cfg_attr(feature = "serde", serde(alias = "lon"))]
    longitude: Longitude,
}

impl GeodeticPoint2D {
    pub fn new(latitude: Latitude, longitude: Longitude) -> GeodeticPoint2D {
        Self {
            latitude,
            longitude,
        }
    }

    /// Tries to create a point from a lat/lon pair in degrees. Latitude must
    /// be in `[-90, 90]`; longitude is normalized into `(-180, 180]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCoord`] if either value is invalid.
    ///
    /// # Usage
    ///
    /// ```
    /// use geodesy::GeodeticPoint2D;
    ///
    /// let coord = GeodeticPoint2D::from_degrees(40.748333, -73.985278).unwrap();
    /// assert!((coord.latitude().degrees() - 40.748333).abs() < 1e-12);
    ///
    /// assert!(GeodeticPoint2D::from_degrees(100.0, 0.0).is_err());
    /// assert!(GeodeticPoint2D::from_degrees(0.0, f64::NAN).is_err());
    /// ```
    pub fn from_degrees(lat: f64, lon: f64) -> Result<GeodeticPoint2D, Error> {
        Ok(Self::new(Latitude::from_degrees(lat)?, Longitude::from_degrees(lon)?))
    }

    pub fn latitude(&self) -> Latitude {
        self.latitude
    }

    pub fn longitude(&self) -> Longitude {
        self.longitude
    }

    pub fn is_north(&self) -> bool {
        self.latitude.hemisphere().is_north()
    }

    pub fn with_elevation(&self, elevation: f64) -> GeodeticPoint3D {
        GeodeticPoint3D::new(self.latitude, self.longitude, elevation)
    }

    /// Compares within `tolerance` degrees on each axis, treating longitudes
    /// either side of the antimeridian as neighbors.
    ///
    /// ```
    /// use geodesy::GeodeticPoint2D;
    ///
    /// let a = GeodeticPoint2D::from_degrees(10.0, 179.999_999_999_9).unwrap();
    /// let b = GeodeticPoint2D::from_degrees(10.0, -179.999_999_999_9).unwrap();
    /// assert!(a.proximally_equals(&b, 1e-9));
    /// assert_ne!(a, b);
    /// ```
    pub fn proximally_equals(&self, other: &GeodeticPoint2D, tolerance: f64) -> bool {
        let dlat = (self.latitude.degrees() - other.latitude.degrees()).abs();
        let dlon = self.longitude.degrees().ang_diff(other.longitude.degrees()).abs();
        dlat <= tolerance && dlon <= tolerance
    }

    /// [`GeodeticPoint2D::proximally_equals`] at the default tolerance.
    pub fn approx_eq(&self, other: &GeodeticPoint2D) -> bool {
        self.proximally_equals(other, PROXIMITY_TOLERANCE_DEG)
    }

    /// Converts into the standard UTM or UPS zone for this point.
    ///
    /// # Errors
    ///
    /// Returns an error if the projected values fall outside the grid ranges.
    pub fn to_utm_ups(&self) -> Result<UtmUps, Error> {
        UtmUps::from_point(self)
    }

    /// Encodes the point as an MGRS reference.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMgrs`] if the precision is not in `0..=5`.
    pub fn to_mgrs(&self, precision: usize) -> Result<Mgrs, Error> {
        Mgrs::from_point(self, precision)
    }
}

impl Display for GeodeticPoint2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.longitude, self.latitude)
    }
}

impl FromStr for GeodeticPoint2D {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse::parse_lat_lon(s)
    }
}

impl ParseCoord for GeodeticPoint2D {
    fn parse_coord(value: &str) -> Result<Self, Error> {
        value.parse()
    }
}

/// A position with a height above the ellipsoid, in meters.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeodeticPoint3D {
    #[cfg_attr(feature = "serde", serde(flatten))]
    point: GeodeticPoint2D,
    elevation: f64,
}

impl GeodeticPoint3D {
    pub fn new(latitude: Latitude, longitude: Longitude, elevation: f64) -> GeodeticPoint3D {
        Self {
            point: GeodeticPoint2D::new(latitude, longitude),
            elevation,
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidCoord`] if an angle is invalid or the
    /// elevation is not finite.
    ///
    /// ```
    /// use geodesy::GeodeticPoint3D;
    ///
    /// let p = GeodeticPoint3D::from_degrees(38.8891, -77.035, 10.0).unwrap();
    /// assert_eq!(p.to_string(), "(77° 2' 6\" W, 38° 53' 21\" N) @ 10m");
    /// assert!(GeodeticPoint3D::from_degrees(0.0, 0.0, f64::INFINITY).is_err());
    /// ```
    pub fn from_degrees(lat: f64, lon: f64, elevation: f64) -> Result<GeodeticPoint3D, Error> {
        if !elevation.is_finite() {
            return Err(Error::InvalidCoord(format!("Elevation {elevation} is not finite")));
        }
        let point = GeodeticPoint2D::from_degrees(lat, lon)?;
        Ok(point.with_elevation(elevation))
    }

    pub fn latitude(&self) -> Latitude {
        self.point.latitude
    }

    pub fn longitude(&self) -> Longitude {
        self.point.longitude
    }

    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    pub fn to_2d(&self) -> GeodeticPoint2D {
        self.point
    }

    /// Angles within `tolerance` degrees and elevation within `tolerance`
    /// meters.
    pub fn proximally_equals(&self, other: &GeodeticPoint3D, tolerance: f64) -> bool {
        self.point.proximally_equals(&other.point, tolerance)
            && (self.elevation - other.elevation).abs() <= tolerance
    }
}

impl From<GeodeticPoint3D> for GeodeticPoint2D {
    fn from(value: GeodeticPoint3D) -> Self {
        value.point
    }
}

impl From<GeodeticPoint2D> for GeodeticPoint3D {
    fn from(value: GeodeticPoint2D) -> Self {
        value.with_elevation(0.)
    }
}

impl Display for GeodeticPoint3D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut buf = ryu::Buffer::new();
        let elevation = buf.format(self.elevation);
        write!(f, "{} @ {}m", self.point, elevation.trim_end_matches(".0"))
    }
}
