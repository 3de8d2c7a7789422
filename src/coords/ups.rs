use std::fmt::Display;

use crate::{
    coords::{
        mgrs::{TILE, UPSEASTING},
        point::GeodeticPoint2D,
        utm_ups::{check_coords, zonespec, UtmUps},
    },
    Error, Hemisphere,
};

/// Lowest northern latitude accepted for UPS.
const MIN_NORTH_LAT: f64 = 83.5;
/// Highest southern latitude accepted for UPS.
const MAX_SOUTH_LAT: f64 = -79.5;

/// A Universal Polar Stereographic coordinate on WGS84.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ups {
    hemisphere: Hemisphere,
    easting: f64,
    northing: f64,
}

impl Ups {
    /// # Errors
    ///
    /// Returns [`Error::InvalidHemisphere`] unless `hemisphere` is `N` or
    /// `S`, and [`Error::InvalidUps`] unless easting and northing lie
    /// strictly between 0 and 4,000 km and inside the polar grid.
    ///
    /// ```
    /// use geodesy::{Error, Ups};
    ///
    /// assert!(Ups::create('N', 1_851_863.92, 1_972_242.67).is_ok());
    /// assert_eq!(
    ///     Ups::create('X', 1_851_863.92, 1_972_242.67),
    ///     Err(Error::InvalidHemisphere('X'))
    /// );
    /// assert!(Ups::create('S', 2_000_000.0, 0.0).is_err());
    /// ```
    pub fn create(hemisphere: char, easting: f64, northing: f64) -> Result<Ups, Error> {
        let hemisphere = Hemisphere::from_char(hemisphere)?;
        let limit = f64::from(2 * UPSEASTING * TILE);

        for (label, value) in [("Easting", easting), ("Northing", northing)] {
            if !(value > 0. && value < limit) {
                return Err(Error::InvalidUps(format!("{label} {value} not strictly inside (0, {limit})")));
            }
        }
        check_coords(false, hemisphere.is_north(), easting, northing)?;

        Ok(Self {
            hemisphere,
            easting,
            northing,
        })
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] if the latitude is not within a
    /// polar cap (at least 83.5°N or 79.5°S).
    ///
    /// ```
    /// use geodesy::{GeodeticPoint2D, Ups};
    ///
    /// let point = GeodeticPoint2D::from_degrees(-89.5, -45.0).unwrap();
    /// let ups = Ups::from_point(&point).unwrap();
    /// assert_eq!(ups.hemisphere().as_char(), 'S');
    /// assert!(ups.to_point().proximally_equals(&point, 1e-9));
    ///
    /// let temperate = GeodeticPoint2D::from_degrees(45.0, 0.0).unwrap();
    /// assert!(Ups::from_point(&temperate).is_err());
    /// ```
    pub fn from_point(point: &GeodeticPoint2D) -> Result<Ups, Error> {
        let lat = point.latitude().degrees();
        if lat > MAX_SOUTH_LAT && lat < MIN_NORTH_LAT {
            return Err(Error::InvalidRange {
                coord_type: "Geodetic".to_string(),
                dest_type: "UPS".to_string(),
                msg: format!("Latitude {lat} not within the polar caps [{MIN_NORTH_LAT}, 90] or [-90, {MAX_SOUTH_LAT}]"),
            });
        }

        Self::try_from(UtmUps::from_point_with_zone(point, zonespec::UPS)?)
    }

    pub fn to_point(&self) -> GeodeticPoint2D {
        UtmUps::from(*self).to_point()
    }

    pub fn hemisphere(&self) -> Hemisphere {
        self.hemisphere
    }

    pub fn easting(&self) -> f64 {
        self.easting
    }

    pub fn northing(&self) -> f64 {
        self.northing
    }
}

impl From<Ups> for UtmUps {
    fn from(value: Ups) -> Self {
        UtmUps::new(zonespec::UPS, value.hemisphere.is_north(), value.easting, value.northing)
    }
}

impl TryFrom<UtmUps> for Ups {
    type Error = Error;

    fn try_from(value: UtmUps) -> Result<Self, Self::Error> {
        if value.is_utm() {
            return Err(Error::InvalidRange {
                coord_type: "UTM".to_string(),
                dest_type: "UPS".to_string(),
                msg: format!("Zone {} is not a polar zone", value.zone),
            });
        }

        Ok(Self {
            hemisphere: value.hemisphere(),
            easting: value.easting,
            northing: value.northing,
        })
    }
}

impl Display for Ups {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&UtmUps::from(*self), f)
    }
}
