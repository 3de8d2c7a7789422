use std::fmt::Display;

use crate::{
    coords::{
        point::GeodeticPoint2D,
        utm_ups::{check_coords, check_utm_band, zonespec, UtmUps, MAX_UTM_LAT, MIN_UTM_LAT},
    },
    Error, Hemisphere,
};

/// A Universal Transverse Mercator coordinate on WGS84.
///
/// ```
/// use geodesy::{GeodeticPoint2D, Utm};
///
/// let point = GeodeticPoint2D::from_degrees(40.748333, -73.985278).unwrap();
/// let utm = Utm::from_point(&point).unwrap();
///
/// assert_eq!(utm.to_string(), "18N 585664.121 4511315.422");
/// assert!(utm.to_point().proximally_equals(&point, 1e-9));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Utm {
    zone: i32,
    hemisphere: Hemisphere,
    easting: f64,
    northing: f64,
}

impl Utm {
    /// # Errors
    ///
    /// * [`Error::InvalidZone`] if the zone is not in `[1, 60]`
    /// * [`Error::InvalidHemisphere`] unless the hemisphere is `N` or `S`
    /// * [`Error::InvalidUtm`] if easting or northing is off the grid, or
    ///   the coordinate inverts to a latitude outside `[-80, 84]`
    ///
    /// ```
    /// use geodesy::Utm;
    ///
    /// assert!(Utm::create(18, 'n', 585664.121, 4511315.422).is_ok());
    /// assert!(Utm::create(0, 'N', 585664.121, 4511315.422).is_err());
    /// assert!(Utm::create(18, 'Q', 585664.121, 4511315.422).is_err());
    /// assert!(Utm::create(18, 'S', 585664.121, 11_000_000.0).is_err());
    /// ```
    pub fn create(zone: i32, hemisphere: char, easting: f64, northing: f64) -> Result<Utm, Error> {
        if !(zonespec::MINUTMZONE..=zonespec::MAXUTMZONE).contains(&zone) {
            return Err(Error::InvalidZone(zone));
        }
        let hemisphere = Hemisphere::from_char(hemisphere)?;

        check_coords(true, hemisphere.is_north(), easting, northing)?;

        let utm = Self {
            zone,
            hemisphere,
            easting,
            northing,
        };
        check_utm_band(&UtmUps::from(utm))?;

        Ok(utm)
    }

    /// Projects into the standard UTM zone of `point`, including the Norway
    /// and Svalbard exceptions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] if the latitude is outside `[-80, 84]`.
    pub fn from_point(point: &GeodeticPoint2D) -> Result<Utm, Error> {
        check_latitude(point)?;
        Self::try_from(UtmUps::from_point_with_zone(point, zonespec::UTM)?)
    }

    /// Projects into `zone` even when it is not the standard zone of
    /// `point`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] for latitudes outside `[-80, 84]`,
    /// [`Error::InvalidZone`] if the zone is not in `[1, 60]`, and
    /// [`Error::InvalidUtm`] if the result falls off the grid.
    ///
    /// ```
    /// use geodesy::{GeodeticPoint2D, Utm};
    ///
    /// let point = GeodeticPoint2D::from_degrees(40.748333, -73.985278).unwrap();
    /// let utm = Utm::from_point_in_zone(&point, 19).unwrap();
    /// assert_eq!(utm.zone(), 19);
    /// assert!(utm.to_point().proximally_equals(&point, 1e-9));
    /// ```
    pub fn from_point_in_zone(point: &GeodeticPoint2D, zone: i32) -> Result<Utm, Error> {
        check_latitude(point)?;
        if !(zonespec::MINUTMZONE..=zonespec::MAXUTMZONE).contains(&zone) {
            return Err(Error::InvalidZone(zone));
        }
        Self::try_from(UtmUps::from_point_with_zone(point, zone)?)
    }

    pub fn to_point(&self) -> GeodeticPoint2D {
        UtmUps::from(*self).to_point()
    }

    pub fn zone(&self) -> i32 {
        self.zone
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

fn check_latitude(point: &GeodeticPoint2D) -> Result<(), Error> {
    let lat = point.latitude().degrees();
    if (MIN_UTM_LAT..=MAX_UTM_LAT).contains(&lat) {
        Ok(())
    } else {
        Err(Error::InvalidRange {
            coord_type: "Geodetic".to_string(),
            dest_type: "UTM".to_string(),
            msg: format!("Latitude {lat} outside of UTM range [{MIN_UTM_LAT}, {MAX_UTM_LAT}]"),
        })
    }
}

impl From<Utm> for UtmUps {
    fn from(value: Utm) -> Self {
        UtmUps::new(value.zone, value.hemisphere.is_north(), value.easting, value.northing)
    }
}

impl TryFrom<UtmUps> for Utm {
    type Error = Error;

    fn try_from(value: UtmUps) -> Result<Self, Self::Error> {
        if value.is_utm() {
            Ok(Self {
                zone: value.zone,
                hemisphere: value.hemisphere(),
                easting: value.easting,
                northing: value.northing,
            })
        } else {
            Err(Error::InvalidRange {
                coord_type: "UPS".to_string(),
                dest_type: "UTM".to_string(),
                msg: "Polar coordinates have no UTM zone".to_string(),
            })
        }
    }
}

impl Display for Utm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&UtmUps::from(*self), f)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn washington_monument() {
        let point = GeodeticPoint2D::from_degrees(38.889_097, -77.035).unwrap();
        let utm = Utm::from_point(&point).unwrap();
        assert_eq!(utm.zone(), 18);
        assert_eq!(utm.hemisphere(), Hemisphere::North);
        assert_abs_diff_eq!(utm.easting(), 323_503.087, epsilon = 1e-3);
        assert_abs_diff_eq!(utm.northing(), 4_306_437.935, epsilon = 1e-3);
    }

    #[test]
    fn band_limits() {
        let top = GeodeticPoint2D::from_degrees(84., 20.).unwrap();
        let utm = Utm::from_point(&top).unwrap();
        assert_eq!(utm.zone(), 33);
        assert!(utm.to_point().proximally_equals(&top, 1e-9));

        let bottom = GeodeticPoint2D::from_degrees(-80., 20.).unwrap();
        assert!(Utm::from_point(&bottom).is_ok());

        let too_far = GeodeticPoint2D::from_degrees(84.1, 20.).unwrap();
        assert!(matches!(Utm::from_point(&too_far), Err(Error::InvalidRange { .. })));
        let too_far = GeodeticPoint2D::from_degrees(-80.1, 20.).unwrap();
        assert!(matches!(Utm::from_point(&too_far), Err(Error::InvalidRange { .. })));
    }

    #[test]
    fn forced_zone_must_exist() {
        let point = GeodeticPoint2D::from_degrees(10., 10.).unwrap();
        assert_eq!(Utm::from_point_in_zone(&point, 0), Err(Error::InvalidZone(0)));
        assert_eq!(Utm::from_point_in_zone(&point, 61), Err(Error::InvalidZone(61)));
        assert_eq!(Utm::from_point_in_zone(&point, 33).unwrap().zone(), 33);
    }

    #[test]
    fn ups_cannot_become_utm() {
        let cap = GeodeticPoint2D::from_degrees(87., 0.).unwrap();
        let grid = UtmUps::from_point(&cap).unwrap();
        assert!(Utm::try_from(grid).is_err());
    }

    #[test]
    fn create_then_invert() {
        let utm = Utm::create(56, 'S', 334_883., 6_252_273.).unwrap();
        let point = utm.to_point();
        assert_abs_diff_eq!(point.latitude().degrees(), -33.856_9, epsilon = 1e-3);
        assert_abs_diff_eq!(point.longitude().degrees(), 151.215_1, epsilon = 1e-3);
        assert_eq!(utm.to_string(), "56S 334883.0 6252273.0");
    }

    #[test]
    fn create_stays_inside_the_band() {
        assert!(matches!(Utm::create(18, 'N', 500_000., 9_590_000.), Err(Error::InvalidUtm(_))));
        assert!(matches!(Utm::create(18, 'S', 500_000., 900_000.), Err(Error::InvalidUtm(_))));

        let top = GeodeticPoint2D::from_degrees(84., 20.).unwrap();
        let edge = Utm::from_point(&top).unwrap();
        let again = Utm::create(edge.zone(), 'N', edge.easting(), edge.northing()).unwrap();
        assert!(again.to_point().proximally_equals(&top, 1e-7));

        let bottom = GeodeticPoint2D::from_degrees(-80., 20.).unwrap();
        let edge = Utm::from_point(&bottom).unwrap();
        assert!(Utm::create(edge.zone(), 'S', edge.easting(), edge.northing()).is_ok());
    }
}
