use log::debug;

use crate::{
    coords::{mgrs::{self, to_latitude_band}, point::GeodeticPoint2D},
    projections::{polar_stereographic::PolarStereographic, transverse_mercator::TransverseMercator},
    utility::{dms, GeoMath},
    Error, Hemisphere, ThisOrThat,
};

pub(crate) mod zonespec {
    pub(crate) const UTM: i32 = -2;
    pub(crate) const STANDARD: i32 = -1;
    pub(crate) const UPS: i32 = 0;
    pub(crate) const MINZONE: i32 = 0;
    pub(crate) const MINUTMZONE: i32 = 1;
    pub(crate) const MAXUTMZONE: i32 = 60;
    pub(crate) const MAXZONE: i32 = 60;
}

/// Southernmost latitude of the UTM band.
pub(crate) const MIN_UTM_LAT: f64 = -80.;
/// Northernmost latitude of the UTM band.
pub(crate) const MAX_UTM_LAT: f64 = 84.;
/// Latitude slack in degrees for grid values rounded to the millimeter.
const UTM_LAT_SLACK: f64 = 1e-7;

/// Largest longitude offset from the central meridian accepted when a
/// zone is forced.
const MAX_ZONE_OFFSET: f64 = 60.;

const FALSE_EASTING: [i32; 4] = [
    mgrs::UPSEASTING * mgrs::TILE,
    mgrs::UPSEASTING * mgrs::TILE,
    mgrs::UTMEASTING * mgrs::TILE,
    mgrs::UTMEASTING * mgrs::TILE,
];

const FALSE_NORTHING: [i32; 4] = [
    mgrs::UPSEASTING * mgrs::TILE,
    mgrs::UPSEASTING * mgrs::TILE,
    mgrs::MAXUTM_S_ROW * mgrs::TILE,
    mgrs::MINUTM_N_ROW * mgrs::TILE,
];

const MIN_EASTING: [i32; 4] = [
    mgrs::MINUPS_S_IND * mgrs::TILE,
    mgrs::MINUPS_N_IND * mgrs::TILE,
    mgrs::MINUTMCOL * mgrs::TILE,
    mgrs::MINUTMCOL * mgrs::TILE,
];

const MAX_EASTING: [i32; 4] = [
    mgrs::MAXUPS_S_IND * mgrs::TILE,
    mgrs::MAXUPS_N_IND * mgrs::TILE,
    mgrs::MAXUTMCOL * mgrs::TILE,
    mgrs::MAXUTMCOL * mgrs::TILE,
];

const MIN_NORTHING: [i32; 4] = [
    mgrs::MINUPS_S_IND * mgrs::TILE,
    mgrs::MINUPS_N_IND * mgrs::TILE,
    mgrs::MINUTM_S_ROW * mgrs::TILE,
    (mgrs::MINUTM_N_ROW + mgrs::MINUTM_S_ROW - mgrs::MAXUTM_S_ROW) * mgrs::TILE,
];

const MAX_NORTHING: [i32; 4] = [
    mgrs::MAXUPS_S_IND * mgrs::TILE,
    mgrs::MAXUPS_N_IND * mgrs::TILE,
    (mgrs::MAXUTM_S_ROW + mgrs::MAXUTM_N_ROW - mgrs::MINUTM_N_ROW) * mgrs::TILE,
    mgrs::MAXUTM_N_ROW * mgrs::TILE,
];

/// A WGS84
/// [UTM](https://en.wikipedia.org/wiki/Universal_Transverse_Mercator_coordinate_system)
/// or
/// [UPS](https://en.wikipedia.org/wiki/Universal_polar_stereographic_coordinate_system)
/// grid position. When converted from a geodetic point the standard zone is
/// chosen: UTM for latitudes in `[-80, 84)`, UPS otherwise. A zone value of
/// `0` designates UPS.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UtmUps {
    pub(crate) zone: i32,
    #[cfg_attr(feature = "serde", serde(alias = "north", alias = "is_north"))]
    pub(crate) northp: bool,
    pub(crate) easting: f64,
    pub(crate) northing: f64,
}

impl UtmUps {
    /// Internal-only constructor that doesn't check the coordinate
    pub(crate) fn new(zone: i32, northp: bool, easting: f64, northing: f64) -> UtmUps {
        Self {
            zone,
            northp,
            easting,
            northing,
        }
    }

    /// Tries to create a UTM or UPS point from its constituent parts. Zone
    /// of `0` designates UPS, otherwise it is UTM.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidZone`] if the zone is outside the range `[0, 60]`.
    /// Returns [`Error::InvalidUtm`] or [`Error::InvalidUps`] if the easting
    /// or northing is outside the grid.
    ///
    /// # Usage
    ///
    /// ```
    /// use geodesy::UtmUps;
    ///
    /// let coord = UtmUps::create(18, true, 585664.121, 4511315.422).unwrap();
    ///
    /// assert_eq!(coord.zone(), 18);
    /// assert!(coord.is_north());
    /// assert!((coord.easting() - 585664.121).abs() < 1e-3);
    /// assert!((coord.northing() - 4511315.422).abs() < 1e-3);
    ///
    /// assert!(UtmUps::create(-10, true, 585664.121, 4511315.422).is_err());
    /// assert!(UtmUps::create(70, true, 585664.121, 4511315.422).is_err());
    /// assert!(UtmUps::create(18, true, 5_000_000.0, 4511315.422).is_err());
    /// ```
    pub fn create(zone: i32, northp: bool, easting: f64, northing: f64) -> Result<UtmUps, Error> {
        if !(zonespec::MINZONE..=zonespec::MAXZONE).contains(&zone) {
            return Err(Error::InvalidZone(zone));
        }

        let utmp = zone != zonespec::UPS;

        check_coords(utmp, northp, easting, northing)?;
        let coord = UtmUps::new(zone, northp, easting, northing);
        if utmp {
            check_utm_band(&coord)?;
        }

        Ok(coord)
    }

    /// Returns the UTM zone, or `0` for UPS.
    pub fn zone(&self) -> i32 {
        self.zone
    }

    pub fn is_utm(&self) -> bool {
        self.zone != zonespec::UPS
    }

    pub fn is_north(&self) -> bool {
        self.northp
    }

    pub fn hemisphere(&self) -> Hemisphere {
        Hemisphere::from_north(self.northp)
    }

    pub fn easting(&self) -> f64 {
        self.easting
    }

    pub fn northing(&self) -> f64 {
        self.northing
    }

    /// Converts a geodetic point into its standard zone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUtm`] or [`Error::InvalidUps`] if the
    /// projected values fall outside the grid.
    ///
    /// # Usage
    ///
    /// ```
    /// use geodesy::{GeodeticPoint2D, UtmUps};
    ///
    /// let coord = GeodeticPoint2D::from_degrees(40.748333, -73.985278).unwrap();
    /// let converted = UtmUps::from_point(&coord).unwrap();
    ///
    /// assert_eq!(converted.zone(), 18);
    /// assert!(converted.is_north());
    /// assert!((converted.easting() - 585664.121).abs() < 1e-3);
    /// assert!((converted.northing() - 4511315.422).abs() < 1e-3);
    /// ```
    pub fn from_point(point: &GeodeticPoint2D) -> Result<UtmUps, Error> {
        Self::from_point_with_zone(point, zonespec::STANDARD)
    }

    /// Converts with a zone rule from [`zonespec`]: a zone number in
    /// `[0, 60]` forces that zone, [`zonespec::UTM`] forces the standard UTM
    /// zone even outside the UTM latitudes.
    pub(crate) fn from_point_with_zone(point: &GeodeticPoint2D, setzone: i32) -> Result<UtmUps, Error> {
        let lat = point.latitude().degrees();
        let lon = point.longitude().degrees();
        let zone = standard_zone(lat, lon, setzone);

        if !(zonespec::MINZONE..=zonespec::MAXZONE).contains(&zone) {
            return Err(Error::InvalidZone(zone));
        }

        let northp = point.is_north();
        let utmp = zone != zonespec::UPS;
        let (mut x, mut y) = if utmp {
            let lon0 = central_meridian(zone);
            let dlon = lon0.ang_diff(lon);
            if dlon.abs() > MAX_ZONE_OFFSET {
                return Err(Error::InvalidUtm(format!(
                    "Longitude {lon} more than {MAX_ZONE_OFFSET}° from the central meridian of zone {zone}"
                )));
            }

            TransverseMercator::utm().forward(lon0, point)
        } else {
            PolarStereographic::ups().forward(northp, point)
        };

        let ind = utmp.ternary(2, 0) + northp.ternary(1, 0);
        x += f64::from(FALSE_EASTING[ind]);
        y += f64::from(FALSE_NORTHING[ind]);

        check_coords(utmp, northp, x, y)?;

        debug!("({lat}, {lon}) projected into {} zone {zone}", utmp.ternary("UTM", "UPS"));

        Ok(UtmUps::new(zone, northp, x, y))
    }

    /// Converts back to a geodetic point.
    ///
    /// ```
    /// use geodesy::{GeodeticPoint2D, UtmUps};
    ///
    /// let coord = GeodeticPoint2D::from_degrees(40.748333, -73.985278).unwrap();
    /// let coord_utm = UtmUps::create(18, true, 585664.121, 4511315.422).unwrap();
    ///
    /// let converted = coord_utm.to_point();
    ///
    /// assert!(converted.proximally_equals(&coord, 1e-6));
    /// ```
    pub fn to_point(&self) -> GeodeticPoint2D {
        let utmp = self.zone != zonespec::UPS;

        let ind = utmp.ternary(2, 0) + self.northp.ternary(1, 0);

        let x = self.easting - f64::from(FALSE_EASTING[ind]);
        let y = self.northing - f64::from(FALSE_NORTHING[ind]);

        if utmp {
            TransverseMercator::utm().reverse(central_meridian(self.zone), x, y)
        } else {
            PolarStereographic::ups().reverse(self.northp, x, y)
        }
    }
}

pub(crate) fn central_meridian(zone: i32) -> f64 {
    6.0 * f64::from(zone) - 183.
}

// Map lat/lon to zone in either UTM or UPS based on position.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn standard_zone(lat: f64, lon: f64, setzone: i32) -> i32 {
    if setzone >= zonespec::MINZONE {
        return setzone;
    }

    if setzone == zonespec::UTM || ((-80_f64)..84.0).contains(&lat) {
        let mut lon_int = lon.ang_normalize().floor() as i32;
        if lon_int == dms::HD {
            lon_int = -dms::HD;
        }

        let mut zone = (lon_int + 186) / 6;
        let band = to_latitude_band(lat);
        // The Norway exception
        if band == 7 && zone == 31 && lon_int >= 3 {
            zone = 32;
        }
        // The Svalbard exception
        else if band == 9 && (0..42).contains(&lon_int) {
            zone = 2 * ((lon_int + 183) / 12) + 1;
        }

        zone
    } else {
        zonespec::UPS
    }
}

/// Range check with 100 km of slop around the nominal grid limits.
pub(crate) fn check_coords(utmp: bool, northp: bool, x: f64, y: f64) -> Result<(), Error> {
    let slop = f64::from(mgrs::TILE);
    let error = |msg: String| if utmp { Error::InvalidUtm(msg) } else { Error::InvalidUps(msg) };

    let ind = utmp.ternary(2, 0) + northp.ternary(1, 0);
    if !(x.is_finite() && y.is_finite()) {
        return Err(error(format!("Easting {x} or northing {y} is not finite")));
    }

    if x < f64::from(MIN_EASTING[ind]) - slop || x > f64::from(MAX_EASTING[ind]) + slop {
        return Err(error(
            format!(
                "Easting {:.2}km not in {} range for {} hemisphere [{:.2}km, {:.2}km]",
                x / 1000.0,
                utmp.ternary("UTM", "UPS"),
                northp.ternary("N", "S"),
                (f64::from(MIN_EASTING[ind]) - slop) / 1000.0,
                (f64::from(MAX_EASTING[ind]) + slop) / 1000.0,
            )
        ));
    }

    if y < f64::from(MIN_NORTHING[ind]) - slop || y > f64::from(MAX_NORTHING[ind]) + slop {
        return Err(error(
            format!(
                "Northing {:.2}km not in {} range for {} hemisphere [{:.2}km, {:.2}km]",
                y / 1000.0,
                utmp.ternary("UTM", "UPS"),
                northp.ternary("N", "S"),
                (f64::from(MIN_NORTHING[ind]) - slop) / 1000.0,
                (f64::from(MAX_NORTHING[ind]) + slop) / 1000.0,
            )
        ));
    }

    Ok(())
}

/// Rejects UTM values whose inverse falls outside the UTM latitudes.
pub(crate) fn check_utm_band(coord: &UtmUps) -> Result<(), Error> {
    let lat = coord.to_point().latitude().degrees();
    if lat < MIN_UTM_LAT - UTM_LAT_SLACK || lat > MAX_UTM_LAT + UTM_LAT_SLACK {
        return Err(Error::InvalidUtm(format!(
            "Zone {} northing {:.2}km inverts to latitude {lat}, outside [{MIN_UTM_LAT}, {MAX_UTM_LAT}]",
            coord.zone,
            coord.northing / 1000.0,
        )));
    }
    Ok(())
}

/// Meters rounded to the millimeter in shortest form.
pub(crate) fn format_meters(value: f64) -> String {
    let mut buf = ryu::Buffer::new();
    buf.format((value * 1000.).round() / 1000.).to_string()
}

impl std::fmt::Display for UtmUps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hemisphere = self.hemisphere().as_char();
        if self.is_utm() {
            write!(f, "{}{hemisphere}", self.zone)?;
        } else {
            write!(f, "{hemisphere}")?;
        }

        write!(f, " {} {}", format_meters(self.easting), format_meters(self.northing))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn zone_of(lat: f64, lon: f64) -> i32 {
        standard_zone(lat, lon, zonespec::STANDARD)
    }

    #[test]
    fn standard_zone_exceptions() {
        assert_eq!(zone_of(40., -74.), 18);
        // Norway
        assert_eq!(zone_of(60., 4.), 32);
        assert_eq!(zone_of(60., 2.), 31);
        assert_eq!(zone_of(50., 4.), 31);
        // Svalbard
        assert_eq!(zone_of(78., 8.), 31);
        assert_eq!(zone_of(78., 10.), 33);
        assert_eq!(zone_of(78., 22.), 35);
        assert_eq!(zone_of(78., 40.), 37);
        // Caps
        assert_eq!(zone_of(84., 0.), zonespec::UPS);
        assert_eq!(zone_of(-80.5, 0.), zonespec::UPS);
        assert_eq!(zone_of(-80., 0.), 31);
        // Antimeridian belongs to zone 1
        assert_eq!(zone_of(0., 180.), 1);
    }

    #[test]
    fn southern_hemisphere_false_northing() {
        let point = GeodeticPoint2D::from_degrees(-33.856_933, 151.215_108).unwrap();
        let coord = UtmUps::from_point(&point).unwrap();
        assert_eq!(coord.zone(), 56);
        assert!(!coord.is_north());
        assert!(coord.northing() > 6_000_000. && coord.northing() < 10_000_000.);
        assert!(coord.to_point().proximally_equals(&point, 1e-10));
    }

    #[test]
    fn forced_zone() {
        let point = GeodeticPoint2D::from_degrees(40.748_333, -73.985_278).unwrap();
        let standard = UtmUps::from_point(&point).unwrap();
        let forced = UtmUps::from_point_with_zone(&point, 19).unwrap();
        assert_eq!(forced.zone(), 19);
        assert!(forced.easting() < standard.easting());
        assert!(forced.to_point().proximally_equals(&point, 1e-10));

        // Too far from the central meridian of zone 60
        assert!(UtmUps::from_point_with_zone(&point, 60).is_err());
    }

    #[test]
    fn ups_caps() {
        let north = GeodeticPoint2D::from_degrees(89.9, 10.).unwrap();
        let coord = UtmUps::from_point(&north).unwrap();
        assert!(!coord.is_utm());
        assert!(coord.is_north());
        assert!(coord.to_point().proximally_equals(&north, 1e-10));

        let pole = GeodeticPoint2D::from_degrees(-90., 0.).unwrap();
        let coord = UtmUps::from_point(&pole).unwrap();
        assert_abs_diff_eq!(coord.easting(), 2_000_000., epsilon = 1e-6);
        assert_abs_diff_eq!(coord.northing(), 2_000_000., epsilon = 1e-6);
    }

    #[test]
    fn create_checks_ranges() {
        assert_eq!(UtmUps::create(61, true, 500_000., 0.), Err(Error::InvalidZone(61)));
        assert_eq!(Error::InvalidZone(61).to_string(), "Zone number 61 is not a UTM zone in [1, 60] or 0 for UPS");
        assert!(matches!(UtmUps::create(18, false, 500_000., -200_000.), Err(Error::InvalidUtm(_))));
        assert!(matches!(UtmUps::create(0, true, 500_000., 2_000_000.), Err(Error::InvalidUps(_))));
        assert!(UtmUps::create(0, false, 2_000_000., 2_000_000.).is_ok());
        assert!(UtmUps::create(18, true, f64::NAN, 0.).is_err());
    }

    #[test]
    fn create_rejects_values_beyond_the_utm_band() {
        assert!(matches!(UtmUps::create(18, true, 500_000., 9_590_000.), Err(Error::InvalidUtm(_))));
        assert!(matches!(UtmUps::create(18, false, 500_000., 950_000.), Err(Error::InvalidUtm(_))));
        assert!(UtmUps::create(18, true, 500_000., 9_300_000.).is_ok());
    }

    #[test]
    fn display() {
        let coord = UtmUps::create(18, true, 585_664.121_4, 4_511_315.421_8).unwrap();
        assert_eq!(coord.to_string(), "18N 585664.121 4511315.422");

        let coord = UtmUps::create(0, false, 2_000_000., 2_000_000.5).unwrap();
        assert_eq!(coord.to_string(), "S 2000000.0 2000000.5");
    }
}
