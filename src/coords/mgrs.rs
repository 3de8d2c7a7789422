use std::{fmt::{Display, Write}, str::FromStr};

use lazy_static::lazy_static;
use log::warn;
use num::Integer;

use crate::{
    coords::{
        point::GeodeticPoint2D,
        utm_ups::{zonespec::{MINUTMZONE, MAXUTMZONE, UPS}, UtmUps},
    },
    utility::{dms, GeoMath},
    Error, ParseCoord, ThisOrThat,
};

const HEMISPHERES: &str = "SN";
const UTMCOLS: &[&str] = &["ABCDEFGH", "JKLMNPQR", "STUVWXYZ"];
const UTMROW: &str = "ABCDEFGHJKLMNPQRSTUV";
const UPSCOLS: &[&str] = &["JKLPQRSTUXYZ", "ABCFGHJKLPQR", "RSTUXYZ", "ABCFGHJ"];
const UPSROWS: &[&str] = &["ABCDEFGHJKLMNPQRSTUVWXYZ", "ABCDEFGHJKLMNP"];
const LATBAND: &str = "CDEFGHJKLMNPQRSTUVWX";
const UPSBAND: &str = "ABYZ";
const DIGITS: &str = "0123456789";

pub const TILE: i32 = 100_000;
pub const MINUTMCOL: i32 = 1;
pub const MAXUTMCOL: i32 = 9;
pub const MINUTM_S_ROW: i32 = 10;
pub const MAXUTM_S_ROW: i32 = 100;
pub const MINUTM_N_ROW: i32 = 0;
pub const MAXUTM_N_ROW: i32 = 95;
pub const MINUPS_S_IND: i32 = 8;
pub const MAXUPS_S_IND: i32 = 32;
pub const MINUPS_N_IND: i32 = 13;
pub const MAXUPS_N_IND: i32 = 27;
pub const UPSEASTING: i32 = 20;
pub const UTMEASTING: i32 = 5;
pub const UTM_N_SHIFT: i32 = (MAXUTM_S_ROW - MINUTM_N_ROW) * TILE;

const MIN_EASTING: [i32; 4] = [
    MINUPS_S_IND,
    MINUPS_N_IND,
    MINUTMCOL,
    MINUTMCOL,
];

const MAX_EASTING: [i32; 4] = [
    MAXUPS_S_IND,
    MAXUPS_N_IND,
    MAXUTMCOL,
    MAXUTMCOL,
];

const MIN_NORTHING: [i32; 4] = [
    MINUPS_S_IND,
    MINUPS_N_IND,
    MINUTM_S_ROW,
    MINUTM_S_ROW - MAXUTM_S_ROW - MINUTM_N_ROW,
];

const MAX_NORTHING: [i32; 4] = [
    MAXUPS_S_IND,
    MAXUPS_N_IND,
    MAXUTM_N_ROW + MAXUTM_S_ROW - MINUTM_N_ROW,
    MAXUTM_N_ROW,
];

pub const BASE: i32 = 10;
pub const UTM_ROW_PERIOD: i32 = 20;
pub const UTM_EVEN_ROW_SHIFT: i32 = 5;
/// Most digits per axis in an MGRS reference (1 m).
pub const MAX_PRECISION: usize = 5;
/// Digits per axis carried internally when truncating grid values.
const INTERNAL_PRECISION: u32 = 5 + 6;
const MULT: i32 = 1_000_000;
const MANTISSA_BITS: i32 = 53;

lazy_static! {
    // Smallest angle s.t. 90 - ANGLE_EPS < 90
    static ref ANGLE_EPS: f64 = 2_f64.powi(7 - MANTISSA_BITS);
    // Nudge applied to grid values sitting on an excluded upper limit
    static ref GRID_EPS: f64 = 2_f64.powi(25 - MANTISSA_BITS);
}

/// A Military Grid Reference System square.
///
/// Stores the underlying grid position, the latitude used to pick the band
/// letter and the number of digits per axis. Grid-zone-only references
/// (`"18S"`) have no precision.
///
/// ```
/// use geodesy::{GeodeticPoint2D, Mgrs};
///
/// let mgrs: Mgrs = "18suj2348306479".parse().unwrap();
/// assert_eq!(mgrs.precision(), Some(5));
/// assert_eq!(mgrs.to_string(), "18SUJ 23483 06479");
/// assert_eq!(mgrs.format(2).unwrap(), "18SUJ 23 06");
///
/// let point = mgrs.to_point();
/// assert!((point.latitude().degrees() - 38.889464).abs() < 1e-4);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "String", try_from = "String"))]
pub struct Mgrs {
    utm: UtmUps,
    latitude: f64,
    precision: Option<usize>,
}

impl Mgrs {
    pub fn is_utm(&self) -> bool {
        self.utm.zone != UPS
    }

    /// UTM zone, or `0` for the polar letters.
    pub fn zone(&self) -> i32 {
        self.utm.zone
    }

    pub fn is_north(&self) -> bool {
        self.utm.northp
    }

    pub fn easting(&self) -> f64 {
        self.utm.easting
    }

    pub fn northing(&self) -> f64 {
        self.utm.northing
    }

    /// Digits per axis, `None` for a grid zone designation on its own.
    pub fn precision(&self) -> Option<usize> {
        self.precision
    }

    /// Parses an MGRS reference. Whitespace is ignored and letters may be
    /// lowercase. References shorter than 5 digits per axis resolve to the
    /// center of their square.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMgrs`] for letters outside their sets, zones
    /// outside `[1, 60]`, an odd digit count, more than 5 digits per axis or
    /// a square that does not intersect its latitude band.
    pub fn parse_str(mgrs_str: &str) -> Result<Mgrs, Error> {
        Self::from_str(mgrs_str)
    }

    /// Encodes `point` in its standard zone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMgrs`] if `precision` exceeds 5, or the
    /// projection error if the point cannot be gridded.
    ///
    /// ```
    /// use geodesy::{GeodeticPoint2D, Mgrs};
    ///
    /// let point = GeodeticPoint2D::from_degrees(-89.5, -45.0).unwrap();
    /// assert_eq!(Mgrs::from_point(&point, 5).unwrap().to_string(), "AZN 60746 39253");
    /// assert_eq!(Mgrs::from_point(&point, 0).unwrap().to_string(), "AZN");
    /// assert!(Mgrs::from_point(&point, 6).is_err());
    /// ```
    pub fn from_point(value: &GeodeticPoint2D, precision: usize) -> Result<Mgrs, Error> {
        let mgrs = Mgrs {
            utm: UtmUps::from_point(value)?,
            latitude: value.latitude().degrees(),
            precision: Some(check_precision(precision)?),
        };
        mgrs.encode(mgrs.precision)?;

        Ok(mgrs)
    }

    /// Wraps a grid position, estimating the latitude band from the
    /// northing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMgrs`] if `precision` exceeds 5 or the
    /// position is outside the MGRS grid.
    pub fn from_utm_ups(value: &UtmUps, precision: usize) -> Result<Mgrs, Error> {
        let mgrs = Mgrs {
            utm: *value,
            latitude: estimate_latitude(value),
            precision: Some(check_precision(precision)?),
        };
        mgrs.encode(mgrs.precision)?;

        Ok(mgrs)
    }

    pub fn to_point(&self) -> GeodeticPoint2D {
        self.utm.to_point()
    }

    pub fn to_utm_ups(&self) -> UtmUps {
        self.utm
    }

    /// Renders the reference with `precision` digits per axis, truncating
    /// toward the south-west corner.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMgrs`] if `precision` exceeds 5.
    pub fn format(&self, precision: usize) -> Result<String, Error> {
        self.encode(Some(check_precision(precision)?))
    }

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn encode(&self, precision: Option<usize>) -> Result<String, Error> {
        let utmp = self.is_utm();
        let (northp, easting, northing) = check_coords(utmp, self.utm.northp, self.utm.easting, self.utm.northing)?;

        let mut mgrs_str = String::with_capacity(2 + 3 + 2 * (MAX_PRECISION + 1));
        let zone = self.utm.zone - 1;

        if utmp {
            write!(mgrs_str, "{}", self.utm.zone).map_err(format_error)?;
        }

        let ix = (easting * f64::from(MULT)).floor() as i64;
        let iy = (northing * f64::from(MULT)).floor() as i64;
        let m = i64::from(MULT) * i64::from(TILE);

        let xh = (ix / m) as i32;
        let yh = (iy / m) as i32;

        if utmp {
            // Correct fuzziness in latitude near equator
            let band_idx = (self.latitude.abs() < *ANGLE_EPS)
                .ternary(northp.ternary(0, -1), to_latitude_band(self.latitude));
            mgrs_str.push(letter(LATBAND, 10 + band_idx));
            if precision.is_none() {
                return Ok(mgrs_str);
            }

            let col_idx = xh - MINUTMCOL;
            let row_idx = utm_row(band_idx, col_idx, yh % UTM_ROW_PERIOD);

            if row_idx != yh - northp.ternary(MINUTM_N_ROW, MAXUTM_S_ROW) {
                return Err(Error::InvalidMgrs(format!(
                    "Latitude {} is inconsistent with UTM coordinates {}",
                    self.latitude, self.utm
                )));
            }

            mgrs_str.push(letter(UTMCOLS[(zone % 3) as usize], col_idx));
            mgrs_str.push(letter(UTMROW, (yh + zone.is_odd().ternary(UTM_EVEN_ROW_SHIFT, 0)) % UTM_ROW_PERIOD));
        } else {
            let eastp = xh >= UPSEASTING;
            let band_idx: usize = northp.ternary(2, 0) + eastp.ternary(1, 0);
            mgrs_str.push(UPSBAND.as_bytes()[band_idx] as char);
            if precision.is_none() {
                return Ok(mgrs_str);
            }

            let idx = xh - eastp.ternary(UPSEASTING, northp.ternary(MINUPS_N_IND, MINUPS_S_IND));
            mgrs_str.push(letter(UPSCOLS[band_idx], idx));
            let idx = yh - northp.ternary(MINUPS_N_IND, MINUPS_S_IND);
            mgrs_str.push(letter(UPSROWS[usize::from(northp)], idx));
        }

        let precision = precision.unwrap_or_default();
        if precision > 0 {
            let d = i64::from(BASE).pow(INTERNAL_PRECISION - precision as u32);
            let ix = (ix - m * i64::from(xh)) / d;
            let iy = (iy - m * i64::from(yh)) / d;

            write!(mgrs_str, " {ix:0precision$} {iy:0precision$}").map_err(format_error)?;
        }

        Ok(mgrs_str)
    }
}

fn format_error(err: std::fmt::Error) -> Error {
    Error::InvalidMgrs(format!("Could not format the MGRS string: {err}"))
}

#[allow(clippy::cast_sign_loss)]
fn letter(set: &str, idx: i32) -> char {
    set.as_bytes()[idx as usize] as char
}

fn check_precision(precision: usize) -> Result<usize, Error> {
    if precision > MAX_PRECISION {
        Err(Error::InvalidMgrs(format!("Precision {precision} not in [0, {MAX_PRECISION}]")))
    } else {
        Ok(precision)
    }
}

/// Latitude good enough to pick the band letter of a UTM position.
fn estimate_latitude(utm: &UtmUps) -> f64 {
    if utm.zone == UPS {
        // Latitude isn't needed for UPS
        return 0.;
    }

    let y_est = utm.northp.ternary_lazy(|| utm.northing, || utm.northing - f64::from(UTM_N_SHIFT));
    // A cheap calculation of the latitude which results in an "allowed"
    // latitude band would be
    //   lat = ApproxLatitudeBand(ys) * 8 + 4;
    //
    // Here we do a more careful job using the band letter corresponding to
    // the actual latitude.
    let y_est = y_est / f64::from(TILE);
    if y_est.abs() < 1.0 {
        0.9 * y_est
    }
    else {
        let pole_add = (y_est > 0.0).ternary(1.0, -1.0);
        // Fit from above of lat(x, y) for x = 500km
        let lat_poleward = 0.901 * y_est + pole_add * 0.135;
        // Fit from below of lat(x, y) for x = 900km
        let lat_eastward = 0.902 * y_est * (1.0 - 1.85e-6 * y_est.powi(2));

        if to_latitude_band(lat_poleward) == to_latitude_band(lat_eastward) {
            lat_poleward
        } else {
            utm.to_point().latitude().degrees()
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn utm_row(band_idx: i32, col_idx: i32, row_idx: i32) -> i32 {
    let c = 100.0 * (8.0 * f64::from(band_idx) + 4.0) / f64::from(dms::QD);
    let northp = band_idx >= 0;
    // These are safe bounds on the rows
    //  band_idx  minrow maxrow
    //   -10      -90    -81
    //    -9      -80    -72
    //    -8      -71    -63
    //    -7      -63    -54
    //    -6      -54    -45
    //    -5      -45    -36
    //    -4      -36    -27
    //    -3      -27    -18
    //    -2      -18     -9
    //    -1       -9     -1
    //     0        0      8
    //     1        8     17
    //     2       17     26
    //     3       26     35
    //     4       35     44
    //     5       44     53
    //     6       53     62
    //     7       62     70
    //     8       71     79
    //     9       80     94

    let min_row = if band_idx > -10 {
        (c - 4.3 - 0.1 * f64::from(u8::from(northp))).floor() as i32
    } else {
        -90
    };

    let max_row = if band_idx < 9 {
        (c + 4.4 - 0.1 * f64::from(u8::from(northp))).floor() as i32
    } else {
        94
    };

    let base_row = (min_row + max_row) / 2 - UTM_ROW_PERIOD / 2;
    // Offset row_idx by the multiple of UTM_ROW_PERIOD which brings it as close as
    // possible to the center of the latitude band, (min_row + max_row) / 2.
    // (Add MAXUTM_S_ROW = 5 * UTM_ROW_PERIOD to ensure operand is positive.)
    let mut row_idx = (row_idx - base_row + MAXUTM_S_ROW) % UTM_ROW_PERIOD + base_row;

    if !(row_idx >= min_row && row_idx <= max_row) {
        // Outside the safe bounds, so need to check...
        // Northing = 71e5 and 80e5 intersect band boundaries
        //   y = 71e5 in scol = 2 (x = [3e5,4e5] and x = [6e5,7e5])
        //   y = 80e5 in scol = 1 (x = [2e5,3e5] and x = [7e5,8e5])
        // This holds for all the ellipsoids given in NGA.SIG.0012_2.0.0_UTMUPS.
        // The following deals with these special cases.

        // Fold [-10,-1] -> [9,0]
        let safe_band = (band_idx >= 0).ternary(band_idx, -band_idx - 1);
        // Fold [-90,-1] -> [89,0]
        let safe_row = (row_idx >= 0).ternary(row_idx, -row_idx - 1);
        // Fold [4,7] -> [3,0]
        let safe_col = (col_idx < 4).ternary(col_idx, -col_idx + 7);

        if !(
            (safe_row == 70 && safe_band == 8 && safe_col >= 2) ||
            (safe_row == 71 && safe_band == 7 && safe_col <= 2) ||
            (safe_row == 79 && safe_band == 9 && safe_col >= 1) ||
            (safe_row == 80 && safe_band == 8 && safe_col <= 1)
        ) {
            row_idx = MAXUTM_S_ROW;
        }
    }

    row_idx
}

fn find(set: &str, c: u8) -> Option<i32> {
    set.find(char::from(c)).and_then(|i| i32::try_from(i).ok())
}

impl FromStr for Mgrs {
    type Err = Error;

    #[allow(clippy::too_many_lines, clippy::cast_sign_loss)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();

        if !value.is_ascii() {
            return Err(Error::InvalidMgrs(format!("Non-ASCII character in {s}")));
        }

        let mut p = 0;
        let len = value.len();
        let chars = value.as_bytes();

        if len >= 3 && value.starts_with("INV") {
            return Err(Error::InvalidMgrs("Starts with 'INV'".to_string()))
        }

        let mut zone = 0i32;
        while p < len {
            if let Some(i) = find(DIGITS, chars[p]) {
                zone = zone.saturating_mul(10).saturating_add(i);
                p += 1;
            }
            else {
                break;
            }
        }
        // Check if zone is within valid range
        if p > 0 && !(MINUTMZONE..=MAXUTMZONE).contains(&zone) {
            return Err(Error::InvalidMgrs(format!("Zone {zone} not in [1,60]")));
        }

        if p > 2 {
            return Err(Error::InvalidMgrs(format!("More than 2 digits at start of MGRS {}", &value[..p])));
        }

        if len - p < 1 {
            return Err(Error::InvalidMgrs(format!("Too short: {value}")));
        }

        let utmp = zone != UPS;
        let zonem = zone - 1;
        let band = utmp.ternary(LATBAND, UPSBAND);

        let mut band_idx = find(band, chars[p]).ok_or_else(|| {
            let label = utmp.ternary("UTM", "UPS");
            Error::InvalidMgrs(format!("Band letter {} not in {label} set {band}", char::from(chars[p])))
        })?;

        p += 1;

        let northp = band_idx >= utmp.ternary(10, 2);
        let latitude = utmp.ternary(f64::from(8 * (band_idx - 10) + 4), 0.);

        if p == len { // Grid zone only
            // Approx length of a degree of meridian arc in units of tile
            let deg = f64::from(UTM_N_SHIFT) / f64::from(dms::QD * TILE);
            let (x, y) = if utmp {
                // Pick central meridian except for 31V
                let x = f64::from(TILE) * (zone == 31 && band_idx == 17).ternary(4.0, 5.0);
                let y_add = northp.ternary(0.0, f64::from(UTM_N_SHIFT));
                let y = (8.0 * (f64::from(band_idx) - 9.5) * deg + 0.5).floor() * f64::from(TILE) + y_add;

                (x, y)
            } else {
                let x_cond = band_idx.is_odd().ternary(1.0, -1.0);
                let x = (x_cond * (4.0 * deg + 0.5).floor() + f64::from(UPSEASTING)) * f64::from(TILE);
                let y = f64::from(UPSEASTING * TILE);
                (x, y)
            };

            return Ok(Mgrs {
                utm: UtmUps::new(zone, northp, x, y),
                latitude,
                precision: None,
            })
        } else if len - p < 2 {
            return Err(Error::InvalidMgrs(format!("Missing row letter in {value}")));
        }

        let col = utmp.ternary_lazy(|| UTMCOLS[(zonem % 3) as usize], || UPSCOLS[band_idx as usize]);
        let row = utmp.ternary_lazy(|| UTMROW, || UPSROWS[usize::from(northp)]);
        let mut col_idx = find(col, chars[p]).ok_or_else(|| {
            let label = if utmp { format!("zone {}", &value[..p-1]) } else { format!("UPS band {}", &value[p-1..p]) };
            Error::InvalidMgrs(format!("Column letter {} not in {label} set {col}", &value[p..=p]))
        })?;

        p += 1;

        let mut row_idx = find(row, chars[p]).ok_or_else(|| {
            let northp = usize::from(northp);
            let label = if utmp { "UTM".to_string() } else { format!("UPS {}", &HEMISPHERES[northp..=northp]) };
            Error::InvalidMgrs(format!("Row letter {} not in {label} set {row}", &value[p..=p]))
        })?;

        p += 1;

        if utmp {
            if zonem.is_odd() {
                row_idx = (row_idx + UTM_ROW_PERIOD - UTM_EVEN_ROW_SHIFT) % UTM_ROW_PERIOD;
            }

            band_idx -= 10;

            row_idx = utm_row(band_idx, col_idx, row_idx);
            if row_idx == MAXUTM_S_ROW {
                return Err(Error::InvalidMgrs(format!("Block {} not in zone/band {}", &value[p-2..p], &value[0..p-2])))
            }

            row_idx = northp.ternary_lazy(|| row_idx, || row_idx + 100);
            col_idx += MINUTMCOL;
        }
        else {
            let eastp = band_idx.is_odd();
            col_idx += if eastp { UPSEASTING } else if northp { MINUPS_N_IND } else { MINUPS_S_IND };
            row_idx += if northp { MINUPS_N_IND } else { MINUPS_S_IND };
        }

        let digits = &value[p..];
        if let Some(c) = digits.chars().find(|c| !c.is_ascii_digit()) {
            return Err(Error::InvalidMgrs(format!("Encountered a non-digit {c} in {digits}")));
        }

        if digits.len() % 2 == 1 {
            return Err(Error::InvalidMgrs(format!("Not an even number of digits in {digits}")));
        }

        let precision = digits.len() / 2;
        if precision > MAX_PRECISION {
            return Err(Error::InvalidMgrs(format!("More than {} digits in {digits}", 2 * MAX_PRECISION)));
        }

        let mut unit = 1;
        let mut x = col_idx;
        let mut y = row_idx;

        for i in 0..precision {
            unit *= BASE;
            let x_idx = i32::from(chars[p + i] - b'0');
            let y_idx = i32::from(chars[p + i + precision] - b'0');

            x = BASE * x + x_idx;
            y = BASE * y + y_idx;
        }

        // Resolve to the center of the square
        unit *= 2;
        x = 2 * x + 1;
        y = 2 * y + 1;

        let x = (f64::from(TILE) * f64::from(x)) / f64::from(unit);
        let y = (f64::from(TILE) * f64::from(y)) / f64::from(unit);

        Ok(Self {
            utm: UtmUps::new(
                zone,
                northp,
                x,
                y,
            ),
            latitude,
            precision: Some(precision),
        })
    }
}

impl ParseCoord for Mgrs {
    fn parse_coord(value: &str) -> Result<Self, Error> {
        value.parse()
    }
}

#[allow(clippy::cast_possible_truncation)]
pub(crate) fn to_latitude_band(lat: f64) -> i32 {
    let lat_int = lat.floor() as i32;
    (-10).max(9.min((lat_int + 80) / 8 - 10))
}

/// Range check against the MGRS grid limits. Values sitting on an excluded
/// upper limit are nudged down, and UTM northings are folded into the
/// correct hemisphere.
#[allow(clippy::cast_possible_truncation)]
fn check_coords(utmp: bool, northp: bool, x: f64, y: f64) -> Result<(bool, f64, f64), Error> {
    let x_int = (x / f64::from(TILE)).floor() as i32;
    let y_int = (y / f64::from(TILE)).floor() as i32;
    let ind = utmp.ternary(2, 0) + northp.ternary(1, 0);

    let mut x_new = x;
    let mut y_new = y;

    if !(MIN_EASTING[ind]..MAX_EASTING[ind]).contains(&x_int) {
        if x_int == MAX_EASTING[ind] && x.eps_eq(f64::from(MAX_EASTING[ind] * TILE)) {
            warn!("Easting {x} on the upper MGRS limit, nudged into the grid");
            x_new -= *GRID_EPS;
        } else {
            return Err(Error::InvalidMgrs(
                format!(
                    "Easting {:.2}km not in MGRS/{} range for {} hemisphere [{:.2}km, {:.2}km)",
                    x / 1000.0,
                    utmp.ternary("UTM", "UPS"),
                    northp.ternary("N", "S"),
                    MIN_EASTING[ind] * (TILE / 1000),
                    MAX_EASTING[ind] * (TILE / 1000),
                )
            ));
        }
    }

    if !(MIN_NORTHING[ind]..MAX_NORTHING[ind]).contains(&y_int) {
        if y_int == MAX_NORTHING[ind] && y.eps_eq(f64::from(MAX_NORTHING[ind] * TILE)) {
            warn!("Northing {y} on the upper MGRS limit, nudged into the grid");
            y_new -= *GRID_EPS;
        } else {
            return Err(Error::InvalidMgrs(
                format!(
                    "Northing {:.2}km not in MGRS/{} range for {} hemisphere [{:.2}km, {:.2}km)",
                    y / 1000.0,
                    utmp.ternary("UTM", "UPS"),
                    northp.ternary("N", "S"),
                    MIN_NORTHING[ind] * (TILE / 1000),
                    MAX_NORTHING[ind] * (TILE / 1000),
                )
            ));
        }
    }

    let (northp_new, y_new) = if utmp {
        if northp && y_int < MINUTM_N_ROW {
            (false, y_new + f64::from(UTM_N_SHIFT))
        } else if !northp && y_int >= MAXUTM_S_ROW {
            if y.eps_eq(f64::from(MAXUTM_S_ROW * TILE)) {
                // On the equator, keep the southern hemisphere
                (northp, y_new - *GRID_EPS)
            } else {
                (true, y_new - f64::from(UTM_N_SHIFT))
            }
        } else {
            (northp, y_new)
        }
    } else {
        (northp, y_new)
    };

    Ok((northp_new, x_new, y_new))
}

impl Display for Mgrs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mgrs_str = self.encode(self.precision).map_err(|_| std::fmt::Error)?;
        write!(f, "{mgrs_str}")
    }
}

impl From<Mgrs> for String {
    fn from(value: Mgrs) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Mgrs {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn latitude_bands() {
        assert_eq!(to_latitude_band(-80.), -10);
        assert_eq!(to_latitude_band(-0.5), -1);
        assert_eq!(to_latitude_band(0.), 0);
        assert_eq!(to_latitude_band(38.9), 4);
        assert_eq!(to_latitude_band(72.), 9);
        assert_eq!(to_latitude_band(83.9), 9);
        assert_eq!(to_latitude_band(-90.), -10);
    }

    #[test]
    fn row_bounds_table() {
        // Every band resolves a row letter to its own central row
        for band in -10..=9 {
            let center = 100 * (8 * band + 4) / 90;
            let row = (center + 200) % UTM_ROW_PERIOD;
            assert_eq!(utm_row(band, 4, row), center, "band {band}");
        }
    }

    #[test]
    fn precision_renderings() {
        let point = GeodeticPoint2D::from_degrees(38.889_097, -77.035).unwrap();
        let mgrs = Mgrs::from_point(&point, 5).unwrap();
        assert_eq!(mgrs.format(0).unwrap(), "18SUJ");
        assert_eq!(mgrs.format(1).unwrap(), "18SUJ 2 0");
        assert_eq!(mgrs.format(5).unwrap(), "18SUJ 23503 06437");
        assert!(mgrs.format(6).is_err());
    }

    #[test]
    fn equator_and_norway() {
        let origin = GeodeticPoint2D::from_degrees(0., 0.).unwrap();
        assert_eq!(Mgrs::from_point(&origin, 5).unwrap().to_string(), "31NAA 66021 00000");

        let norway = GeodeticPoint2D::from_degrees(64., 0.).unwrap();
        assert_eq!(Mgrs::from_point(&norway, 5).unwrap().to_string(), "31WCM 53304 00467");
    }

    #[test]
    fn polar_letters() {
        let north = GeodeticPoint2D::from_degrees(89.9, 10.).unwrap();
        assert_eq!(Mgrs::from_point(&north, 5).unwrap().to_string(), "ZAG 01927 89066");

        let cap_edge = GeodeticPoint2D::from_degrees(84., 30.).unwrap();
        assert_eq!(Mgrs::from_point(&cap_edge, 5).unwrap().to_string(), "ZFB 33363 22596");
    }

    #[test]
    fn from_grid_position() {
        let point = GeodeticPoint2D::from_degrees(40.748_333, -73.985_278).unwrap();
        let utm = UtmUps::from_point(&point).unwrap();
        let mgrs = Mgrs::from_utm_ups(&utm, 5).unwrap();
        assert_eq!(mgrs.to_string(), "18TWL 85664 11315");
        assert_eq!(mgrs.to_utm_ups(), utm);
    }

    #[test]
    fn parse_tolerates_spacing_and_case() {
        let compact: Mgrs = "4QFJ0886462894".parse().unwrap();
        let spaced: Mgrs = " 4q fj 08864\t62894 ".parse().unwrap();
        assert_eq!(compact, spaced);
        assert_eq!(compact.zone(), 4);
        assert_eq!(compact.precision(), Some(5));
        // Center of the 1 m square
        assert_abs_diff_eq!(compact.easting(), 608_864.5);
        assert_abs_diff_eq!(compact.northing(), 2_362_894.5);
    }

    #[test]
    fn low_precision_resolves_to_center() {
        let mgrs: Mgrs = "18SUJ".parse().unwrap();
        assert_eq!(mgrs.precision(), Some(0));
        assert_abs_diff_eq!(mgrs.easting(), 350_000.);
        assert_abs_diff_eq!(mgrs.northing(), 4_350_000.);

        let mgrs: Mgrs = "18SUJ2306".parse().unwrap();
        assert_abs_diff_eq!(mgrs.easting(), 323_500.);
        assert_abs_diff_eq!(mgrs.northing(), 4_306_500.);
    }

    #[test]
    fn grid_zone_only() {
        let gzd: Mgrs = "18S".parse().unwrap();
        assert_eq!(gzd.precision(), None);
        assert_eq!(gzd.to_string(), "18S");
        let center = gzd.to_point();
        assert!((32.0..40.0).contains(&center.latitude().degrees()));
        assert_abs_diff_eq!(center.longitude().degrees(), -75., epsilon = 1e-9);

        let norway: Mgrs = "31V".parse().unwrap();
        assert_abs_diff_eq!(norway.easting(), 400_000.);

        let polar: Mgrs = "Z".parse().unwrap();
        assert_eq!(polar.to_string(), "Z");
        assert!(polar.is_north());
        assert_abs_diff_eq!(polar.to_point().longitude().degrees(), 90., epsilon = 1e-9);
    }

    #[test]
    fn parse_errors() {
        for bad in [
            "",
            "18",
            "INV",
            "0SUJ",
            "61SUJ",
            "123SUJ",
            "18ISUJ",
            "18IUJ",
            "18SIJ",
            "18SUW",
            "18SU",
            "18SUR",
            "18SUJ234830647",
            "18SUJ234567234567",
            "18SUJ23X83",
            "ZGI",
            "18SUJ 2348é 06479",
        ] {
            assert!(
                matches!(bad.parse::<Mgrs>(), Err(Error::InvalidMgrs(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn round_trip_every_precision() {
        let point = GeodeticPoint2D::from_degrees(-22.951_58, -43.210_72).unwrap();
        let mgrs = Mgrs::from_point(&point, 5).unwrap();
        for precision in 0..=MAX_PRECISION {
            let code = mgrs.format(precision).unwrap();
            let parsed: Mgrs = code.parse().unwrap();
            assert_eq!(parsed.format(precision).unwrap(), code);
        }
    }
}
