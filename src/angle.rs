use std::{
    f64::consts::{PI, TAU},
    fmt::Display,
    ops::{Add, Neg, Sub},
    str::FromStr,
};

use crate::{
    parse,
    utility::{dms, GeoMath},
    Error, ParseCoord, ThisOrThat,
};

/// Largest number of fractional second digits [`DmsFormat`] will render.
const MAX_FRACTION_DIGITS: usize = 9;

/// A plane angle stored in radians, normalized to `(-π, π]`.
///
/// ```
/// use geodesy::Angle;
///
/// let a = Angle::from_degrees(190.0).unwrap();
/// assert!((a.degrees() + 170.0).abs() < 1e-12);
/// assert!((a.bearing() - 190.0).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Angle {
    radians: f64,
}

impl Angle {
    pub const ZERO: Angle = Angle { radians: 0. };

    /// Internal constructor for values already known to be finite.
    pub(crate) fn new(radians: f64) -> Angle {
        let mut radians = radians.remainder(TAU);
        if radians <= -PI {
            radians += TAU;
        } else if radians > PI {
            radians -= TAU;
        }
        Self { radians }
    }

    pub(crate) fn new_degrees(degrees: f64) -> Angle {
        Self::new(degrees.ang_normalize().to_radians())
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidAngle`] if `radians` is not finite.
    pub fn from_radians(radians: f64) -> Result<Angle, Error> {
        if radians.is_finite() {
            Ok(Self::new(radians))
        } else {
            Err(Error::InvalidAngle(format!("{radians} radians is not finite")))
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidAngle`] if `degrees` is not finite.
    pub fn from_degrees(degrees: f64) -> Result<Angle, Error> {
        if degrees.is_finite() {
            Ok(Self::new_degrees(degrees))
        } else {
            Err(Error::InvalidAngle(format!("{degrees} degrees is not finite")))
        }
    }

    /// Builds an angle from sexagesimal components. The sign applies to the
    /// whole value.
    ///
    /// ```
    /// use geodesy::Angle;
    ///
    /// let a = Angle::from_dms(true, 77, 2, 6.0).unwrap();
    /// assert!((a.degrees() + 77.035).abs() < 1e-12);
    ///
    /// assert!(Angle::from_dms(false, 10, 60, 0.0).is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAngle`] if minutes or seconds are not in `[0, 60)`.
    pub fn from_dms(negative: bool, degrees: u32, minutes: u32, seconds: f64) -> Result<Angle, Error> {
        let value = dms_to_degrees(f64::from(degrees), f64::from(minutes), seconds)?;
        Self::from_degrees(negative.ternary(-value, value))
    }

    pub fn radians(&self) -> f64 {
        self.radians
    }

    pub fn degrees(&self) -> f64 {
        self.radians.to_degrees()
    }

    /// Degrees in `[0, 360)`, the usual compass convention for azimuths.
    pub fn bearing(&self) -> f64 {
        self.degrees().to_bearing()
    }

    /// Formats the signed angle in degrees, minutes and seconds.
    ///
    /// ```
    /// use geodesy::{Angle, DmsFormat};
    ///
    /// let a = Angle::from_degrees(-77.035).unwrap();
    /// assert_eq!(a.to_dms(&DmsFormat::default()), "-77° 2' 6\"");
    /// ```
    pub fn to_dms(&self, format: &DmsFormat) -> String {
        let degrees = self.degrees();
        let sign = (degrees < 0.).ternary("-", "");
        format!("{sign}{}", format.render(degrees.abs()))
    }
}

impl Add for Angle {
    type Output = Angle;

    fn add(self, rhs: Angle) -> Angle {
        Angle::new(self.radians + rhs.radians)
    }
}

impl Sub for Angle {
    type Output = Angle;

    fn sub(self, rhs: Angle) -> Angle {
        Angle::new(self.radians - rhs.radians)
    }
}

impl Neg for Angle {
    type Output = Angle;

    fn neg(self) -> Angle {
        Angle::new(-self.radians)
    }
}

impl Display for Angle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut buf = ryu::Buffer::new();
        write!(f, "{}°", buf.format(self.degrees()))
    }
}

/// North/south half of the globe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Hemisphere {
    North,
    South,
}

impl Hemisphere {
    /// Accepts `'N'` or `'S'`, in either case.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHemisphere`] for any other character.
    pub fn from_char(c: char) -> Result<Hemisphere, Error> {
        match c.to_ascii_uppercase() {
            'N' => Ok(Hemisphere::North),
            'S' => Ok(Hemisphere::South),
            _ => Err(Error::InvalidHemisphere(c)),
        }
    }

    pub fn from_north(northp: bool) -> Hemisphere {
        northp.ternary(Hemisphere::North, Hemisphere::South)
    }

    pub fn as_char(&self) -> char {
        match self {
            Hemisphere::North => 'N',
            Hemisphere::South => 'S',
        }
    }

    pub fn is_north(&self) -> bool {
        *self == Hemisphere::North
    }
}

impl Display for Hemisphere {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A latitude in `[-90°, 90°]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "f64", into = "f64"))]
pub struct Latitude(Angle);

impl Latitude {
    /// # Errors
    ///
    /// Returns [`Error::InvalidCoord`] if `degrees` is not finite or lies
    /// outside `[-90, 90]`.
    ///
    /// ```
    /// use geodesy::Latitude;
    ///
    /// assert!(Latitude::from_degrees(38.889097).is_ok());
    /// assert!(Latitude::from_degrees(90.0).is_ok());
    /// assert!(Latitude::from_degrees(90.5).is_err());
    /// ```
    pub fn from_degrees(degrees: f64) -> Result<Latitude, Error> {
        let qd = f64::from(dms::QD);
        if degrees.is_finite() && (-qd..=qd).contains(&degrees) {
            Ok(Latitude(Angle::new(degrees.to_radians())))
        } else {
            Err(Error::InvalidCoord(format!("Latitude {degrees} outside of valid range [-90, 90]")))
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidCoord`] if `radians` lies outside `[-π/2, π/2]`.
    pub fn from_radians(radians: f64) -> Result<Latitude, Error> {
        if radians.is_finite() && (-PI / 2.0..=PI / 2.0).contains(&radians) {
            Ok(Latitude(Angle::new(radians)))
        } else {
            Err(Error::InvalidCoord(format!("Latitude {radians} rad outside of valid range [-π/2, π/2]")))
        }
    }

    /// # Errors
    ///
    /// Returns an error if the components are out of range.
    pub fn from_dms(hemisphere: Hemisphere, degrees: u32, minutes: u32, seconds: f64) -> Result<Latitude, Error> {
        let value = dms_to_degrees(f64::from(degrees), f64::from(minutes), seconds)?;
        Self::from_degrees(hemisphere.is_north().ternary(value, -value))
    }

    /// Clamps into range instead of failing; used for computed values that
    /// can overshoot a pole by rounding.
    pub(crate) fn clamped(degrees: f64) -> Latitude {
        let qd = f64::from(dms::QD);
        Latitude(Angle::new(degrees.clamp(-qd, qd).to_radians()))
    }

    pub fn degrees(&self) -> f64 {
        self.0.degrees()
    }

    pub fn radians(&self) -> f64 {
        self.0.radians()
    }

    pub fn angle(&self) -> Angle {
        self.0
    }

    pub fn hemisphere(&self) -> Hemisphere {
        Hemisphere::from_north(self.0.radians >= 0.)
    }

    /// ```
    /// use geodesy::{DmsFormat, DmsSymbols, Latitude};
    ///
    /// let lat = Latitude::from_degrees(38.8891).unwrap();
    /// let format = DmsFormat { fraction_digits: 2, ..DmsFormat::default() };
    /// assert_eq!(lat.to_dms(&format), "38° 53' 20.76\" N");
    ///
    /// let format = DmsFormat::new(DmsSymbols::Bare, ":", 1);
    /// assert_eq!(lat.to_dms(&format), "38:53:20.8:N");
    /// ```
    pub fn to_dms(&self, format: &DmsFormat) -> String {
        format.render_hemisphere(self.degrees(), 'N', 'S')
    }
}

impl Display for Latitude {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_dms(&DmsFormat::default()))
    }
}

impl From<Latitude> for Angle {
    fn from(value: Latitude) -> Self {
        value.0
    }
}

impl From<Latitude> for f64 {
    fn from(value: Latitude) -> Self {
        value.degrees()
    }
}

impl TryFrom<f64> for Latitude {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Latitude::from_degrees(value)
    }
}

/// A longitude normalized to `(-180°, 180°]`.
///
/// ```
/// use geodesy::{Angle, Longitude};
///
/// let lon = Longitude::from_degrees(170.0).unwrap();
/// let east = lon + Angle::from_degrees(20.0).unwrap();
/// assert!((east.degrees() + 170.0).abs() < 1e-12);
///
/// let lon = Longitude::from_degrees(-180.0).unwrap();
/// assert!((lon.degrees() - 180.0).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "f64", into = "f64"))]
pub struct Longitude(Angle);

impl Longitude {
    pub(crate) fn new(degrees: f64) -> Longitude {
        Longitude(Angle::new_degrees(degrees))
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidCoord`] if `degrees` is not finite.
    pub fn from_degrees(degrees: f64) -> Result<Longitude, Error> {
        if degrees.is_finite() {
            Ok(Self::new(degrees))
        } else {
            Err(Error::InvalidCoord(format!("Longitude {degrees} is not finite")))
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidCoord`] if `radians` is not finite.
    pub fn from_radians(radians: f64) -> Result<Longitude, Error> {
        if radians.is_finite() {
            Ok(Longitude(Angle::new(radians)))
        } else {
            Err(Error::InvalidCoord(format!("Longitude {radians} rad is not finite")))
        }
    }

    /// # Errors
    ///
    /// Returns an error if the components are out of range.
    pub fn from_dms(east: bool, degrees: u32, minutes: u32, seconds: f64) -> Result<Longitude, Error> {
        let value = dms_to_degrees(f64::from(degrees), f64::from(minutes), seconds)?;
        Self::from_degrees(east.ternary(value, -value))
    }

    pub fn degrees(&self) -> f64 {
        self.0.degrees()
    }

    pub fn radians(&self) -> f64 {
        self.0.radians()
    }

    pub fn angle(&self) -> Angle {
        self.0
    }

    pub fn to_dms(&self, format: &DmsFormat) -> String {
        format.render_hemisphere(self.degrees(), 'E', 'W')
    }
}

impl Add<Angle> for Longitude {
    type Output = Longitude;

    fn add(self, rhs: Angle) -> Longitude {
        Longitude(self.0 + rhs)
    }
}

impl Sub<Angle> for Longitude {
    type Output = Longitude;

    fn sub(self, rhs: Angle) -> Longitude {
        Longitude(self.0 - rhs)
    }
}

impl Display for Longitude {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_dms(&DmsFormat::default()))
    }
}

impl From<Longitude> for Angle {
    fn from(value: Longitude) -> Self {
        value.0
    }
}

impl From<Longitude> for f64 {
    fn from(value: Longitude) -> Self {
        value.degrees()
    }
}

impl TryFrom<f64> for Longitude {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Longitude::from_degrees(value)
    }
}

impl FromStr for Latitude {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse::parse_latitude(s)
    }
}

impl FromStr for Longitude {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse::parse_longitude(s)
    }
}

impl ParseCoord for Latitude {
    fn parse_coord(value: &str) -> Result<Self, Error> {
        value.parse()
    }
}

impl ParseCoord for Longitude {
    fn parse_coord(value: &str) -> Result<Self, Error> {
        value.parse()
    }
}

pub(crate) fn dms_to_degrees(degrees: f64, minutes: f64, seconds: f64) -> Result<f64, Error> {
    let dm = f64::from(dms::DM);
    let ms = f64::from(dms::MS);
    if degrees < 0. || !degrees.is_finite() {
        return Err(Error::InvalidAngle(format!("Degrees {degrees} must be a non-negative number")));
    }
    if !(0.0..dm).contains(&minutes) {
        return Err(Error::InvalidAngle(format!("Minutes {minutes} not in [0, 60)")));
    }
    if !(0.0..ms).contains(&seconds) {
        return Err(Error::InvalidAngle(format!("Seconds {seconds} not in [0, 60)")));
    }

    Ok(degrees + minutes / dm + seconds / f64::from(dms::DS))
}

/// Unit markers used when rendering degrees, minutes and seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DmsSymbols {
    /// `°`, `'`, `"`
    #[default]
    Degree,
    /// `°`, `′`, `″`
    Prime,
    /// `d`, `m`, `s`
    Letters,
    /// No unit markers; pair with a non-empty separator.
    Bare,
}

impl DmsSymbols {
    fn markers(self) -> (&'static str, &'static str, &'static str) {
        match self {
            DmsSymbols::Degree => ("°", "'", "\""),
            DmsSymbols::Prime => ("°", "′", "″"),
            DmsSymbols::Letters => ("d", "m", "s"),
            DmsSymbols::Bare => ("", "", ""),
        }
    }
}

/// Options for sexagesimal rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DmsFormat {
    pub symbols: DmsSymbols,
    /// Placed between the components and before a hemisphere letter.
    pub separator: String,
    /// Fractional digits of the seconds, at most 9.
    pub fraction_digits: usize,
}

impl Default for DmsFormat {
    fn default() -> Self {
        Self {
            symbols: DmsSymbols::Degree,
            separator: " ".to_string(),
            fraction_digits: 0,
        }
    }
}

impl DmsFormat {
    pub fn new(symbols: DmsSymbols, separator: &str, fraction_digits: usize) -> DmsFormat {
        Self {
            symbols,
            separator: separator.to_string(),
            fraction_digits,
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn render(&self, degrees: f64) -> String {
        let digits = self.fraction_digits.min(MAX_FRACTION_DIGITS);
        // digits <= 9, so the exponent always fits
        let scale = 10_u64.pow(digits as u32);
        let ds = dms::DS as u64;
        let ms = dms::MS as u64;

        // Round once on the smallest unit so that carries propagate
        let total = (degrees * ds as f64 * scale as f64).round() as u64;
        let deg = total / (ds * scale);
        let min = (total / (ms * scale)) % ms;
        let sec = total % (ms * scale);

        let (d_sym, m_sym, s_sym) = self.symbols.markers();
        let sep = &self.separator;
        let sec_str = if digits == 0 {
            sec.to_string()
        } else {
            format!("{}.{:0digits$}", sec / scale, sec % scale)
        };

        format!("{deg}{d_sym}{sep}{min}{m_sym}{sep}{sec_str}{s_sym}")
    }

    fn render_hemisphere(&self, degrees: f64, positive: char, negative: char) -> String {
        let letter = (degrees < 0.).ternary(negative, positive);
        format!("{}{}{letter}", self.render(degrees.abs()), self.separator)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn angle_normalizes_on_construction() {
        let a = Angle::from_degrees(-180.0).unwrap();
        assert_abs_diff_eq!(a.degrees(), 180.0, epsilon = 1e-12);

        let a = Angle::from_radians(3.0 * PI).unwrap();
        assert_abs_diff_eq!(a.radians(), PI, epsilon = 1e-12);

        let sum = Angle::from_degrees(170.).unwrap() + Angle::from_degrees(30.).unwrap();
        assert_abs_diff_eq!(sum.degrees(), -160.0, epsilon = 1e-12);
        assert_abs_diff_eq!(sum.bearing(), 200.0, epsilon = 1e-12);

        assert!(Angle::from_degrees(f64::NAN).is_err());
        assert!(Angle::from_radians(f64::INFINITY).is_err());
    }

    #[test]
    fn latitude_domain() {
        assert!(Latitude::from_degrees(-90.0).is_ok());
        assert!(Latitude::from_degrees(-90.000_001).is_err());
        assert!(Latitude::from_radians(PI).is_err());
        assert_eq!(Latitude::from_degrees(-0.5).unwrap().hemisphere(), Hemisphere::South);
        assert_eq!(Latitude::from_degrees(0.0).unwrap().hemisphere(), Hemisphere::North);
    }

    #[test]
    fn longitude_wraps() {
        let lon = Longitude::from_degrees(540.0).unwrap();
        assert_abs_diff_eq!(lon.degrees(), 180.0, epsilon = 1e-12);

        let lon = Longitude::from_degrees(-190.0).unwrap();
        assert_abs_diff_eq!(lon.degrees(), 170.0, epsilon = 1e-12);

        let lon = Longitude::from_degrees(-170.0).unwrap() - Angle::from_degrees(15.0).unwrap();
        assert_abs_diff_eq!(lon.degrees(), 175.0, epsilon = 1e-12);
    }

    #[test]
    fn hemisphere_chars() {
        assert_eq!(Hemisphere::from_char('n').unwrap(), Hemisphere::North);
        assert_eq!(Hemisphere::from_char('S').unwrap(), Hemisphere::South);
        assert_eq!(Hemisphere::from_char('X'), Err(Error::InvalidHemisphere('X')));
    }

    #[test]
    fn dms_rendering_carries() {
        // 59.9999 seconds rounds up into the next minute and degree
        let lat = Latitude::from_degrees(10.0 + 59.0 / 60.0 + 59.9999 / 3600.0).unwrap();
        assert_eq!(lat.to_dms(&DmsFormat::default()), "11° 0' 0\" N");

        let lon = Longitude::from_degrees(-77.035).unwrap();
        assert_eq!(lon.to_string(), "77° 2' 6\" W");

        let format = DmsFormat::new(DmsSymbols::Prime, "", 3);
        assert_eq!(lon.to_dms(&format), "77°2′6.000″W");

        let format = DmsFormat::new(DmsSymbols::Letters, "", 2);
        assert_eq!(
            Latitude::from_degrees(-38.8891).unwrap().to_dms(&format),
            "38d53m20.76sS"
        );
    }

    #[test]
    fn dms_components_validated() {
        assert!(Latitude::from_dms(Hemisphere::South, 33, 51, 24.96).is_ok());
        assert!(Latitude::from_dms(Hemisphere::North, 90, 0, 0.5).is_err());
        assert!(Longitude::from_dms(true, 10, 0, 60.0).is_err());

        let lon = Longitude::from_dms(false, 151, 12, 54.39).unwrap();
        assert_abs_diff_eq!(lon.degrees(), -(151.0 + 12.0 / 60.0 + 54.39 / 3600.0), epsilon = 1e-12);
    }
}
