//! Tolerant parsing of human-entered latitude/longitude text.
//!
//! A fixed, ordered list of format families is tried against the
//! normalized input and the first structural match wins:
//!
//! 1. signed decimal degrees: `38.889097 -77.035`, `38+ 77-`
//! 2. hemisphere decimal degrees: `38.889097N 77.035W`, `W77.035 N38.889097`
//! 3. degrees, minutes and seconds with unit symbols: `38d53m20.76sN`
//! 4. degrees, minutes and seconds split by blanks, `:`, `/` or `,`
//! 5. packed digits: `385320.76N 0770206.00W`
//! 6. handheld device style degrees and decimal minutes: `36-22.123N,048-05.881E`
//!
//! Once a family matches, failing its value checks is an error; later
//! families are not tried.

use lazy_static::lazy_static;
use log::debug;
use regex::{Captures, Regex};

use crate::{
    angle::{dms_to_degrees, Latitude, Longitude},
    coords::point::GeodeticPoint2D,
    utility::dms,
    Error,
};

const SEPARATOR: &str = r"(?P<sep>[\s,;:/|]*)";
const DEVICE_SEPARATOR: &str = r"(?P<sep>\s*,\s*|\s+)";

/// Name, packed digits flag, coordinate pattern and pair separator.
/// `{i}` in a pattern stands for the coordinate index.
const FAMILY_PATTERNS: [(&str, bool, &str, &str); 6] = [
    (
        "signed degrees",
        false,
        r"(?P<pre{i}>[+-])?\s*(?P<deg{i}>[0-9]{1,3}(?:\.[0-9]*)?|\.[0-9]+)d?(?P<suf{i}>[+-])?",
        SEPARATOR,
    ),
    (
        "hemisphere degrees",
        false,
        r"(?P<pre{i}>[NSEW])?\s*(?P<deg{i}>[0-9]{1,3}(?:\.[0-9]*)?|\.[0-9]+)\s*d?\s*(?P<suf{i}>[NSEW])?",
        SEPARATOR,
    ),
    (
        "DMS symbols",
        false,
        r#"(?P<pre{i}>[NSEW+-])?\s*(?P<deg{i}>[0-9]{1,3})\s*d\s*(?P<min{i}>[0-9]{1,2}(?:\.[0-9]+)?)\s*(?:m|')\s*(?:(?P<sec{i}>[0-9]{1,2}(?:\.[0-9]+)?)\s*(?:s|")?)?\s*(?P<suf{i}>[NSEW+-])?"#,
        SEPARATOR,
    ),
    (
        "DMS fields",
        false,
        r"(?P<pre{i}>[NSEW+-])?\s*(?P<deg{i}>[0-9]{1,3})(?:\s+|\s*[:/,]\s*)(?P<min{i}>[0-9]{1,2}(?:\.[0-9]+)?)(?:(?:\s+|\s*[:/,]\s*)(?P<sec{i}>[0-9]{1,2}(?:\.[0-9]+)?))?\s*(?P<suf{i}>[NSEW+-])?",
        SEPARATOR,
    ),
    (
        "packed digits",
        true,
        r"(?P<pre{i}>[NSEW+-])?\s*(?P<deg{i}>[0-9]+(?:\.[0-9]*)?|\.[0-9]+)\s*(?P<suf{i}>[NSEW+-])?",
        SEPARATOR,
    ),
    (
        "device",
        false,
        r"(?P<pre{i}>[NSEW+-])?(?P<deg{i}>[0-9]{1,3})-(?P<min{i}>[0-9]{1,2}\.[0-9]+)(?P<suf{i}>[NSEW])?",
        DEVICE_SEPARATOR,
    ),
];

struct Family {
    name: &'static str,
    packed: bool,
    pair: Regex,
    single: Regex,
}

fn build_families() -> Result<Vec<Family>, regex::Error> {
    FAMILY_PATTERNS
        .iter()
        .map(|&(name, packed, coord, sep)| {
            let first = coord.replace("{i}", "1");
            let second = coord.replace("{i}", "2");
            Ok(Family {
                name,
                packed,
                pair: Regex::new(&format!(r"(?i)^\s*{first}{sep}{second}\s*$"))?,
                single: Regex::new(&format!(r"(?i)^\s*{first}\s*$"))?,
            })
        })
        .collect()
}

lazy_static! {
    static ref FAMILIES: Result<Vec<Family>, regex::Error> = build_families();
}

fn families(input: &str) -> Result<&'static [Family], Error> {
    match &*FAMILIES {
        Ok(families) => Ok(families),
        Err(e) => Err(Error::parse(input, e.to_string())),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn of(marker: Option<char>) -> Option<Axis> {
        match marker {
            Some('N' | 'S') => Some(Axis::Latitude),
            Some('E' | 'W') => Some(Axis::Longitude),
            _ => None,
        }
    }

    fn other(self) -> Axis {
        match self {
            Axis::Latitude => Axis::Longitude,
            Axis::Longitude => Axis::Latitude,
        }
    }

    fn limit(self) -> f64 {
        match self {
            Axis::Latitude => f64::from(dms::QD),
            Axis::Longitude => f64::from(dms::HD),
        }
    }
}

/// Brackets become blanks, degree signs become `d` and typographic primes
/// and quotes become ASCII.
fn normalize(input: &str) -> String {
    let text: String = input
        .trim()
        .chars()
        .map(|c| match c {
            '(' | ')' | '[' | ']' => ' ',
            '°' | 'º' | '˚' => 'd',
            '′' | '’' | '‘' | '´' => '\'',
            '″' | '“' | '”' => '"',
            c => c,
        })
        .collect();

    text.replace("''", "\"").trim().to_string()
}

fn marker(caps: &Captures, name: &str) -> Option<char> {
    caps.name(name)
        .and_then(|m| m.as_str().chars().next())
        .map(|c| c.to_ascii_uppercase())
}

fn number(text: &str, input: &str) -> Result<f64, Error> {
    text.parse()
        .map_err(|_| Error::parse(input, format!("'{text}' is not a number")))
}

/// A numeric field with an optional fraction; either side may be empty.
fn decimal(int: &str, frac: &str, input: &str) -> Result<f64, Error> {
    number(&format!("0{int}.{frac}0"), input)
}

fn sexagesimal(degrees: f64, minutes: f64, seconds: f64, input: &str) -> Result<f64, Error> {
    dms_to_degrees(degrees, minutes, seconds).map_err(|e| Error::parse(input, e.to_string()))
}

/// Splits a packed digit run into degrees, minutes and seconds. Latitudes
/// carry two degree digits and longitudes three; with no axis known, an
/// even width means two.
fn packed_degrees(digits: &str, axis: Option<Axis>, input: &str) -> Result<f64, Error> {
    let (int, frac) = digits.split_once('.').unwrap_or((digits, ""));
    if int.len() < 4 {
        return decimal(int, frac, input);
    }

    let width = match axis {
        Some(Axis::Latitude) => 2,
        Some(Axis::Longitude) => 3,
        None if int.len() % 2 == 0 => 2,
        None => 3,
    };
    let (deg, rest) = int.split_at(width);
    let degrees = number(deg, input)?;

    let (minutes, seconds) = match rest.len() {
        2 => (decimal(rest, frac, input)?, 0.),
        4 => (number(&rest[..2], input)?, decimal(&rest[2..], frac, input)?),
        n if n > 4 && frac.is_empty() => (number(&rest[..2], input)?, decimal(&rest[2..4], &rest[4..], input)?),
        _ => return Err(Error::parse(input, format!("Cannot split packed digits '{digits}'"))),
    };

    sexagesimal(degrees, minutes, seconds, input)
}

/// Unsigned magnitude of coordinate `i` in degrees.
fn magnitude(family: &Family, caps: &Captures, i: usize, axis: Option<Axis>, input: &str) -> Result<f64, Error> {
    let field = |name: &str| caps.name(&format!("{name}{i}")).map(|m| m.as_str());
    let deg = field("deg").ok_or_else(|| Error::parse(input, "Missing degrees"))?;

    if family.packed {
        return packed_degrees(deg, axis, input);
    }

    let degrees = number(deg, input)?;
    let minutes = field("min").map(|m| number(m, input)).transpose()?.unwrap_or(0.);
    let seconds = field("sec").map(|s| number(s, input)).transpose()?.unwrap_or(0.);
    sexagesimal(degrees, minutes, seconds, input)
}

fn single_marker(pre: Option<char>, suf: Option<char>, input: &str) -> Result<Option<char>, Error> {
    match (pre, suf) {
        (Some(_), Some(_)) => Err(Error::parse(input, "Coordinate carries two sign or hemisphere markers")),
        (pre, suf) => Ok(pre.or(suf)),
    }
}

fn signed(value: f64, marker: Option<char>) -> f64 {
    if matches!(marker, Some('S' | 'W' | '-')) { -value } else { value }
}

fn pair_from_captures(family: &Family, caps: &Captures, input: &str) -> Result<GeodeticPoint2D, Error> {
    let deg2 = caps
        .name("deg2")
        .ok_or_else(|| Error::parse(input, "Missing second coordinate"))?;
    let end1 = ["deg1", "min1", "sec1"]
        .iter()
        .filter_map(|name| caps.name(name))
        .map(|m| m.end())
        .max()
        .unwrap_or_default();
    if end1 == deg2.start() {
        return Err(Error::parse(input, "No separator between the coordinates"));
    }

    let mut markers = [
        [marker(caps, "pre1"), marker(caps, "suf1")],
        [marker(caps, "pre2"), marker(caps, "suf2")],
    ];
    let first_bare = markers[0] == [None, None];
    let second_bare = markers[1] == [None, None];
    let suf1_touches = caps.name("suf1").is_some_and(|m| m.end() == deg2.start());

    // A marker between the numbers may belong to either side
    if markers[0][0].is_some() && markers[0][1].is_some() && second_bare {
        markers[1][0] = markers[0][1].take();
    } else if markers[1][0].is_some() && markers[1][1].is_some() && first_bare {
        markers[0][1] = markers[1][0].take();
    } else if markers[0][0].is_none() && markers[0][1].is_some() && second_bare && suf1_touches {
        markers[1][0] = markers[0][1].take();
    }

    let marks = [
        single_marker(markers[0][0], markers[0][1], input)?,
        single_marker(markers[1][0], markers[1][1], input)?,
    ];

    let axes = match (Axis::of(marks[0]), Axis::of(marks[1])) {
        (Some(a), Some(b)) if a == b => {
            return Err(Error::parse(input, "Both coordinates name the same axis"));
        }
        (Some(a), _) => Some([a, a.other()]),
        (None, Some(b)) => Some([b.other(), b]),
        (None, None) => None,
    };

    let mut values = [0.; 2];
    for (i, value) in values.iter_mut().enumerate() {
        let axis = axes.map(|axes| axes[i]);
        *value = signed(magnitude(family, caps, i + 1, axis, input)?, marks[i]);
    }

    // Without hemisphere letters, only a latitude fits in [-90, 90]
    let axes = axes.unwrap_or(if values[0].abs() <= Axis::Latitude.limit() {
        [Axis::Latitude, Axis::Longitude]
    } else {
        [Axis::Longitude, Axis::Latitude]
    });
    let (lat, lon) = if axes[0] == Axis::Latitude { (values[0], values[1]) } else { (values[1], values[0]) };

    if lat.abs() > Axis::Latitude.limit() || lon.abs() > Axis::Longitude.limit() {
        return Err(Error::parse(input, format!("Latitude {lat} or longitude {lon} out of range")));
    }

    GeodeticPoint2D::from_degrees(lat, lon)
}

/// Parses a latitude/longitude pair in any of the supported formats. The
/// order of the two values is taken from hemisphere letters when present.
///
/// # Errors
///
/// Returns [`Error::Parse`] for text matching no format, or matching one
/// with out-of-range, duplicated or ambiguous values.
///
/// ```
/// use geodesy::parse::parse_lat_lon;
///
/// let p = parse_lat_lon("W77,2,6,N38,53,20.76").unwrap();
/// assert!((p.latitude().degrees() - 38.8891).abs() < 1e-9);
/// assert!((p.longitude().degrees() + 77.035).abs() < 1e-9);
///
/// assert!(parse_lat_lon("38.889097N 38.1N").is_err());
/// ```
pub fn parse_lat_lon(input: &str) -> Result<GeodeticPoint2D, Error> {
    let text = normalize(input);

    for family in families(input)? {
        if let Some(caps) = family.pair.captures(&text) {
            let point = pair_from_captures(family, &caps, input)?;
            debug!("Parsed '{input}' as {} lat/lon", family.name);
            return Ok(point);
        }
    }

    Err(Error::parse(input, "Not a recognized latitude/longitude format"))
}

fn parse_single(input: &str, axis: Axis) -> Result<f64, Error> {
    let text = normalize(input);

    for family in families(input)? {
        let Some(caps) = family.single.captures(&text) else {
            continue;
        };

        let mark = single_marker(marker(&caps, "pre1"), marker(&caps, "suf1"), input)?;
        if Axis::of(mark).is_some_and(|a| a != axis) {
            return Err(Error::parse(input, format!("Hemisphere letter does not belong to a {axis:?}")));
        }

        let value = signed(magnitude(family, &caps, 1, Some(axis), input)?, mark);
        if value.abs() > axis.limit() {
            return Err(Error::parse(input, format!("{axis:?} {value} out of range")));
        }
        debug!("Parsed '{input}' as {} {axis:?}", family.name);
        return Ok(value);
    }

    Err(Error::parse(input, format!("Not a recognized {axis:?} format")))
}

/// # Errors
///
/// Returns [`Error::Parse`] for malformed text, a longitude hemisphere or
/// a value beyond 90°.
///
/// ```
/// use geodesy::parse::parse_latitude;
///
/// assert!((parse_latitude("38d53m20.76sS").unwrap().degrees() + 38.8891).abs() < 1e-9);
/// assert!(parse_latitude("77.035W").is_err());
/// ```
pub fn parse_latitude(input: &str) -> Result<Latitude, Error> {
    Latitude::from_degrees(parse_single(input, Axis::Latitude)?)
}

/// # Errors
///
/// Returns [`Error::Parse`] for malformed text, a latitude hemisphere or a
/// value beyond 180°.
pub fn parse_longitude(input: &str) -> Result<Longitude, Error> {
    Longitude::from_degrees(parse_single(input, Axis::Longitude)?)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn lat_lon(input: &str) -> (f64, f64) {
        let point = parse_lat_lon(input).unwrap_or_else(|e| panic!("{input}: {e}"));
        (point.latitude().degrees(), point.longitude().degrees())
    }

    #[test]
    fn normalizes_symbols() {
        assert_eq!(normalize(" (38° 53′ 20″ N) "), "38d 53' 20\" N");
        assert_eq!(normalize("[77º2'6''W]"), "77d2'6\"W");
    }

    #[test]
    fn every_family_matches() {
        let cases = [
            ("+38 -77", "signed degrees"),
            ("38.889097N 77.035000W", "hemisphere degrees"),
            ("38d53m20.76sN 77d2m6.00sW", "DMS symbols"),
            ("38:53:20.76N:077:02:06.00W", "DMS fields"),
            ("385320.76N 0770206.00W", "packed digits"),
            ("36-22.123N,048-05.881E", "device"),
        ];
        let text_families = families("").unwrap();

        for (input, expected) in cases {
            let text = normalize(input);
            let family = text_families.iter().find(|f| f.pair.is_match(&text)).unwrap();
            assert_eq!(family.name, expected, "{input}");
        }
    }

    #[test]
    fn markers_move_between_coordinates() {
        let (lat, lon) = lat_lon("38+ 77-");
        assert_abs_diff_eq!(lat, 38.);
        assert_abs_diff_eq!(lon, -77.);

        let (lat, lon) = lat_lon("+38 77-");
        assert_abs_diff_eq!(lat, 38.);
        assert_abs_diff_eq!(lon, -77.);

        let (lat, lon) = lat_lon("38.889097-77.035000");
        assert_abs_diff_eq!(lat, 38.889_097, epsilon = 1e-12);
        assert_abs_diff_eq!(lon, -77.035, epsilon = 1e-12);
    }

    #[test]
    fn hemisphere_letters_pick_the_axis() {
        let (lat, lon) = lat_lon("W77.035000 38.889097N");
        assert_abs_diff_eq!(lat, 38.889_097, epsilon = 1e-12);
        assert_abs_diff_eq!(lon, -77.035, epsilon = 1e-12);

        let (lat, lon) = lat_lon("0770206.00W N385320.76");
        assert_abs_diff_eq!(lat, 38.8891, epsilon = 1e-9);
        assert_abs_diff_eq!(lon, -77.035, epsilon = 1e-9);
    }

    #[test]
    fn magnitude_picks_the_axis() {
        let (lat, lon) = lat_lon("120.5 45");
        assert_abs_diff_eq!(lat, 45.);
        assert_abs_diff_eq!(lon, 120.5, epsilon = 1e-12);
    }

    #[test]
    fn packed_widths() {
        assert_abs_diff_eq!(packed_degrees("385320.76", Some(Axis::Latitude), "").unwrap(), 38.8891, epsilon = 1e-9);
        assert_abs_diff_eq!(packed_degrees("0770206", Some(Axis::Longitude), "").unwrap(), 77.035, epsilon = 1e-9);
        assert_abs_diff_eq!(packed_degrees("3853.5", Some(Axis::Latitude), "").unwrap(), 38.891_666_667, epsilon = 1e-9);
        assert_abs_diff_eq!(packed_degrees("3853207623", None, "").unwrap(), 38.889_100_6, epsilon = 1e-7);
        assert_abs_diff_eq!(packed_degrees(".76", None, "").unwrap(), 0.76, epsilon = 1e-12);
        assert_abs_diff_eq!(packed_degrees("165", None, "").unwrap(), 165.);

        assert!(packed_degrees("1653.76", Some(Axis::Longitude), "").is_err());
        assert!(packed_degrees("386120", Some(Axis::Latitude), "").is_err());
    }

    #[test]
    fn rejects_malformed_pairs() {
        for bad in [
            "-314/61239",
            "3877",
            "38.889097N 38.1N",
            "++38.889097",
            "38.889097 -+",
            "-+-38.889097",
            "N38 77S",
            "38 61 N 77 0 W",
            "",
            "hello world",
        ] {
            assert!(
                matches!(parse_lat_lon(bad), Err(Error::Parse { .. })),
                "{bad} should not parse"
            );
        }
    }

    #[test]
    fn single_coordinates() {
        assert_abs_diff_eq!(parse_latitude("38 53 20.76 N").unwrap().degrees(), 38.8891, epsilon = 1e-9);
        assert_abs_diff_eq!(parse_latitude("-45.5").unwrap().degrees(), -45.5, epsilon = 1e-12);
        assert_abs_diff_eq!(parse_longitude("0770206.00W").unwrap().degrees(), -77.035, epsilon = 1e-9);
        assert_abs_diff_eq!(parse_longitude("W118 24.471").unwrap().degrees(), -118.407_85, epsilon = 1e-9);

        assert!(parse_latitude("91").is_err());
        assert!(parse_latitude("10E").is_err());
        assert!(parse_longitude("10N").is_err());
        assert!(parse_longitude("181").is_err());
        assert!(parse_longitude("N10S").is_err());
    }
}
