use std::{collections::HashMap, fmt::Display, str::FromStr};

use lazy_static::lazy_static;

use crate::{constants::{WGS84_A, WGS84_F}, Error, ParseCoord};

/// Reference ellipsoid: semi-major axis and flattening.
///
/// Only the named presets are available; look them up with [`FromStr`] or
/// use the associated constants.
///
/// ```
/// use geodesy::Ellipsoid;
///
/// let e: Ellipsoid = "grs80".parse().unwrap();
/// assert_eq!(e, Ellipsoid::GRS80);
/// assert!("mars".parse::<Ellipsoid>().is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "String", try_from = "String"))]
pub struct Ellipsoid {
    name: &'static str,
    a: f64,
    f: f64,
}

#[allow(clippy::unreadable_literal)]
impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid::new("WGS 84", WGS84_A, WGS84_F);
    pub const GRS80: Ellipsoid = Ellipsoid::new("GRS 80", 6_378_137.0, 1.0 / 298.257222101);
    pub const WGS72: Ellipsoid = Ellipsoid::new("WGS 72", 6_378_135.0, 1.0 / 298.26);
    pub const CLARKE_1866: Ellipsoid = Ellipsoid::new("Clarke 1866", 6_378_206.4, 1.0 / 294.978698214);
    pub const INTERNATIONAL_1924: Ellipsoid = Ellipsoid::new("International 1924", 6_378_388.0, 1.0 / 297.0);
    pub const AIRY_1830: Ellipsoid = Ellipsoid::new("Airy 1830", 6_377_563.396, 1.0 / 299.3249646);
    pub const BESSEL_1841: Ellipsoid = Ellipsoid::new("Bessel 1841", 6_377_397.155, 1.0 / 299.1528128);

    pub(crate) const fn new(name: &'static str, a: f64, f: f64) -> Self {
        Self { name, a, f }
    }

    /// Every preset, WGS84 first.
    pub fn presets() -> &'static [Ellipsoid] {
        &PRESETS
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Semi-major axis in meters.
    pub fn a(&self) -> f64 {
        self.a
    }

    /// Flattening.
    pub fn f(&self) -> f64 {
        self.f
    }

    /// Semi-minor axis in meters.
    pub fn b(&self) -> f64 {
        self.a * (1. - self.f)
    }

    /// First eccentricity squared.
    pub fn e2(&self) -> f64 {
        self.f * (2. - self.f)
    }

    /// First eccentricity.
    pub fn eccentricity(&self) -> f64 {
        self.e2().sqrt()
    }

    /// Second eccentricity squared.
    pub fn ep2(&self) -> f64 {
        let e2 = self.e2();
        e2 / (1. - e2)
    }

    /// Third flattening.
    pub fn n(&self) -> f64 {
        self.f / (2. - self.f)
    }

    /// Radius of curvature in the prime vertical at `lat` (degrees).
    pub fn prime_vertical_radius(&self, lat: f64) -> f64 {
        self.a / (1. - self.e2() * lat.to_radians().sin().powi(2)).sqrt()
    }

    /// Radius of curvature in the meridian at `lat` (degrees).
    pub fn meridian_radius(&self, lat: f64) -> f64 {
        let e2 = self.e2();
        self.a * (1. - e2) / (1. - e2 * lat.to_radians().sin().powi(2)).powf(1.5)
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Ellipsoid::WGS84
    }
}

static PRESETS: [Ellipsoid; 7] = [
    Ellipsoid::WGS84,
    Ellipsoid::GRS80,
    Ellipsoid::WGS72,
    Ellipsoid::CLARKE_1866,
    Ellipsoid::INTERNATIONAL_1924,
    Ellipsoid::AIRY_1830,
    Ellipsoid::BESSEL_1841,
];

/// Lookup key: lowercase with spaces, dashes and underscores removed.
fn registry_key(name: &str) -> String {
    name
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

lazy_static! {
    static ref REGISTRY: HashMap<String, Ellipsoid> = {
        let mut map: HashMap<String, Ellipsoid> = PRESETS
            .iter()
            .map(|e| (registry_key(e.name), *e))
            .collect();
        map.insert("hayford".to_string(), Ellipsoid::INTERNATIONAL_1924);
        map.insert("international".to_string(), Ellipsoid::INTERNATIONAL_1924);
        map.insert("nad27".to_string(), Ellipsoid::CLARKE_1866);
        map.insert("nad83".to_string(), Ellipsoid::GRS80);
        map
    };
}

impl FromStr for Ellipsoid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        REGISTRY
            .get(&registry_key(s))
            .copied()
            .ok_or_else(|| Error::InvalidEllipsoid(s.to_string()))
    }
}

impl ParseCoord for Ellipsoid {
    fn parse_coord(value: &str) -> Result<Self, Error> {
        value.parse()
    }
}

impl Display for Ellipsoid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<Ellipsoid> for String {
    fn from(value: Ellipsoid) -> Self {
        value.name.to_string()
    }
}

impl TryFrom<String> for Ellipsoid {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
