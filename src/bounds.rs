//! Axis-aligned geodetic regions that grow across the antimeridian.
//!
//! A region is stored as west/east longitudes and south/north latitudes.
//! West may be numerically greater than east: such a region crosses the
//! antimeridian and covers `[west, 180°] ∪ (-180°, east]`.

use std::fmt::Display;

use crate::{
    angle::{Angle, Latitude, Longitude},
    coords::point::{GeodeticPoint2D, GeodeticPoint3D},
    ellipse::GeodeticEllipse,
    ellipsoid::Ellipsoid,
    geodesic::GeodeticArc,
    utility::dms,
    Error,
};

/// Edges of a region covering every longitude.
const FULL_CIRCLE: (f64, f64) = (-180., 180.);
/// Perimeter samples taken when bounding an ellipse.
const ELLIPSE_SAMPLES: u32 = 72;
/// Rounding allowance when comparing longitude spans, in degrees.
const SPAN_EPSILON: f64 = 1e-9;

/// Read access to a bounding region.
pub trait GeodeticBounds {
    type Point;
    /// The plain region type compared against and merged in.
    type Region;

    fn west(&self) -> Longitude;
    fn east(&self) -> Longitude;
    fn south(&self) -> Latitude;
    fn north(&self) -> Latitude;
    /// Eastward extent from west to east, in degrees within `[0, 360]`.
    fn longitude_span(&self) -> f64;
    fn contains_point(&self, point: &Self::Point) -> bool;
    fn contains_bounds(&self, other: &Self::Region) -> bool;
    fn center(&self) -> Self::Point;
}

/// Mutation of a bounding region.
///
/// # Errors
///
/// Every method returns [`Error::ReadOnly`] through a [`ReadOnlyBounds`].
/// Latitude setters return [`Error::InvalidBounds`] when they would leave
/// south above north.
pub trait BoundsMut: GeodeticBounds {
    /// Grows the region by the narrowest extension that covers `point`.
    fn include_point(&mut self, point: &Self::Point) -> Result<(), Error>;
    fn include_bounds(&mut self, other: &Self::Region) -> Result<(), Error>;
    fn set_west(&mut self, west: Longitude) -> Result<(), Error>;
    fn set_east(&mut self, east: Longitude) -> Result<(), Error>;
    fn set_south(&mut self, south: Latitude) -> Result<(), Error>;
    fn set_north(&mut self, north: Latitude) -> Result<(), Error>;
}

fn arc_span(west: f64, east: f64) -> f64 {
    if west <= east {
        east - west
    } else {
        east - west + f64::from(dms::TD)
    }
}

fn arc_contains(west: f64, east: f64, lon: f64) -> bool {
    if west <= east {
        west <= lon && lon <= east
    } else {
        lon >= west || lon <= east
    }
}

/// Smallest eastward arc covering both `a` and `b`, keeping the edges it
/// reuses exact.
fn union_arcs(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    let td = f64::from(dms::TD);
    let (span_a, span_b) = (arc_span(a.0, a.1), arc_span(b.0, b.1));
    if span_a >= td || span_b >= td {
        return FULL_CIRCLE;
    }

    // Starting at a's west edge
    let reach = (b.0 - a.0).rem_euclid(td) + span_b;
    let from_a = if reach > span_a { (reach, (a.0, b.1)) } else { (span_a, a) };
    // Starting at b's west edge
    let reach = (a.0 - b.0).rem_euclid(td) + span_a;
    let from_b = if reach > span_b { (reach, (b.0, a.1)) } else { (span_b, b) };

    let (span, arc) = if from_b.0 < from_a.0 { from_b } else { from_a };
    if span >= td { FULL_CIRCLE } else { arc }
}

/// A latitude/longitude region on the ellipsoid surface.
///
/// ```
/// use geodesy::{Bounds2D, BoundsMut, GeodeticBounds, GeodeticPoint2D};
///
/// let west = GeodeticPoint2D::from_degrees(-10.0, 170.0).unwrap();
/// let east = GeodeticPoint2D::from_degrees(10.0, -170.0).unwrap();
/// let mut bounds = Bounds2D::from_corners(&west, &east);
///
/// assert!(bounds.contains_point(&GeodeticPoint2D::from_degrees(0.0, 180.0).unwrap()));
/// assert!(!bounds.contains_point(&GeodeticPoint2D::from_degrees(0.0, 0.0).unwrap()));
///
/// bounds.include_point(&GeodeticPoint2D::from_degrees(20.0, -160.0).unwrap()).unwrap();
/// assert!((bounds.east().degrees() + 160.0).abs() < 1e-12);
/// assert!((bounds.north().degrees() - 20.0).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawBounds2D"))]
pub struct Bounds2D {
    west: f64,
    east: f64,
    south: f64,
    north: f64,
}

impl Bounds2D {
    /// # Errors
    ///
    /// Returns [`Error::InvalidBounds`] if `south` is above `north`.
    pub fn new(west: Longitude, east: Longitude, south: Latitude, north: Latitude) -> Result<Bounds2D, Error> {
        if south.degrees() > north.degrees() {
            return Err(Error::InvalidBounds(format!("South {south} is above north {north}")));
        }

        Ok(Self {
            west: west.degrees(),
            east: east.degrees(),
            south: south.degrees(),
            north: north.degrees(),
        })
    }

    /// A degenerate region holding only `point`.
    pub fn from_point(point: &GeodeticPoint2D) -> Bounds2D {
        let (lat, lon) = (point.latitude().degrees(), point.longitude().degrees());
        Self {
            west: lon,
            east: lon,
            south: lat,
            north: lat,
        }
    }

    /// The longitude of `west` is always the west edge, even when it is
    /// numerically greater than that of `east`. Latitudes are ordered.
    pub fn from_corners(west: &GeodeticPoint2D, east: &GeodeticPoint2D) -> Bounds2D {
        let (lat1, lat2) = (west.latitude().degrees(), east.latitude().degrees());
        Self {
            west: west.longitude().degrees(),
            east: east.longitude().degrees(),
            south: lat1.min(lat2),
            north: lat1.max(lat2),
        }
    }

    /// The region reached by walking `radius` meters north, east, south and
    /// west of `center`.
    ///
    /// A radius reaching a pole clamps that edge to the pole and widens the
    /// region to every longitude, as does a diameter reaching around the
    /// center's parallel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDistance`] for a negative or non-finite radius
    /// and propagates geodesic failures.
    ///
    /// ```
    /// use geodesy::{Bounds2D, Ellipsoid, GeodeticBounds, GeodeticPoint2D};
    ///
    /// let center = GeodeticPoint2D::from_degrees(0.0, 0.0).unwrap();
    /// let bounds = Bounds2D::from_point_radius(&Ellipsoid::WGS84, &center, 1000.0).unwrap();
    /// assert!((bounds.north().degrees() - 0.009_044).abs() < 1e-6);
    /// assert!((bounds.east().degrees() - 0.008_983).abs() < 1e-6);
    /// ```
    pub fn from_point_radius(ellipsoid: &Ellipsoid, center: &GeodeticPoint2D, radius: f64) -> Result<Bounds2D, Error> {
        if !radius.is_finite() || radius < 0. {
            return Err(Error::InvalidDistance(radius));
        }

        let walk = |azimuth: f64| -> Result<GeodeticPoint2D, Error> {
            Ok(GeodeticArc::direct(ellipsoid, center, Angle::new_degrees(azimuth), radius)?.point2())
        };
        let on_meridian = |lat: f64| GeodeticPoint2D::new(Latitude::clamped(lat), center.longitude());
        let lat = center.latitude();

        // Meridian distances; the pole to pole inverse is degenerate
        let equator = on_meridian(0.);
        let quarter = GeodeticArc::inverse(ellipsoid, &equator, &on_meridian(90.))?.distance();
        let from_equator = GeodeticArc::inverse(ellipsoid, &equator, center)?
            .distance()
            .copysign(lat.degrees());

        let mut full = false;
        let north = if radius >= quarter - from_equator {
            full = true;
            90.
        } else {
            walk(0.)?.latitude().degrees()
        };
        let south = if radius >= quarter + from_equator {
            full = true;
            -90.
        } else {
            walk(180.)?.latitude().degrees()
        };

        let parallel = std::f64::consts::TAU * ellipsoid.prime_vertical_radius(lat.degrees()) * lat.radians().cos();
        let (west, east) = if full || 2. * radius >= parallel {
            FULL_CIRCLE
        } else {
            (walk(270.)?.longitude().degrees(), walk(90.)?.longitude().degrees())
        };

        Ok(Self {
            west,
            east,
            south,
            north,
        })
    }

    /// Bounds an ellipse by sampling its perimeter with the direct geodesic.
    ///
    /// # Errors
    ///
    /// Propagates geodesic failures.
    pub fn from_ellipse(ellipsoid: &Ellipsoid, ellipse: &GeodeticEllipse) -> Result<Bounds2D, Error> {
        let step = f64::from(dms::TD) / f64::from(ELLIPSE_SAMPLES);
        let mut bounds = Self::from_point(&ellipse.center());

        for i in 0..ELLIPSE_SAMPLES {
            let azimuth = ellipse.orientation() + Angle::new_degrees(f64::from(i) * step);
            bounds.include(&ellipse.perimeter_point(ellipsoid, azimuth)?);
        }

        Ok(bounds)
    }

    fn include(&mut self, point: &GeodeticPoint2D) {
        let (lat, lon) = (point.latitude().degrees(), point.longitude().degrees());
        self.south = self.south.min(lat);
        self.north = self.north.max(lat);
        if !self.contains_longitude(lon) {
            (self.west, self.east) = union_arcs((self.west, self.east), (lon, lon));
        }
    }

    fn include_region(&mut self, other: &Bounds2D) {
        self.south = self.south.min(other.south);
        self.north = self.north.max(other.north);
        (self.west, self.east) = union_arcs((self.west, self.east), (other.west, other.east));
    }

    fn contains_longitude(&self, lon: f64) -> bool {
        arc_contains(self.west, self.east, lon)
    }

    fn contains_region(&self, other: &Bounds2D) -> bool {
        if other.south < self.south || other.north > self.north {
            return false;
        }

        let (span, other_span) = (self.longitude_span(), other.longitude_span());
        if span >= f64::from(dms::TD) {
            return true;
        }
        let offset = (other.west - self.west).rem_euclid(f64::from(dms::TD));
        offset + other_span <= span + SPAN_EPSILON
    }

    fn set_latitudes(&mut self, south: f64, north: f64) -> Result<(), Error> {
        if south > north {
            return Err(Error::InvalidBounds(format!("South {south} is above north {north}")));
        }
        self.south = south;
        self.north = north;
        Ok(())
    }

    /// South-west corner.
    pub fn west_corner(&self) -> GeodeticPoint2D {
        GeodeticPoint2D::new(Latitude::clamped(self.south), Longitude::new(self.west))
    }

    /// North-east corner.
    pub fn east_corner(&self) -> GeodeticPoint2D {
        GeodeticPoint2D::new(Latitude::clamped(self.north), Longitude::new(self.east))
    }

    /// True when the region spans the antimeridian.
    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }
}

impl GeodeticBounds for Bounds2D {
    type Point = GeodeticPoint2D;
    type Region = Bounds2D;

    fn west(&self) -> Longitude {
        Longitude::new(self.west)
    }

    fn east(&self) -> Longitude {
        Longitude::new(self.east)
    }

    fn south(&self) -> Latitude {
        Latitude::clamped(self.south)
    }

    fn north(&self) -> Latitude {
        Latitude::clamped(self.north)
    }

    fn longitude_span(&self) -> f64 {
        arc_span(self.west, self.east)
    }

    fn contains_point(&self, point: &GeodeticPoint2D) -> bool {
        let lat = point.latitude().degrees();
        self.south <= lat && lat <= self.north && self.contains_longitude(point.longitude().degrees())
    }

    fn contains_bounds(&self, other: &Bounds2D) -> bool {
        self.contains_region(other)
    }

    fn center(&self) -> GeodeticPoint2D {
        let east = if self.east < self.west { self.east + f64::from(dms::TD) } else { self.east };
        GeodeticPoint2D::new(
            Latitude::clamped((self.south + self.north) / 2.),
            Longitude::new((self.west + east) / 2.),
        )
    }
}

impl BoundsMut for Bounds2D {
    fn include_point(&mut self, point: &GeodeticPoint2D) -> Result<(), Error> {
        self.include(point);
        Ok(())
    }

    fn include_bounds(&mut self, other: &Bounds2D) -> Result<(), Error> {
        self.include_region(other);
        Ok(())
    }

    fn set_west(&mut self, west: Longitude) -> Result<(), Error> {
        self.west = west.degrees();
        Ok(())
    }

    fn set_east(&mut self, east: Longitude) -> Result<(), Error> {
        self.east = east.degrees();
        Ok(())
    }

    fn set_south(&mut self, south: Latitude) -> Result<(), Error> {
        self.set_latitudes(south.degrees(), self.north)
    }

    fn set_north(&mut self, north: Latitude) -> Result<(), Error> {
        self.set_latitudes(self.south, north.degrees())
    }
}

impl From<GeodeticPoint2D> for Bounds2D {
    fn from(value: GeodeticPoint2D) -> Self {
        Self::from_point(&value)
    }
}

/// Unchecked field layout of a serialized [`Bounds2D`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawBounds2D {
    west: f64,
    east: f64,
    south: f64,
    north: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawBounds2D> for Bounds2D {
    type Error = Error;

    fn try_from(raw: RawBounds2D) -> Result<Self, Self::Error> {
        let (hd, qd) = (f64::from(dms::HD), f64::from(dms::QD));
        for lon in [raw.west, raw.east] {
            if !(-hd..=hd).contains(&lon) {
                return Err(Error::InvalidBounds(format!("Longitude {lon} outside of [-{hd}, {hd}]")));
            }
        }
        for lat in [raw.south, raw.north] {
            if !(-qd..=qd).contains(&lat) {
                return Err(Error::InvalidBounds(format!("Latitude {lat} outside of [-{qd}, {qd}]")));
            }
        }
        if raw.south > raw.north {
            return Err(Error::InvalidBounds(format!("South {} is above north {}", raw.south, raw.north)));
        }

        Ok(Self {
            west: raw.west,
            east: raw.east,
            south: raw.south,
            north: raw.north,
        })
    }
}

impl Display for Bounds2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} .. {}", self.west_corner(), self.east_corner())
    }
}

/// A [`Bounds2D`] with an elevation interval in meters.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawBounds3D"))]
pub struct Bounds3D {
    area: Bounds2D,
    min_elevation: f64,
    max_elevation: f64,
}

impl Bounds3D {
    /// The elevations may be given in either order.
    pub fn from_bounds(area: Bounds2D, elevation1: f64, elevation2: f64) -> Bounds3D {
        Self {
            area,
            min_elevation: elevation1.min(elevation2),
            max_elevation: elevation1.max(elevation2),
        }
    }

    pub fn from_point(point: &GeodeticPoint3D) -> Bounds3D {
        Self::from_bounds(Bounds2D::from_point(&point.to_2d()), point.elevation(), point.elevation())
    }

    /// See [`Bounds2D::from_corners`]. Elevations are ordered.
    pub fn from_corners(west: &GeodeticPoint3D, east: &GeodeticPoint3D) -> Bounds3D {
        Self::from_bounds(
            Bounds2D::from_corners(&west.to_2d(), &east.to_2d()),
            west.elevation(),
            east.elevation(),
        )
    }

    pub fn area(&self) -> &Bounds2D {
        &self.area
    }

    pub fn min_elevation(&self) -> f64 {
        self.min_elevation
    }

    pub fn max_elevation(&self) -> f64 {
        self.max_elevation
    }

    /// Replaces the elevation interval; the values may be given in either
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBounds`] if an elevation is not finite.
    pub fn set_elevations(&mut self, elevation1: f64, elevation2: f64) -> Result<(), Error> {
        if !elevation1.is_finite() || !elevation2.is_finite() {
            return Err(Error::InvalidBounds(format!("Elevations {elevation1} and {elevation2} must be finite")));
        }
        self.min_elevation = elevation1.min(elevation2);
        self.max_elevation = elevation1.max(elevation2);
        Ok(())
    }

    fn contains_elevation(&self, elevation: f64) -> bool {
        self.min_elevation <= elevation && elevation <= self.max_elevation
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawBounds3D {
    area: Bounds2D,
    min_elevation: f64,
    max_elevation: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawBounds3D> for Bounds3D {
    type Error = Error;

    fn try_from(raw: RawBounds3D) -> Result<Self, Self::Error> {
        if !(raw.min_elevation.is_finite() && raw.max_elevation.is_finite()) || raw.min_elevation > raw.max_elevation {
            return Err(Error::InvalidBounds(format!(
                "Elevations [{}, {}] are not an ordered finite interval",
                raw.min_elevation, raw.max_elevation
            )));
        }

        Ok(Self {
            area: raw.area,
            min_elevation: raw.min_elevation,
            max_elevation: raw.max_elevation,
        })
    }
}

impl GeodeticBounds for Bounds3D {
    type Point = GeodeticPoint3D;
    type Region = Bounds3D;

    fn west(&self) -> Longitude {
        self.area.west()
    }

    fn east(&self) -> Longitude {
        self.area.east()
    }

    fn south(&self) -> Latitude {
        self.area.south()
    }

    fn north(&self) -> Latitude {
        self.area.north()
    }

    fn longitude_span(&self) -> f64 {
        self.area.longitude_span()
    }

    fn contains_point(&self, point: &GeodeticPoint3D) -> bool {
        self.contains_elevation(point.elevation()) && self.area.contains_point(&point.to_2d())
    }

    fn contains_bounds(&self, other: &Bounds3D) -> bool {
        self.contains_elevation(other.min_elevation)
            && self.contains_elevation(other.max_elevation)
            && self.area.contains_region(&other.area)
    }

    fn center(&self) -> GeodeticPoint3D {
        self.area
            .center()
            .with_elevation((self.min_elevation + self.max_elevation) / 2.)
    }
}

impl BoundsMut for Bounds3D {
    fn include_point(&mut self, point: &GeodeticPoint3D) -> Result<(), Error> {
        self.area.include(&point.to_2d());
        self.min_elevation = self.min_elevation.min(point.elevation());
        self.max_elevation = self.max_elevation.max(point.elevation());
        Ok(())
    }

    fn include_bounds(&mut self, other: &Bounds3D) -> Result<(), Error> {
        self.area.include_region(&other.area);
        self.min_elevation = self.min_elevation.min(other.min_elevation);
        self.max_elevation = self.max_elevation.max(other.max_elevation);
        Ok(())
    }

    fn set_west(&mut self, west: Longitude) -> Result<(), Error> {
        self.area.set_west(west)
    }

    fn set_east(&mut self, east: Longitude) -> Result<(), Error> {
        self.area.set_east(east)
    }

    fn set_south(&mut self, south: Latitude) -> Result<(), Error> {
        self.area.set_south(south)
    }

    fn set_north(&mut self, north: Latitude) -> Result<(), Error> {
        self.area.set_north(north)
    }
}

impl From<GeodeticPoint3D> for Bounds3D {
    fn from(value: GeodeticPoint3D) -> Self {
        Self::from_point(&value)
    }
}

impl Display for Bounds3D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut buf = ryu::Buffer::new();
        let min = buf.format(self.min_elevation).trim_end_matches(".0").to_string();
        let max = buf.format(self.max_elevation).trim_end_matches(".0").to_string();
        write!(f, "{} .. ({min}m, {max}m)", self.area)
    }
}

/// Query-only view of an owned region. Every mutator fails with
/// [`Error::ReadOnly`].
///
/// ```
/// use geodesy::{Bounds2D, BoundsMut, ErrorKind, GeodeticBounds, GeodeticPoint2D, ReadOnlyBounds};
///
/// let point = GeodeticPoint2D::from_degrees(1.0, 2.0).unwrap();
/// let mut frozen = ReadOnlyBounds::new(Bounds2D::from_point(&point));
///
/// assert!(frozen.contains_point(&point));
/// let err = frozen.include_point(&GeodeticPoint2D::default()).unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReadOnlyBounds<B>(B);

impl<B> ReadOnlyBounds<B> {
    pub fn new(bounds: B) -> ReadOnlyBounds<B> {
        Self(bounds)
    }

    pub fn get_ref(&self) -> &B {
        &self.0
    }

    pub fn into_inner(self) -> B {
        self.0
    }
}

impl<B> From<B> for ReadOnlyBounds<B> {
    fn from(value: B) -> Self {
        Self(value)
    }
}

impl<B: GeodeticBounds> GeodeticBounds for ReadOnlyBounds<B> {
    type Point = B::Point;
    type Region = B::Region;

    fn west(&self) -> Longitude {
        self.0.west()
    }

    fn east(&self) -> Longitude {
        self.0.east()
    }

    fn south(&self) -> Latitude {
        self.0.south()
    }

    fn north(&self) -> Latitude {
        self.0.north()
    }

    fn longitude_span(&self) -> f64 {
        self.0.longitude_span()
    }

    fn contains_point(&self, point: &B::Point) -> bool {
        self.0.contains_point(point)
    }

    fn contains_bounds(&self, other: &B::Region) -> bool {
        self.0.contains_bounds(other)
    }

    fn center(&self) -> B::Point {
        self.0.center()
    }
}

impl<B: GeodeticBounds> BoundsMut for ReadOnlyBounds<B> {
    fn include_point(&mut self, _point: &B::Point) -> Result<(), Error> {
        Err(Error::ReadOnly("include a point"))
    }

    fn include_bounds(&mut self, _other: &B::Region) -> Result<(), Error> {
        Err(Error::ReadOnly("include a region"))
    }

    fn set_west(&mut self, _west: Longitude) -> Result<(), Error> {
        Err(Error::ReadOnly("set the west longitude"))
    }

    fn set_east(&mut self, _east: Longitude) -> Result<(), Error> {
        Err(Error::ReadOnly("set the east longitude"))
    }

    fn set_south(&mut self, _south: Latitude) -> Result<(), Error> {
        Err(Error::ReadOnly("set the south latitude"))
    }

    fn set_north(&mut self, _north: Latitude) -> Result<(), Error> {
        Err(Error::ReadOnly("set the north latitude"))
    }
}

impl<B: Display> Display for ReadOnlyBounds<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::Hemisphere;

    fn point(lat: f64, lon: f64) -> GeodeticPoint2D {
        GeodeticPoint2D::from_degrees(lat, lon).unwrap()
    }

    fn dms_point(lat: (Hemisphere, u32, u32, f64), lon: (bool, u32, u32, f64)) -> GeodeticPoint2D {
        GeodeticPoint2D::new(
            Latitude::from_dms(lat.0, lat.1, lat.2, lat.3).unwrap(),
            Longitude::from_dms(lon.0, lon.1, lon.2, lon.3).unwrap(),
        )
    }

    #[test]
    fn antimeridian_containment() {
        let bounds = Bounds2D::from_corners(&point(-5., 170.), &point(5., -170.));
        assert!(bounds.crosses_antimeridian());
        assert_abs_diff_eq!(bounds.longitude_span(), 20., epsilon = 1e-9);
        assert!(bounds.contains_point(&point(0., 180.)));
        assert!(bounds.contains_point(&point(0., -175.)));
        assert!(bounds.contains_point(&point(0., 170.)));
        assert!(!bounds.contains_point(&point(0., 0.)));
        assert!(!bounds.contains_point(&point(6., 180.)));
        assert_abs_diff_eq!(bounds.center().longitude().degrees().abs(), 180., epsilon = 1e-9);
    }

    #[test]
    fn include_takes_the_narrower_side() {
        let mut bounds = Bounds2D::from_corners(&point(0., 10.), &point(1., 20.));
        bounds.include_point(&point(0., 25.)).unwrap();
        assert_abs_diff_eq!(bounds.east().degrees(), 25., epsilon = 1e-12);
        bounds.include_point(&point(0., 5.)).unwrap();
        assert_abs_diff_eq!(bounds.west().degrees(), 5., epsilon = 1e-12);

        let mut bounds = Bounds2D::from_point(&point(0., 175.));
        bounds.include_point(&point(0., -175.)).unwrap();
        assert_abs_diff_eq!(bounds.west().degrees(), 175., epsilon = 1e-12);
        assert_abs_diff_eq!(bounds.east().degrees(), -175., epsilon = 1e-12);
        assert!(bounds.contains_point(&point(0., 180.)));
        assert!(!bounds.contains_point(&point(0., 0.)));

        // Contained points change nothing
        let before = bounds;
        bounds.include_point(&point(0., 179.)).unwrap();
        assert_eq!(bounds, before);
    }

    #[test]
    fn include_bounds_across_the_antimeridian() {
        let bbox1 = Bounds2D::from_corners(
            &dms_point((Hemisphere::South, 85, 41, 54.), (true, 161, 54, 44.)),
            &dms_point((Hemisphere::North, 79, 39, 57.), (true, 99, 8, 8.)),
        );
        let bbox2 = Bounds2D::from_corners(
            &dms_point((Hemisphere::South, 89, 57, 12.), (true, 91, 4, 4.)),
            &dms_point((Hemisphere::North, 87, 50, 13.), (false, 0, 13, 54.)),
        );

        let mut together = bbox1;
        together.include_bounds(&bbox2).unwrap();
        assert!(together.contains_bounds(&bbox1));
        assert!(together.contains_bounds(&bbox2));
        assert_eq!(together.south(), bbox2.south());
        assert_eq!(together.north(), bbox2.north());

        let outside = dms_point((Hemisphere::North, 89, 41, 54.), (true, 172, 54, 44.));
        assert!(!together.contains_point(&outside));
    }

    #[test]
    fn center_unwraps_the_east_edge() {
        let west = point(0., -180.);
        let bounds = Bounds2D::from_corners(&west, &point(60., 30.));
        let center = bounds.center();
        assert!(center.latitude().degrees() <= 60.);
        assert_abs_diff_eq!(center.latitude().degrees(), 30., epsilon = 1e-9);
        assert_abs_diff_eq!(center.longitude().degrees(), -75., epsilon = 1e-9);
        assert!(bounds.contains_point(&west));
    }

    #[test]
    fn contains_bounds_checks_every_edge() {
        let outer = Bounds2D::from_corners(&point(-10., 170.), &point(10., -150.));
        let inner = Bounds2D::from_corners(&point(-5., 175.), &point(5., -160.));
        let straddling = Bounds2D::from_corners(&point(-5., 160.), &point(5., 179.));
        assert!(outer.contains_bounds(&inner));
        assert!(outer.contains_bounds(&outer));
        assert!(!inner.contains_bounds(&outer));
        assert!(!outer.contains_bounds(&straddling));
    }

    #[test]
    fn setters_keep_latitudes_ordered() {
        let mut bounds = Bounds2D::from_corners(&point(0., 0.), &point(10., 10.));
        let too_far = Latitude::from_degrees(20.).unwrap();
        assert!(matches!(bounds.set_south(too_far), Err(Error::InvalidBounds(_))));
        bounds.set_north(too_far).unwrap();
        bounds.set_south(too_far).unwrap();
        assert_eq!(bounds.south(), bounds.north());
        bounds.set_west(Longitude::from_degrees(30.).unwrap()).unwrap();
        assert!(bounds.crosses_antimeridian());

        assert!(Bounds2D::new(
            Longitude::from_degrees(0.).unwrap(),
            Longitude::from_degrees(1.).unwrap(),
            Latitude::from_degrees(5.).unwrap(),
            Latitude::from_degrees(4.).unwrap(),
        )
        .is_err());
    }

    #[test]
    fn radius_bounds() {
        let center = point(45., 10.);
        let bounds = Bounds2D::from_point_radius(&Ellipsoid::WGS84, &center, 10_000.).unwrap();
        assert!(bounds.contains_point(&center));
        assert!(bounds.north().degrees() > 45.08 && bounds.north().degrees() < 45.1);
        assert!(bounds.south().degrees() < 44.92 && bounds.south().degrees() > 44.9);
        assert_abs_diff_eq!(bounds.center().longitude().degrees(), 10., epsilon = 1e-9);

        assert!(matches!(
            Bounds2D::from_point_radius(&Ellipsoid::WGS84, &center, -1.),
            Err(Error::InvalidDistance(_))
        ));
    }

    #[test]
    fn radius_reaching_a_pole_clamps() {
        let center = point(89.9, 10.);
        let bounds = Bounds2D::from_point_radius(&Ellipsoid::WGS84, &center, 20_000.).unwrap();
        assert_abs_diff_eq!(bounds.north().degrees(), 90., epsilon = 1e-12);
        assert_abs_diff_eq!(bounds.longitude_span(), 360.);
        assert!(bounds.contains_point(&point(89.95, -170.)));

        let pole = point(90., 0.);
        let bounds = Bounds2D::from_point_radius(&Ellipsoid::WGS84, &pole, 0.).unwrap();
        assert_abs_diff_eq!(bounds.longitude_span(), 360.);
    }

    #[test]
    fn ellipse_bounds() {
        let ellipse = GeodeticEllipse::new(point(0., 0.), 4000., 1000., Angle::ZERO).unwrap();
        let bounds = Bounds2D::from_ellipse(&Ellipsoid::WGS84, &ellipse).unwrap();

        let ns = GeodeticArc::inverse(&Ellipsoid::WGS84, &point(bounds.south().degrees(), 0.), &point(bounds.north().degrees(), 0.))
            .unwrap()
            .distance();
        let ew = GeodeticArc::inverse(&Ellipsoid::WGS84, &point(0., bounds.west().degrees()), &point(0., bounds.east().degrees()))
            .unwrap()
            .distance();
        assert_abs_diff_eq!(ns, 8000., epsilon = 60.);
        assert_abs_diff_eq!(ew, 2000., epsilon = 60.);
    }

    #[test]
    fn three_dimensional_bounds() {
        let low = GeodeticPoint3D::from_degrees(0., 0., 100.).unwrap();
        let high = GeodeticPoint3D::from_degrees(10., 10., -50.).unwrap();
        let mut bounds = Bounds3D::from_corners(&low, &high);
        assert_eq!(bounds.min_elevation(), -50.);
        assert_eq!(bounds.max_elevation(), 100.);
        assert_abs_diff_eq!(bounds.center().elevation(), 25.);

        let above = GeodeticPoint3D::from_degrees(5., 5., 200.).unwrap();
        assert!(!bounds.contains_point(&above));
        bounds.include_point(&above).unwrap();
        assert!(bounds.contains_point(&above));
        assert_eq!(bounds.max_elevation(), 200.);

        let flat = Bounds3D::from_bounds(*bounds.area(), 0., 0.);
        assert!(bounds.contains_bounds(&flat));
        let deep = Bounds3D::from_bounds(*bounds.area(), -100., 0.);
        assert!(!bounds.contains_bounds(&deep));
        assert_ne!(flat, deep);

        assert_eq!(bounds.to_string(), format!("{} .. (-50m, 200m)", bounds.area()));
    }

    #[test]
    fn read_only_view_rejects_mutation() {
        let bounds = Bounds3D::from_point(&GeodeticPoint3D::default());
        let mut frozen = ReadOnlyBounds::from(bounds);
        let lat = Latitude::from_degrees(1.).unwrap();
        let lon = Longitude::from_degrees(1.).unwrap();

        assert_eq!(frozen.include_point(&GeodeticPoint3D::default()), Err(Error::ReadOnly("include a point")));
        assert!(frozen.include_bounds(&bounds).is_err());
        assert!(frozen.set_west(lon).is_err());
        assert!(frozen.set_east(lon).is_err());
        assert!(frozen.set_south(lat).is_err());
        assert!(frozen.set_north(lat).is_err());

        assert_eq!(frozen.center(), bounds.center());
        assert!(frozen.contains_bounds(&bounds));
        let wider = Bounds3D::from_bounds(*bounds.area(), -10., 10.);
        assert!(!frozen.contains_bounds(&wider));
        assert!(ReadOnlyBounds::new(wider).contains_bounds(&bounds));
        assert_eq!(frozen.into_inner(), bounds);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializing_checks_the_edges() {
        use serde::{
            de::value::{Error as DeError, MapDeserializer},
            Deserialize,
        };

        let fields = |west: f64, south: f64, north: f64| {
            MapDeserializer::<_, DeError>::new([("west", west), ("east", 20.), ("south", south), ("north", north)].into_iter())
        };

        let bounds = Bounds2D::deserialize(fields(-180., -5., 5.)).unwrap();
        assert_abs_diff_eq!(bounds.longitude_span(), 200., epsilon = 1e-12);
        assert!(Bounds2D::deserialize(fields(10., 5., -5.)).is_err());
        assert!(Bounds2D::deserialize(fields(10., -95., 5.)).is_err());
        assert!(Bounds2D::deserialize(fields(f64::NAN, -5., 5.)).is_err());
    }
}
