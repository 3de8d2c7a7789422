//! Geodetic coordinate kernel.
//!
//! Positions on a reference [`Ellipsoid`], the direct and inverse geodesic
//! problems ([`GeodeticArc`]), conversions to and from projected grids
//! ([`Utm`], [`Ups`], [`Mgrs`], topocentric frames), antimeridian-aware
//! bounding regions ([`Bounds2D`], [`Bounds3D`]) and a tolerant parser for
//! human-entered latitude/longitude text.
//!
//! ```
//! use geodesy::{GeodeticPoint2D, Mgrs};
//!
//! let point: GeodeticPoint2D = "38.889097N 77.035000W".parse().unwrap();
//! let mgrs = Mgrs::from_point(&point, 5).unwrap();
//!
//! assert_eq!(mgrs.to_string(), "18SUJ 23503 06437");
//! ```

#![warn(clippy::pedantic)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::module_name_repetitions
)]

use thiserror::Error;

pub mod angle;
pub mod bounds;
pub mod ellipse;
pub mod ellipsoid;
pub mod frame;
pub mod geodesic;
pub mod parse;

pub mod coords {
    pub mod ecef;
    pub mod mgrs;
    pub mod point;
    pub mod topocentric;
    pub mod ups;
    pub mod utm;
    pub mod utm_ups;
}

pub mod projections {
    pub mod transverse_mercator;
    pub mod polar_stereographic;
}

pub(crate) mod constants;
pub(crate) mod utility;

pub use angle::{Angle, DmsFormat, DmsSymbols, Hemisphere, Latitude, Longitude};
pub use bounds::{Bounds2D, Bounds3D, BoundsMut, GeodeticBounds, ReadOnlyBounds};
pub use coords::{
    ecef::EcefPoint,
    mgrs::Mgrs,
    point::{GeodeticPoint2D, GeodeticPoint3D},
    topocentric::{Topocentric2DPoint, Topocentric3DPoint, TopocentricFrame},
    ups::Ups,
    utm::Utm,
    utm_ups::UtmUps,
};
pub use ellipse::GeodeticEllipse;
pub use ellipsoid::Ellipsoid;
pub use frame::FrameOfReference;
pub use geodesic::GeodeticArc;

/// Broad classification of an [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A value violated a domain, ordering or syntax constraint.
    InvalidArgument,
    /// A mutation was attempted through a read-only view.
    UnsupportedOperation,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("Coordinate parameters are not valid: {0}")]
    InvalidCoord(String),
    #[error("Angle is not valid: {0}")]
    InvalidAngle(String),
    #[error("UTM coords are invalid: {0}")]
    InvalidUtm(String),
    #[error("UPS coords are invalid: {0}")]
    InvalidUps(String),
    #[error("MGRS String is invalid: {0}")]
    InvalidMgrs(String),
    #[error("Zone number {0} is not a UTM zone in [1, 60] or 0 for UPS")]
    InvalidZone(i32),
    #[error("Hemisphere '{0}' is not one of 'N' or 'S'")]
    InvalidHemisphere(char),
    #[error("Unknown ellipsoid: {0}")]
    InvalidEllipsoid(String),
    #[error("Bounds are invalid: {0}")]
    InvalidBounds(String),
    #[error("Ellipse is invalid: {0}")]
    InvalidEllipse(String),
    #[error("Distance {0} m is not a finite, non-negative value")]
    InvalidDistance(f64),
    #[error("Could not parse '{input}': {msg}")]
    Parse { input: String, msg: String },
    #[error("Geodesic failed to converge after {iterations} iterations")]
    NonConvergent { iterations: usize },
    #[error("Coordinate type {coord_type} not valid for conversion to {dest_type}: {msg}")]
    InvalidRange {
        coord_type: String,
        dest_type: String,
        msg: String,
    },
    #[error("Bounds are read-only, cannot {0}")]
    ReadOnly(&'static str),
}

impl Error {
    /// Classifies the error as invalid-argument or unsupported-operation.
    ///
    /// ```
    /// use geodesy::{Error, ErrorKind};
    ///
    /// assert_eq!(Error::InvalidHemisphere('X').kind(), ErrorKind::InvalidArgument);
    /// assert_eq!(Error::ReadOnly("include").kind(), ErrorKind::UnsupportedOperation);
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ReadOnly(_) => ErrorKind::UnsupportedOperation,
            _ => ErrorKind::InvalidArgument,
        }
    }

    pub(crate) fn parse(input: &str, msg: impl Into<String>) -> Error {
        Error::Parse {
            input: input.to_string(),
            msg: msg.into(),
        }
    }
}

/// Types that can be read from their textual form.
pub trait ParseCoord {
    /// # Errors
    ///
    /// Returns an [`ErrorKind::InvalidArgument`] error when `value` is malformed.
    fn parse_coord(value: &str) -> Result<Self, Error>
    where Self: Sized;
}

/// Parses any [`ParseCoord`] type.
///
/// ```
/// use geodesy::{Latitude, Mgrs};
///
/// let lat: Latitude = geodesy::from_str("38 53 20.76 N").unwrap();
/// assert!((lat.degrees() - 38.8891).abs() < 1e-9);
///
/// let mgrs: Mgrs = geodesy::from_str("ZGG 79028 63771").unwrap();
/// assert_eq!(mgrs.zone(), 0);
/// ```
///
/// # Errors
///
/// Propagates the error of the target type's parser.
pub fn from_str<S, T>(value: S) -> Result<T, Error>
where
    S: AsRef<str>,
    T: ParseCoord
{
    T::parse_coord(value.as_ref())
}

trait ThisOrThat {
    fn ternary<T>(&self, r#true: T, r#false: T) -> T;
    fn ternary_lazy<F, E, T>(&self, r#true: F, r#false: E) -> T
    where
        F: Fn() -> T,
        E: Fn() -> T;
}

impl ThisOrThat for bool {
    fn ternary<T>(&self, r#true: T, r#false: T) -> T {
        if *self { r#true } else { r#false }
    }

    fn ternary_lazy<F, E, T>(&self, r#true: F, r#false: E) -> T
    where
        F: Fn() -> T,
        E: Fn() -> T,
    {
        if *self { r#true() } else { r#false() }
    }
}
