//! Coordinate types and the projection seam.
//!
//! The graph and its spatial index live in a **planar** (projected) system
//! where Euclidean distance approximates ground length.  Geodetic
//! longitude/latitude only appears at the boundary: address files, node
//! lookups by lat/lon, and route geometry handed back for display.  A
//! [`Projection`] converts between the two.

use crate::{CoreError, CoreResult};

// ── PlanarPoint ───────────────────────────────────────────────────────────────

/// A point in the projected coordinate system, in metres.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(self, other: PlanarPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::fmt::Display for PlanarPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

// ── GeoPoint ──────────────────────────────────────────────────────────────────

/// A geodetic coordinate in decimal degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Build a point from user input, rejecting NaN/inf and out-of-range
    /// degrees.
    pub fn checked(lon: f64, lat: f64) -> CoreResult<Self> {
        let p = Self { lon, lat };
        p.validate()?;
        Ok(p)
    }

    pub fn validate(&self) -> CoreResult<()> {
        if !self.lon.is_finite() || !self.lat.is_finite() {
            return Err(CoreError::InvalidCoordinate(format!(
                "non-finite coordinate lon={} lat={}",
                self.lon, self.lat
            )));
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(CoreError::InvalidCoordinate(format!(
                "latitude {} outside [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(CoreError::InvalidCoordinate(format!(
                "longitude {} outside [-180, 180]",
                self.lon
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lon, self.lat)
    }
}

// ── Projection ────────────────────────────────────────────────────────────────

/// Bidirectional conversion between geodetic and planar coordinates.
///
/// Implementations must be `Send + Sync` so a single instance can serve all
/// concurrent queries.
pub trait Projection: Send + Sync {
    fn to_planar(&self, p: GeoPoint) -> PlanarPoint;
    fn to_geodetic(&self, p: PlanarPoint) -> GeoPoint;

    /// Check an input point before [`to_planar`](Self::to_planar).
    ///
    /// The default enforces geodetic degree ranges.
    fn validate_input(&self, p: GeoPoint) -> CoreResult<()> {
        p.validate()
    }
}

/// Pass-through projection: `lon → x`, `lat → y`.
///
/// For data sets that are already planar on both sides, and for tests.
#[derive(Copy, Clone, Debug, Default)]
pub struct Identity;

impl Projection for Identity {
    #[inline]
    fn to_planar(&self, p: GeoPoint) -> PlanarPoint {
        PlanarPoint::new(p.lon, p.lat)
    }

    #[inline]
    fn to_geodetic(&self, p: PlanarPoint) -> GeoPoint {
        GeoPoint::new(p.x, p.y)
    }

    /// Input is already planar, so only finiteness is required.
    fn validate_input(&self, p: GeoPoint) -> CoreResult<()> {
        if p.lon.is_finite() && p.lat.is_finite() {
            Ok(())
        } else {
            Err(CoreError::InvalidCoordinate(format!(
                "non-finite coordinate x={} y={}",
                p.lon, p.lat
            )))
        }
    }
}

/// Ellipsoidal Transverse Mercator (series form, USGS PP 1395 §8).
///
/// Accurate to well below a millimetre within a few degrees of the central
/// meridian, which covers every MTM/UTM zone.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransverseMercator {
    /// Semi-major axis in metres.
    pub semi_major: f64,
    /// Inverse flattening.
    pub inv_flattening: f64,
    /// Central meridian, degrees.
    pub lon0: f64,
    /// Latitude of origin, degrees.
    pub lat0: f64,
    /// Scale factor on the central meridian.
    pub k0: f64,
    pub false_easting: f64,
    pub false_northing: f64,
}

impl TransverseMercator {
    /// GRS80 semi-major axis (NAD83).
    pub const GRS80_A: f64 = 6_378_137.0;
    /// GRS80 inverse flattening (NAD83).
    pub const GRS80_INV_F: f64 = 298.257_222_101;

    /// EPSG:32187 — NAD83 / MTM zone 7 (Québec City and surroundings).
    pub fn mtm_zone7() -> Self {
        Self {
            semi_major:     Self::GRS80_A,
            inv_flattening: Self::GRS80_INV_F,
            lon0:           -70.5,
            lat0:           0.0,
            k0:             0.9999,
            false_easting:  304_800.0,
            false_northing: 0.0,
        }
    }

    /// Reject parameters that would make the series diverge or divide by zero.
    pub fn validate(&self) -> CoreResult<()> {
        let ok = self.semi_major.is_finite()
            && self.semi_major > 0.0
            && self.inv_flattening.is_finite()
            && self.inv_flattening > 1.0
            && self.k0.is_finite()
            && self.k0 > 0.0
            && self.lon0.is_finite()
            && self.lat0.is_finite()
            && self.false_easting.is_finite()
            && self.false_northing.is_finite();
        if ok {
            Ok(())
        } else {
            Err(CoreError::Config(format!("invalid transverse mercator parameters: {self:?}")))
        }
    }

    #[inline]
    fn e2(&self) -> f64 {
        let f = 1.0 / self.inv_flattening;
        2.0 * f - f * f
    }

    /// Meridional arc length from the equator to `phi` (radians).
    fn meridian_arc(&self, phi: f64) -> f64 {
        let e2 = self.e2();
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        self.semi_major
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
    }
}

impl Default for TransverseMercator {
    fn default() -> Self {
        Self::mtm_zone7()
    }
}

impl Projection for TransverseMercator {
    fn to_planar(&self, p: GeoPoint) -> PlanarPoint {
        let e2 = self.e2();
        let ep2 = e2 / (1.0 - e2);
        let phi = p.lat.to_radians();
        let dlam = (p.lon - self.lon0).to_radians();

        let (sin_phi, cos_phi) = phi.sin_cos();
        let tan_phi = phi.tan();
        let n = self.semi_major / (1.0 - e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = ep2 * cos_phi * cos_phi;
        let a = dlam * cos_phi;
        let m = self.meridian_arc(phi);
        let m0 = self.meridian_arc(self.lat0.to_radians());

        let a2 = a * a;
        let a3 = a2 * a;
        let a4 = a3 * a;
        let a5 = a4 * a;
        let a6 = a5 * a;

        let x = self.false_easting
            + self.k0
                * n
                * (a + (1.0 - t + c) * a3 / 6.0
                    + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * a5 / 120.0);
        let y = self.false_northing
            + self.k0
                * (m - m0
                    + n * tan_phi
                        * (a2 / 2.0
                            + (5.0 - t + 9.0 * c + 4.0 * c * c) * a4 / 24.0
                            + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * a6 / 720.0));
        PlanarPoint::new(x, y)
    }

    fn to_geodetic(&self, p: PlanarPoint) -> GeoPoint {
        let e2 = self.e2();
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let ep2 = e2 / (1.0 - e2);

        let m = self.meridian_arc(self.lat0.to_radians()) + (p.y - self.false_northing) / self.k0;
        let mu = m / (self.semi_major * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
        let sq = (1.0 - e2).sqrt();
        let e1 = (1.0 - sq) / (1.0 + sq);
        let phi1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let (sin1, cos1) = phi1.sin_cos();
        let tan1 = phi1.tan();
        let c1 = ep2 * cos1 * cos1;
        let t1 = tan1 * tan1;
        let w = 1.0 - e2 * sin1 * sin1;
        let n1 = self.semi_major / w.sqrt();
        let r1 = self.semi_major * (1.0 - e2) / w.powf(1.5);
        let d = (p.x - self.false_easting) / (n1 * self.k0);

        let d2 = d * d;
        let d3 = d2 * d;
        let d4 = d3 * d;
        let d5 = d4 * d;
        let d6 = d5 * d;

        let phi = phi1
            - (n1 * tan1 / r1)
                * (d2 / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d4 / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2
                        - 3.0 * c1 * c1)
                        * d6
                        / 720.0);
        let lam = (d - (1.0 + 2.0 * t1 + c1) * d3 / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d5
                / 120.0)
            / cos1;

        GeoPoint::new(self.lon0 + lam.to_degrees(), phi.to_degrees())
    }
}

impl<P: Projection + ?Sized> Projection for &P {
    fn to_planar(&self, p: GeoPoint) -> PlanarPoint {
        (**self).to_planar(p)
    }

    fn to_geodetic(&self, p: PlanarPoint) -> GeoPoint {
        (**self).to_geodetic(p)
    }
    fn validate_input(&self, p: GeoPoint) -> CoreResult<()> {
        (**self).validate_input(p)
    }
}

impl<P: Projection + ?Sized> Projection for Box<P> {
    fn to_planar(&self, p: GeoPoint) -> PlanarPoint {
        (**self).to_planar(p)
    }

    fn to_geodetic(&self, p: PlanarPoint) -> GeoPoint {
        (**self).to_geodetic(p)
    }
    fn validate_input(&self, p: GeoPoint) -> CoreResult<()> {
        (**self).validate_input(p)
    }
}
