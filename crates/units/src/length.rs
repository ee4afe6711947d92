use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

pub const MICRON_TO_M: f64 = 1e-6;
pub const KM_TO_M: f64 = 1e3;
pub const AU_TO_M: f64 = 1.495_978_707e11;

/// Mean radius of Mars (m).
pub const MARS_RADIUS_M: f64 = 3.3895e6;

/// A physical length using f64 precision.
///
/// Base unit is the metre. Grain sizes are usually given in microns and
/// orbital radii in planetary radii; both convert through this type.
///
/// # Examples
///
/// ```rust
/// use units::Length;
///
/// let grain = Length::from_microns(1.5);
/// let orbit = Length::from_mars_radii(2.0);
///
/// assert!(grain.to_meters() < orbit.to_meters());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Length(f64); // Base unit: m

impl Length {
    /// Creates a zero length value
    pub fn zero() -> Self {
        Self(0.0)
    }

    /// Creates a new `Length` from a value in metres.
    pub fn from_meters(value: f64) -> Self {
        Self(value)
    }

    /// Creates a new `Length` from a value in microns.
    pub fn from_microns(value: f64) -> Self {
        Self(value * MICRON_TO_M)
    }

    /// Creates a new `Length` from a value in kilometres.
    pub fn from_km(value: f64) -> Self {
        Self(value * KM_TO_M)
    }

    /// Creates a new `Length` from a value in astronomical units.
    pub fn from_au(value: f64) -> Self {
        Self(value * AU_TO_M)
    }

    /// Creates a new `Length` from a value in Mars radii.
    pub fn from_mars_radii(value: f64) -> Self {
        Self(value * MARS_RADIUS_M)
    }

    pub fn to_meters(&self) -> f64 {
        self.0
    }

    pub fn to_microns(&self) -> f64 {
        self.0 / MICRON_TO_M
    }

    pub fn to_km(&self) -> f64 {
        self.0 / KM_TO_M
    }

    pub fn to_au(&self) -> f64 {
        self.0 / AU_TO_M
    }

    pub fn to_mars_radii(&self) -> f64 {
        self.0 / MARS_RADIUS_M
    }

    /// Area of the annulus between `self` and `outer` (m²).
    ///
    /// Returns zero when `outer` is not beyond `self`.
    pub fn annulus_area(&self, outer: Length) -> f64 {
        if outer.0 <= self.0 {
            return 0.0;
        }
        std::f64::consts::PI * (outer.0 * outer.0 - self.0 * self.0)
    }
}

impl Add for Length {
    type Output = Length;

    fn add(self, rhs: Length) -> Length {
        Length(self.0 + rhs.0)
    }
}

impl Sub for Length {
    type Output = Length;

    fn sub(self, rhs: Length) -> Length {
        Length(self.0 - rhs.0)
    }
}

impl Mul<f64> for Length {
    type Output = Length;

    fn mul(self, rhs: f64) -> Length {
        Length(self.0 * rhs)
    }
}

impl Div<f64> for Length {
    type Output = Length;

    fn div(self, rhs: f64) -> Length {
        Length(self.0 / rhs)
    }
}

impl Div<Length> for Length {
    type Output = f64;

    fn div(self, rhs: Length) -> f64 {
        self.0 / rhs.0
    }
}
