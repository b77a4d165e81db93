//! # Number handling
//!
//! All values in a tableau are floating point numbers. Every equality, sign and integrality test
//! in the crate goes through the helpers in this module, which compare with a fixed absolute
//! tolerance rather than with exact equality.
use num_traits::{Float, NumCast};

/// Absolute tolerance used for every equality, sign and integrality test.
///
/// This value is not scaled to the magnitude of the problem.
pub const EPSILON: f64 = 1e-6;

/// Comparisons of floating point values with the absolute tolerance `EPSILON`.
///
/// Automatically implemented for all types implementing `Float`.
pub trait Approximate: Float {
    /// The tolerance, converted to `Self`.
    fn tolerance() -> Self {
        <Self as NumCast>::from(EPSILON).unwrap_or_else(Self::epsilon)
    }

    /// Whether the value is within tolerance of zero.
    fn is_negligible(self) -> bool {
        self.abs() <= Self::tolerance()
    }

    /// Whether the value is larger than zero by more than the tolerance.
    fn is_strictly_positive(self) -> bool {
        self > Self::tolerance()
    }

    /// Whether the value is smaller than zero by more than the tolerance.
    fn is_strictly_negative(self) -> bool {
        self < -Self::tolerance()
    }

    /// Whether two values are within tolerance of each other.
    fn approx_eq(self, other: Self) -> bool {
        (self - other).is_negligible()
    }

    /// Whether the value is within tolerance of an integer.
    fn is_integral(self) -> bool {
        (self - self.round()).is_negligible()
    }

    /// Largest integer not larger than the value.
    ///
    /// Values within tolerance of an integer are rounded to that integer first, such that
    /// `2.9999999` has floor `3` rather than `2`.
    fn tolerant_floor(self) -> Self {
        if self.is_integral() { self.round() } else { self.floor() }
    }

    /// Smallest integer not smaller than the value, see `tolerant_floor`.
    fn tolerant_ceil(self) -> Self {
        if self.is_integral() { self.round() } else { self.ceil() }
    }
}

impl<F: Float> Approximate for F {}
