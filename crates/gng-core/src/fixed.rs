// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Q16.16 fixed-point primitives
//!
//! Every value in the engine is an integer: positions are Q16.16 (`Fixed`),
//! learning rates are `numerator / 2^shift` (`LearningRate`) and error scale
//! factors are unsigned Q0.16 (`Fraction`). Conversions and accumulations
//! clamp at the representable bounds instead of wrapping; each helper that
//! can clamp reports whether it did.

use core::fmt;

/// Number of fractional bits in a Q16.16 value
pub const FRAC_BITS: u32 = 16;

/// Raw scale of the Q16.16 format (1.0 == 65536)
pub const SCALE: i64 = 1 << FRAC_BITS;

/// Signed Q16.16 fixed-point scalar
///
/// # Example
/// ```
/// use gng_core::fixed::Fixed;
///
/// assert_eq!(Fixed::from_f64(1.5).raw(), 98304);
/// assert_eq!(Fixed::from_raw(98304).to_f64(), 1.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(transparent))]
pub struct Fixed(i32);

impl Fixed {
    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(1 << FRAC_BITS);
    /// ≈ 32767.99998
    pub const MAX: Fixed = Fixed(i32::MAX);
    /// -32768.0
    pub const MIN: Fixed = Fixed(i32::MIN);

    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Fixed(raw)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Convert a real value, truncating toward zero and saturating at the bounds.
    ///
    /// NaN maps to zero.
    pub fn from_f64(value: f64) -> Self {
        Self::from_f64_checked(value).0
    }

    /// Same as [`Fixed::from_f64`], also returning whether the value was clamped.
    pub fn from_f64_checked(value: f64) -> (Self, bool) {
        if value.is_nan() {
            return (Fixed::ZERO, true);
        }
        let scaled = value * SCALE as f64;
        if scaled >= i32::MAX as f64 {
            (Fixed::MAX, scaled > i32::MAX as f64)
        } else if scaled <= i32::MIN as f64 {
            (Fixed::MIN, scaled < i32::MIN as f64)
        } else {
            (Fixed(scaled as i32), false)
        }
    }

    pub fn from_f32(value: f32) -> Self {
        Self::from_f64(value as f64)
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    pub fn to_f32(self) -> f32 {
        self.to_f64() as f32
    }

    /// Narrow a widened intermediate back into Q16.16.
    ///
    /// Returns the clamped value and `true` if clamping occurred.
    #[inline]
    pub const fn from_wide(wide: i64) -> (Self, bool) {
        if wide > i32::MAX as i64 {
            (Fixed::MAX, true)
        } else if wide < i32::MIN as i64 {
            (Fixed::MIN, true)
        } else {
            (Fixed(wide as i32), false)
        }
    }

    /// Per-axis average of two values (floor), saturated.
    #[inline]
    pub const fn midpoint(self, other: Fixed) -> (Self, bool) {
        Self::from_wide((self.0 as i64 + other.0 as i64) >> 1)
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}", self.to_f64())
    }
}

/// A `D`-dimensional Q16.16 position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point<const D: usize>(pub [Fixed; D]);

/// Reference two-dimensional point
pub type Point2 = Point<2>;

impl<const D: usize> Point<D> {
    pub const ORIGIN: Point<D> = Point([Fixed::ZERO; D]);

    pub const fn new(axes: [Fixed; D]) -> Self {
        Point(axes)
    }

    /// Convert real coordinates; returns the point and whether any axis clamped.
    pub fn from_f64_checked(axes: [f64; D]) -> (Self, bool) {
        let mut out = [Fixed::ZERO; D];
        let mut clamped = false;
        for (slot, value) in out.iter_mut().zip(axes.iter()) {
            let (fixed, hit) = Fixed::from_f64_checked(*value);
            *slot = fixed;
            clamped |= hit;
        }
        (Point(out), clamped)
    }

    pub fn from_f64(axes: [f64; D]) -> Self {
        Self::from_f64_checked(axes).0
    }

    pub fn to_f64(&self) -> [f64; D] {
        let mut out = [0.0; D];
        for (slot, axis) in out.iter_mut().zip(self.0.iter()) {
            *slot = axis.to_f64();
        }
        out
    }

    #[inline]
    pub fn axes(&self) -> &[Fixed; D] {
        &self.0
    }

    /// Axis-wise midpoint, each axis saturated independently.
    pub fn midpoint(&self, other: &Point<D>) -> (Self, bool) {
        let mut out = [Fixed::ZERO; D];
        let mut clamped = false;
        for axis in 0..D {
            let (mid, hit) = self.0[axis].midpoint(other.0[axis]);
            out[axis] = mid;
            clamped |= hit;
        }
        (Point(out), clamped)
    }
}

impl Point<2> {
    pub fn xy(x: f64, y: f64) -> Self {
        Self::from_f64([x, y])
    }
}

impl<const D: usize> Default for Point<D> {
    fn default() -> Self {
        Self::ORIGIN
    }
}

/// Unscaled squared Euclidean distance between two Q16.16 points (Q32.32).
///
/// Each per-axis difference is widened to 64 bits before squaring and the
/// squares are summed in 128 bits, so no pair of representable points can
/// overflow: the worst case is `D · (2^32 − 1)^2`. Ranking uses this value
/// directly; use [`to_error_units`] to rescale for error accounting.
#[inline]
pub fn squared_distance<const D: usize>(a: &Point<D>, b: &Point<D>) -> u128 {
    let mut acc: u128 = 0;
    for axis in 0..D {
        let diff = a.0[axis].0 as i64 - b.0[axis].0 as i64;
        let magnitude = diff.unsigned_abs();
        acc += (magnitude * magnitude) as u128;
    }
    acc
}

/// Rescale a Q32.32 squared distance to Q16.16 error units, saturating at `u32::MAX`.
#[inline]
pub fn to_error_units(squared: u128) -> (u32, bool) {
    let scaled = squared >> FRAC_BITS;
    if scaled > u32::MAX as u128 {
        (u32::MAX, true)
    } else {
        (scaled as u32, false)
    }
}

/// Integer square root (floor) of a 64-bit value
pub fn isqrt_u64(value: u64) -> u64 {
    if value < 2 {
        return value;
    }
    // Newton iteration from an over-estimate converges monotonically downward
    let mut x = 1u64 << ((64 - value.leading_zeros()).div_ceil(2));
    loop {
        let next = (x + value / x) >> 1;
        if next >= x {
            return x;
        }
        x = next;
    }
}

/// Learning rate expressed as `numerator / 2^shift`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LearningRate {
    pub numerator: u32,
    pub shift: u8,
}

impl LearningRate {
    /// Largest supported shift (keeps `diff · numerator` inside 64 bits)
    pub const MAX_SHIFT: u8 = 30;

    pub const fn new(numerator: u32, shift: u8) -> Self {
        Self { numerator, shift }
    }

    /// Truncating conversion from a real fraction
    ///
    /// # Example
    /// ```
    /// use gng_core::fixed::LearningRate;
    ///
    /// let rate = LearningRate::from_fraction(0.5, 16);
    /// assert_eq!(rate.numerator, 32768);
    /// ```
    ///
    /// `shift` is clamped to [`LearningRate::MAX_SHIFT`].
    pub fn from_fraction(fraction: f64, shift: u8) -> Self {
        let shift = shift.min(Self::MAX_SHIFT);
        let scale = (1u64 << shift) as f64;
        let scaled = fraction * scale;
        let numerator = if scaled.is_nan() || scaled <= 0.0 {
            0
        } else if scaled >= u32::MAX as f64 {
            u32::MAX
        } else {
            scaled as u32
        };
        Self { numerator, shift }
    }

    /// A usable rate lies in (0, 1].
    pub fn is_valid(&self) -> bool {
        self.shift <= Self::MAX_SHIFT
            && self.numerator > 0
            && (self.numerator as u64) <= (1u64 << self.shift)
    }

    /// `self < other`, compared exactly across different shifts
    pub fn is_slower_than(&self, other: &LearningRate) -> bool {
        let lhs = (self.numerator as u128) << other.shift;
        let rhs = (other.numerator as u128) << self.shift;
        lhs < rhs
    }

    pub fn to_f64(&self) -> f64 {
        self.numerator as f64 / (1u64 << self.shift) as f64
    }

    /// `((target − current) · numerator) >> shift`, computed in 64 bits
    ///
    /// The shift is arithmetic, so negative steps round toward −∞.
    #[inline]
    pub fn step(&self, current: Fixed, target: Fixed) -> i64 {
        let diff = target.0 as i64 - current.0 as i64;
        (diff * self.numerator as i64) >> self.shift
    }
}

/// Unsigned Q0.16 scale factor in `[0, 1]`, applied as `(v · f) >> 16`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Fraction(u32);

impl Fraction {
    pub const ONE: Fraction = Fraction(1 << FRAC_BITS);
    pub const HALF: Fraction = Fraction(1 << (FRAC_BITS - 1));

    /// Returns `None` when `raw` exceeds 1.0.
    pub const fn from_raw(raw: u32) -> Option<Self> {
        if raw > (1 << FRAC_BITS) {
            None
        } else {
            Some(Fraction(raw))
        }
    }

    /// Truncating conversion; values outside `[0, 1]` are clamped.
    pub fn from_f64(value: f64) -> Self {
        if value.is_nan() || value <= 0.0 {
            Fraction(0)
        } else if value >= 1.0 {
            Self::ONE
        } else {
            Fraction((value * SCALE as f64) as u32)
        }
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / SCALE as f64
    }

    /// Scale an error accumulator. The result never exceeds `value`.
    #[inline]
    pub const fn apply(self, value: u32) -> u32 {
        ((value as u64 * self.0 as u64) >> FRAC_BITS) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_fixed_and_back() {
        assert_eq!(Fixed::from_f64(1.5).raw(), 98304);
        assert_eq!(Fixed::from_raw(98304).to_f64(), 1.5);
        assert_eq!(Fixed::from_f64(-2.25).raw(), -147456);
    }

    #[test]
    fn test_conversion_saturates() {
        let (max, clamped) = Fixed::from_f64_checked(40000.0);
        assert_eq!(max, Fixed::MAX);
        assert!(clamped);

        let (min, clamped) = Fixed::from_f64_checked(-40000.0);
        assert_eq!(min, Fixed::MIN);
        assert!(clamped);

        let (_, clamped) = Fixed::from_f64_checked(32767.5);
        assert!(!clamped);
    }

    #[test]
    fn test_from_wide_saturates() {
        assert_eq!(Fixed::from_wide(i64::MAX), (Fixed::MAX, true));
        assert_eq!(Fixed::from_wide(i64::MIN), (Fixed::MIN, true));
        assert_eq!(Fixed::from_wide(42), (Fixed::from_raw(42), false));
    }

    #[test]
    fn test_squared_distance_basic() {
        let a = Point2::xy(0.0, 0.0);
        let b = Point2::xy(3.0, 4.0);
        let raw = squared_distance(&a, &b);
        // 25.0 in Q32.32
        assert_eq!(raw, 25u128 << 32);
        assert_eq!(to_error_units(raw), (25 << 16, false));
    }

    #[test]
    fn test_squared_distance_extremes_do_not_overflow() {
        let lo = Point2::new([Fixed::MIN, Fixed::MIN]);
        let hi = Point2::new([Fixed::MAX, Fixed::MAX]);
        let per_axis = (u32::MAX as u128) * (u32::MAX as u128);
        assert_eq!(squared_distance(&lo, &hi), 2 * per_axis);
        assert_eq!(squared_distance(&hi, &lo), 2 * per_axis);
        // rescaled error saturates rather than wrapping
        assert_eq!(to_error_units(2 * per_axis), (u32::MAX, true));
    }

    #[test]
    fn test_squared_distance_is_symmetric() {
        let a = Point2::xy(-1.25, 7.5);
        let b = Point2::xy(3.0, -0.125);
        assert_eq!(squared_distance(&a, &b), squared_distance(&b, &a));
        assert_eq!(squared_distance(&a, &a), 0);
    }

    #[test]
    fn test_midpoint() {
        let a = Point2::xy(0.2, 0.2);
        let b = Point2::xy(0.8, 0.8);
        let (mid, clamped) = a.midpoint(&b);
        assert!(!clamped);
        assert!((mid.to_f64()[0] - 0.5).abs() < 1e-4);

        let (extreme, _) = Fixed::MAX.midpoint(Fixed::MAX);
        assert_eq!(extreme, Fixed::MAX);
    }

    #[test]
    fn test_learning_rate_step() {
        let half = LearningRate::new(1, 1);
        assert!(half.is_valid());
        let step = half.step(Fixed::ZERO, Fixed::ONE);
        assert_eq!(step, (1 << 16) / 2);
        // negative steps round toward -inf
        assert_eq!(LearningRate::new(1, 2).step(Fixed::ZERO, Fixed::from_raw(-1)), -1);
    }

    #[test]
    fn test_learning_rate_validation() {
        assert!(!LearningRate::new(0, 16).is_valid());
        assert!(!LearningRate::new(65537, 16).is_valid());
        assert!(LearningRate::new(65536, 16).is_valid());
        assert!(!LearningRate::new(1, 31).is_valid());

        let winner = LearningRate::from_fraction(0.3, 16);
        let neighbor = LearningRate::from_fraction(0.001, 16);
        assert_eq!(winner.numerator, 19660);
        assert_eq!(neighbor.numerator, 65);
        assert!(neighbor.is_slower_than(&winner));
        assert!(!winner.is_slower_than(&neighbor));
        assert!(LearningRate::new(1, 4).is_slower_than(&LearningRate::new(1, 3)));
    }

    #[test]
    fn test_fraction_apply() {
        assert_eq!(Fraction::HALF.apply(1000), 500);
        assert_eq!(Fraction::ONE.apply(u32::MAX), u32::MAX);
        assert_eq!(Fraction::from_f64(0.995).raw(), 65208);
        assert!(Fraction::from_raw(70000).is_none());
    }

    #[test]
    fn test_isqrt() {
        assert_eq!(isqrt_u64(0), 0);
        assert_eq!(isqrt_u64(1), 1);
        assert_eq!(isqrt_u64(15), 3);
        assert_eq!(isqrt_u64(16), 4);
        assert_eq!(isqrt_u64(u64::MAX), u32::MAX as u64);
    }

    #[test]
    fn test_from_fraction_clamps_shift() {
        let rate = LearningRate::from_fraction(0.5, 40);
        assert_eq!(rate.shift, LearningRate::MAX_SHIFT);
        assert_eq!(rate.numerator, 1 << 29);
        assert_eq!(rate.to_f64(), 0.5);
        assert!(rate.is_valid());
    }

    proptest::proptest! {
        #[test]
        fn prop_squared_distance_is_exact(
            ax in proptest::num::i32::ANY, ay in proptest::num::i32::ANY,
            bx in proptest::num::i32::ANY, by in proptest::num::i32::ANY,
        ) {
            let a = Point2::new([Fixed::from_raw(ax), Fixed::from_raw(ay)]);
            let b = Point2::new([Fixed::from_raw(bx), Fixed::from_raw(by)]);
            let dx = ax as i128 - bx as i128;
            let dy = ay as i128 - by as i128;
            let expected = (dx * dx + dy * dy) as u128;

            let d = squared_distance(&a, &b);
            proptest::prop_assert_eq!(d, expected);
            proptest::prop_assert_eq!(d, squared_distance(&b, &a));

            let (units, saturated) = to_error_units(d);
            proptest::prop_assert_eq!(saturated, (expected >> 16) > u32::MAX as u128);
            proptest::prop_assert!(units as u128 <= expected >> 16);
        }
    }
}
