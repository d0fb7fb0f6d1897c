// crates/reel-core/src/time.rs
//
// Rational time: an integer-valued numerator over a positive integer rate.
// Equality is exact — two `RationalTime`s are equal only when both the value
// and the rate match. Ordering compares the times they actually represent
// (cross-multiplied, no float), so a `BTreeSet`/`sort` built on `RationalTime`
// can disagree with `==` at differing rates. That's intentional: spec
// requires exact equality, but ordering across rates still has to mean
// something.

use std::cmp::Ordering;
use std::ops::{Add, Sub};

/// A point in time expressed as an integer count of `rate`-sized ticks.
#[derive(Clone, Copy, Debug)]
pub struct RationalTime {
    pub value: i64,
    pub rate:  u32,
}

impl RationalTime {
    pub fn new(value: i64, rate: u32) -> Self {
        assert!(rate > 0, "RationalTime rate must be positive, got {rate}");
        Self { value, rate }
    }

    pub fn zero(rate: u32) -> Self {
        Self::new(0, rate)
    }

    pub fn to_seconds(&self) -> f64 {
        self.value as f64 / self.rate as f64
    }

    /// Build a `RationalTime` from a seconds value, flooring to the nearest
    /// whole tick at `rate`.
    pub fn from_seconds(seconds: f64, rate: u32) -> Self {
        Self::new((seconds * rate as f64).floor() as i64, rate)
    }

    /// Rescale to `target_rate`, flooring to the target grid.
    ///
    /// `rescaled_to(rescaled_to(x, r), x.rate)` can differ from `x` by up to
    /// one tick at `x.rate` — flooring on the way down and back up loses the
    /// fractional remainder.
    pub fn rescaled_to(&self, target_rate: u32) -> Self {
        if target_rate == self.rate {
            return *self;
        }
        let rescaled = self.value as f64 * target_rate as f64 / self.rate as f64;
        Self::new(rescaled.floor() as i64, target_rate)
    }

    /// One tick at this time's rate — the smallest representable step.
    pub fn one_tick(rate: u32) -> Self {
        Self::new(1, rate)
    }

    /// Compare the actual moments in time represented by `self` and `other`,
    /// independent of rate, via cross-multiplication (no float, no overflow
    /// for any realistic rate/value pair — both operands are widened to i128).
    pub fn compare_to(&self, other: &Self) -> Ordering {
        let lhs = self.value as i128 * other.rate as i128;
        let rhs = other.value as i128 * self.rate as i128;
        lhs.cmp(&rhs)
    }

    /// `self`, rescaled to `other.rate` if needed, added to `other`.
    pub fn add_rescaled(&self, other: Self) -> Self {
        let a = self.rescaled_to(other.rate);
        Self::new(a.value + other.value, other.rate)
    }

    /// `self`, rescaled to `other.rate` if needed, minus `other`.
    pub fn sub_rescaled(&self, other: Self) -> Self {
        let a = self.rescaled_to(other.rate);
        Self::new(a.value - other.value, other.rate)
    }
}

impl PartialEq for RationalTime {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.rate == other.rate
    }
}
impl Eq for RationalTime {}

impl PartialOrd for RationalTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare_to(other))
    }
}

impl Add for RationalTime {
    type Output = RationalTime;
    fn add(self, rhs: Self) -> Self::Output {
        self.add_rescaled(rhs)
    }
}

impl Sub for RationalTime {
    type Output = RationalTime;
    fn sub(self, rhs: Self) -> Self::Output {
        self.sub_rescaled(rhs)
    }
}

/// `[startInclusive, startInclusive + duration)` — half-open for intersection,
/// but `end_inclusive()` reports the last representable tick (spec §4.3/§4.4).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeRange {
    pub start:    RationalTime,
    pub duration: RationalTime,
}

impl TimeRange {
    pub fn new(start: RationalTime, duration: RationalTime) -> Self {
        Self { start, duration }
    }

    /// `start + duration − 1 tick`, at `start`'s rate.
    pub fn end_inclusive(&self) -> RationalTime {
        let dur_at_start_rate = self.duration.rescaled_to(self.start.rate);
        self.start + dur_at_start_rate - RationalTime::one_tick(self.start.rate)
    }

    /// Exclusive end: `start + duration`.
    pub fn end_exclusive(&self) -> RationalTime {
        self.start + self.duration
    }

    /// Half-open containment: `start <= t < start + duration`.
    pub fn contains(&self, t: RationalTime) -> bool {
        t.compare_to(&self.start) != Ordering::Less
            && t.compare_to(&self.end_exclusive()) == Ordering::Less
    }

    /// Half-open range intersection.
    pub fn intersects(&self, other: &Self) -> bool {
        self.start.compare_to(&other.end_exclusive()) == Ordering::Less
            && other.start.compare_to(&self.end_exclusive()) == Ordering::Less
    }
}

/// `offset + scale * t`. Composition `A.compose(B)` yields "A applied after
/// B": `{ offset: A.offset + A.scale * B.offset, scale: A.scale * B.scale }`.
///
/// Internally composed and applied in seconds — `scale` is already a lossy
/// `f64` per spec.md §4.3/§4.4 ("compose all per-clip time warps ... floor to
/// the frame grid"), so there is no exactness to preserve here before the
/// final floor onto the output rate.
#[derive(Clone, Copy, Debug)]
pub struct TimeTransform {
    pub offset: RationalTime,
    pub scale:  f64,
}

impl TimeTransform {
    pub fn identity(rate: u32) -> Self {
        Self { offset: RationalTime::zero(rate), scale: 1.0 }
    }

    /// `self` applied after `other`.
    pub fn compose(&self, other: &Self) -> Self {
        let combined_offset_secs =
            self.offset.to_seconds() + self.scale * other.offset.to_seconds();
        Self {
            offset: RationalTime::from_seconds(combined_offset_secs, self.offset.rate),
            scale:  self.scale * other.scale,
        }
    }

    /// Apply to `t`, returning a result at `t`'s rate.
    pub fn apply(&self, t: RationalTime) -> RationalTime {
        let result_secs = self.offset.to_seconds() + self.scale * t.to_seconds();
        RationalTime::from_seconds(result_secs, t.rate)
    }
}
