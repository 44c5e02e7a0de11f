use crate::util::range::NumRange;
use std::ops::RangeInclusive;

/// Slack for deciding whether an angular range covers a whole turn
const FULL_TURN_EPSILON: f64 = 1.0e-9;

/// An angular extent measured in divisions of a full turn (sectors, hex
/// sextants, meridians). `from` is clamped into `[0, divisions]` and `to` into
/// `[0, from + divisions]`, so `2 → 8` out of 6 is a full turn starting at 2.
/// If `to` is less than `from`, the range wraps through zero, so `5 → 1` out
/// of 6 covers two divisions. Equal bounds give an empty span.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CircularRange {
    from: f64,
    span: f64,
    divisions: f64,
}

impl CircularRange {
    pub fn new(from: f64, to: f64, divisions: f64) -> Self {
        let from = from.clamp(0.0, divisions);
        let to = to.clamp(0.0, from + divisions);
        let span = if to >= from {
            to - from
        } else {
            to + divisions - from
        };
        Self {
            from,
            span,
            divisions,
        }
    }

    pub fn from(&self) -> f64 {
        self.from
    }

    /// End of the range. May exceed `divisions` when the range wraps.
    pub fn to(&self) -> f64 {
        self.from + self.span
    }

    pub fn span(&self) -> f64 {
        self.span
    }

    /// Does this range go all the way around?
    pub fn is_full(&self) -> bool {
        (self.span - self.divisions).abs() <= FULL_TURN_EPSILON
    }

    /// Position at fraction `t` of the way through the range
    pub fn lerp(&self, t: f64) -> f64 {
        self.from + self.span * t
    }

    /// Whole division indices inside the range, in order. On a full turn
    /// that starts on a whole index, the first and last index are the same
    /// direction, so the last one is dropped. Indices are not wrapped, so a
    /// wrapping range yields values past `divisions`.
    pub fn steps(&self) -> RangeInclusive<i64> {
        let steps = NumRange::new(self.from, self.to()).integers();
        let (first, last) = (*steps.start(), *steps.end());
        if self.is_full()
            && first <= last
            && (last - first) as f64 == self.divisions
        {
            first..=(last - 1)
        } else {
            steps
        }
    }

    pub fn step_count(&self) -> usize {
        let steps = self.steps();
        if steps.is_empty() {
            0
        } else {
            (steps.end() - steps.start() + 1) as usize
        }
    }

    /// Number of straight segments needed to draw this range as an arc,
    /// with `smoothness` segments per division
    pub fn segments(&self, smoothness: u32) -> usize {
        subdivisions(self.span, smoothness)
    }
}

/// Number of straight segments for a curve covering `span` divisions, with
/// `smoothness` segments per division. Rounds up, so a partial division
/// still gets a segment.
pub(crate) fn subdivisions(span: f64, smoothness: u32) -> usize {
    if span <= 0.0 {
        0
    } else {
        (span * f64::from(smoothness) - FULL_TURN_EPSILON).ceil() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_range() {
        let range = CircularRange::new(1.0, 3.0, 6.0);
        assert_eq!(range.span(), 2.0);
        assert!(!range.is_full());
        assert_eq!(range.steps(), 1..=3);
        assert_eq!(range.segments(4), 8);
    }

    #[test]
    fn test_wrapping_range() {
        let range = CircularRange::new(5.0, 1.0, 6.0);
        assert_eq!(range.span(), 2.0);
        assert_eq!(range.steps(), 5..=7);
        assert_eq!(range.step_count(), 3);
    }

    #[test]
    fn test_full_range_drops_seam() {
        let range = CircularRange::new(0.0, 6.0, 6.0);
        assert!(range.is_full());
        assert_eq!(range.step_count(), 6);
        assert_eq!(range.segments(1), 6);
    }

    #[test]
    fn test_empty_range() {
        let range = CircularRange::new(2.0, 2.0, 6.0);
        assert_eq!(range.span(), 0.0);
        assert_eq!(range.step_count(), 1);
        assert_eq!(range.segments(8), 0);
    }

    #[test]
    fn test_full_turn_from_offset() {
        let range = CircularRange::new(2.0, 10.0, 8.0);
        assert_eq!(range.span(), 8.0);
        assert!(range.is_full());
        assert_eq!(range.steps(), 2..=9);
        assert_eq!(range.step_count(), 8);

        // Anything past a whole turn is cut back to one
        let range = CircularRange::new(3.0, 20.0, 8.0);
        assert_eq!(range.to(), 11.0);
        assert!(range.is_full());
    }

    #[test]
    fn test_clamped_bounds() {
        let range = CircularRange::new(-1.0, 9.0, 6.0);
        assert!(range.is_full());
        assert_eq!(range.from(), 0.0);
    }
}
