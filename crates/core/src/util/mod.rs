pub mod range;

use log::debug;
use nalgebra::Vector3;

/// Smallest value any length-like lattice parameter (spacing, radius, depth)
/// may take. Anything at or below zero is floored to this, so every lattice
/// transform stays invertible.
pub const MIN_EXTENT: f64 = 1.0e-4;

/// Parameter edits that move a value by no more than this are ignored. This
/// keeps float noise from an inspector or an animation curve from throwing
/// away cached transforms and line sets.
pub const CHANGE_EPSILON: f64 = 1.0e-6;

/// A macro to measure the evaluation time of an expression. Wraps an
/// expression, logs how long it took, and evaluates to the value of the
/// expression.
#[macro_export]
macro_rules! timed {
    ($label:expr, $ex:expr) => {
        $crate::timed!($label, log::Level::Debug, $ex)
    };
    ($label:expr, $log_level:expr, $ex:expr) => {{
        let now = std::time::Instant::now();
        let value = $ex;
        let elapsed = now.elapsed();
        log::log!($log_level, "{} took {} µs", $label, elapsed.as_micros());
        value
    }};
}

/// Floor a length-like parameter at [MIN_EXTENT]. NaN is treated as
/// degenerate too.
pub fn clamp_extent(value: f64) -> f64 {
    // Written as a negated comparison so NaN falls into the clamp branch
    if !(value >= MIN_EXTENT) {
        MIN_EXTENT
    } else {
        value
    }
}

/// [clamp_extent], with a log line when the value actually moved
pub fn clamp_logged(name: &str, value: f64) -> f64 {
    let clamped = clamp_extent(value);
    if clamped != value {
        debug!("Clamped {} {} to {}", name, value, clamped);
    }
    clamped
}

/// Component-wise [clamp_extent]
pub fn clamp_extents(value: Vector3<f64>) -> Vector3<f64> {
    value.map(clamp_extent)
}

/// Did a scalar parameter change by more than [CHANGE_EPSILON]?
pub fn differs(old: f64, new: f64) -> bool {
    (old - new).abs() > CHANGE_EPSILON
}

/// Did any component of a vector parameter change by more than
/// [CHANGE_EPSILON]?
pub fn vectors_differ(old: &Vector3<f64>, new: &Vector3<f64>) -> bool {
    old.iter().zip(new.iter()).any(|(a, b)| differs(*a, *b))
}

/// Swap two values if the condition holds. Used all over the shapes to put
/// user-supplied bounds into ascending order.
pub fn swap_if<T>(condition: bool, a: &mut T, b: &mut T) {
    if condition {
        std::mem::swap(a, b);
    }
}

/// The midpoint of the unit interval a value falls in, i.e. `floor + 0.5`.
/// Snapping to cell centers uses this where vertices use plain rounding.
pub fn floor_half(value: f64) -> f64 {
    value.floor() + 0.5
}

/// Parity of the integer nearest to a value. Ties round to even, so the
/// result is deterministic for half-way inputs.
pub fn is_odd(value: f64) -> bool {
    value.round_ties_even().rem_euclid(2.0) == 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_extent() {
        assert_eq!(clamp_extent(2.0), 2.0);
        assert_eq!(clamp_extent(0.0), MIN_EXTENT);
        assert_eq!(clamp_extent(-3.0), MIN_EXTENT);
        assert_eq!(clamp_extent(f64::NAN), MIN_EXTENT);
        assert_eq!(
            clamp_extents(Vector3::new(0.0, -1.0, 2.0)),
            Vector3::new(MIN_EXTENT, MIN_EXTENT, 2.0)
        );
    }

    #[test]
    fn test_differs() {
        assert!(!differs(1.0, 1.0 + CHANGE_EPSILON / 2.0));
        assert!(differs(1.0, 1.001));
        assert!(vectors_differ(
            &Vector3::new(1.0, 1.0, 1.0),
            &Vector3::new(1.0, 1.5, 1.0)
        ));
    }

    #[test]
    fn test_swap_if() {
        let (mut a, mut b) = (3, 1);
        swap_if(a > b, &mut a, &mut b);
        assert_eq!((a, b), (1, 3));
        swap_if(a > b, &mut a, &mut b);
        assert_eq!((a, b), (1, 3));
    }

    #[test]
    fn test_is_odd() {
        assert!(is_odd(1.0));
        assert!(is_odd(-1.0));
        assert!(!is_odd(2.0));
        assert!(!is_odd(2.5)); // ties to even
        assert!(is_odd(3.4));
    }
}
