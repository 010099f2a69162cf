use crate::algebra::FloatT;
use crate::solver::utils::atomic::{AtomicF64, Ordering};
use crate::solver::_INFINITY_DEFAULT;
use lazy_static::lazy_static;
//
lazy_static! {
    static ref INFINITY: AtomicF64 = AtomicF64::new(_INFINITY_DEFAULT);
}

/// Revert internal infinity bound to its default value.
pub fn default_infinity() {
    INFINITY.store(_INFINITY_DEFAULT, Ordering::Relaxed);
}
/// Set the internal infinity bound to a new value.
pub fn set_infinity(v: f64) {
    INFINITY.store(v, Ordering::Relaxed);
}
/// Get the current internal infinity bound.
pub fn get_infinity() -> f64 {
    INFINITY.load(Ordering::Relaxed)
}

// Bounds, objective entries and LP sides at or beyond the internal
// infinity bound are treated as infinite.

pub(crate) fn infinity<T: FloatT>() -> T {
    T::from_f64(get_infinity()).unwrap_or_else(T::max_value)
}

pub(crate) fn is_infinite<T: FloatT>(v: T) -> bool {
    v.abs() >= infinity::<T>()
}

pub(crate) fn is_pos_infinite<T: FloatT>(v: T) -> bool {
    v >= infinity::<T>()
}

pub(crate) fn is_neg_infinite<T: FloatT>(v: T) -> bool {
    v <= -infinity::<T>()
}

#[test]
fn test_infinity_threshold() {
    assert!(is_infinite(1e20_f64));
    assert!(is_neg_infinite(-1e21_f64));
    assert!(!is_pos_infinite(1e19_f64));
    assert!(is_pos_infinite(f64::INFINITY));
    assert_eq!(infinity::<f64>(), get_infinity());
}
