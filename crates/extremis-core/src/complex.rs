//! Complex number types and their reduction order
//!
//! Complex values are compared lexicographically on `(re, im)`. A value with
//! a NaN in either component poisons its reduction group: once poisoning
//! values are present, the result is built component-wise from them alone.
//! A component of the result is NaN when any poisoning value has a NaN there
//! and otherwise reduces numerically.

use crate::ordering::{nan_max, nan_min};
use num_traits::Float;
use std::cmp::Ordering;

pub use num_complex::Complex;

/// 32-bit complex number (f32 real and imaginary parts)
pub type Complex32 = Complex<f32>;

/// 64-bit complex number (f64 real and imaginary parts)
pub type Complex64 = Complex<f64>;

/// True when either component is NaN
pub fn is_poisoned<F: Float>(z: &Complex<F>) -> bool {
    z.re.is_nan() || z.im.is_nan()
}

/// Replace NaN components with the canonical NaN of `F`
pub fn canonicalize<F: Float>(z: Complex<F>) -> Complex<F> {
    let fix = |v: F| if v.is_nan() { F::nan() } else { v };
    Complex::new(fix(z.re), fix(z.im))
}

/// Minimum of two complex values under the poisoning lexicographic order
pub fn complex_min<F: Float>(a: Complex<F>, b: Complex<F>) -> Complex<F> {
    extreme(a, b, Ordering::Less, nan_min)
}

/// Maximum of two complex values under the poisoning lexicographic order
pub fn complex_max<F: Float>(a: Complex<F>, b: Complex<F>) -> Complex<F> {
    extreme(a, b, Ordering::Greater, nan_max)
}

fn extreme<F: Float>(
    a: Complex<F>,
    b: Complex<F>,
    wanted: Ordering,
    component: fn(F, F) -> F,
) -> Complex<F> {
    match (is_poisoned(&a), is_poisoned(&b)) {
        (false, false) => {
            // Equal real parts: the winner is decided by the imaginary parts
            // alone, and both components resolve signed zeros the same way.
            if a.re.partial_cmp(&b.re) == Some(wanted) {
                a
            } else if b.re.partial_cmp(&a.re) == Some(wanted) {
                b
            } else {
                Complex::new(component(a.re, b.re), component(a.im, b.im))
            }
        }
        (true, false) => canonicalize(a),
        (false, true) => canonicalize(b),
        (true, true) => Complex::new(component(a.re, b.re), component(a.im, b.im)),
    }
}
