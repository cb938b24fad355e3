//! Numeric comparison helpers.

/// `true` when `a` and `b` differ by less than `tol`.
#[must_use]
pub fn approx_eq(a: f32, b: f32, tol: f32) -> bool {
    (a - b).abs() < tol
}

/// `true` when the elements of `values` add up to `1.0` within `tol`.
#[must_use]
pub fn sums_to_one(values: &[f32], tol: f32) -> bool {
    approx_eq(values.iter().sum(), 1.0, tol)
}
