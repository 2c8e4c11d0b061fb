use nalgebra as na;
use num_traits::{Float, FromPrimitive};
use std::f32::consts::PI;

/// Arithmetic mean; zero for an empty slice.
pub fn mean<T: Float + FromPrimitive>(values: &[T]) -> T {
    if values.is_empty() {
        return T::zero();
    }

    let sum = values.iter().fold(T::zero(), |acc, &v| acc + v);

    T::from_usize(values.len()).map_or(T::zero(), |n| sum / n)
}

/// Running sum of `values`.
pub fn cumsum<T: Float>(values: &[T]) -> Vec<T> {
    values
        .iter()
        .scan(T::zero(), |acc, &v| {
            *acc = *acc + v;
            Some(*acc)
        })
        .collect()
}

#[inline]
pub fn heading(v: &na::Vector2<f32>) -> f32 {
    v.y.atan2(v.x)
}

/// Absolute difference of two headings, folded into `[0, π]`.
pub fn angle_between(a: f32, b: f32) -> f32 {
    let d = (a - b).abs() % (2.0 * PI);

    d.min(2.0 * PI - d)
}

/// Turning angle at `p1` along `p0 -> p1 -> p2`. A step with no length has
/// heading 0, as `atan2(0, 0)` gives.
pub fn turning_angle(p0: &na::Point2<f32>, p1: &na::Point2<f32>, p2: &na::Point2<f32>) -> f32 {
    let incoming = p1 - p0;
    let outgoing = p2 - p1;

    angle_between(heading(&outgoing), heading(&incoming))
}
