//! Clamped uniform B-spline interpolation of scalar control points.
//!
//! This is the dense-distribution transform behind every interpolation node:
//! `M` control values are spread over `t ∈ [0, 1]` with a clamped knot vector
//! and sampled at `K` uniformly spaced parameters.

use thiserror::Error;

/// Requested spline order when the caller does not specify one (cubic).
pub const DEFAULT_ORDER: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplineError {
    #[error("interpolation requires at least one control point")]
    InvalidControlPoints,
}

/// Order actually used for `control_count` control points.
///
/// The requested order is clamped to the number of control points; an order
/// of zero is treated as piecewise constant (order 1).
#[must_use]
pub fn effective_order(requested_order: usize, control_count: usize) -> usize {
    requested_order.max(1).min(control_count.max(1))
}

/// `count` uniformly spaced parameters on `[0, 1]`.
///
/// A single sample sits at `t = 0`, matching `linspace(0, 1, 1)`.
#[must_use]
pub fn uniform_parameters(count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let last = (count - 1) as f64;
            (0..count).map(|i| i as f64 / last).collect()
        }
    }
}

/// Clamped knot vector for `num_cp` control points of order `order`.
///
/// The vector has `num_cp + order` entries: `order` zeros, the interior of
/// `linspace(0, 1, num_cp - order + 2)`, and `order` ones. `order` must not
/// exceed `num_cp`.
#[must_use]
pub fn clamped_knots(num_cp: usize, order: usize) -> Vec<f64> {
    let mut knots = Vec::with_capacity(num_cp + order);
    knots.extend(std::iter::repeat_n(0.0, order));

    let segments = num_cp + 1 - order;
    for i in 1..segments {
        knots.push(i as f64 / segments as f64);
    }

    knots.extend(std::iter::repeat_n(1.0, order));
    knots
}

/// Interpolates `control_points` to `output_count` values.
///
/// # Errors
///
/// Returns [`SplineError::InvalidControlPoints`] when `control_points` is
/// empty.
pub fn interpolate(
    control_points: &[f64],
    output_count: usize,
    requested_order: usize,
) -> Result<Vec<f64>, SplineError> {
    if control_points.is_empty() {
        return Err(SplineError::InvalidControlPoints);
    }

    let order = effective_order(requested_order, control_points.len());
    let knots = clamped_knots(control_points.len(), order);

    Ok(uniform_parameters(output_count)
        .into_iter()
        .map(|t| evaluate(control_points, order - 1, &knots, t))
        .collect())
}

fn evaluate(control_points: &[f64], degree: usize, knots: &[f64], t: f64) -> f64 {
    let n = control_points.len() - 1;
    let u = t.clamp(knots[degree], knots[n + 1]);
    let span = find_span(n, degree, u, knots);

    let mut d: Vec<f64> = (0..=degree)
        .map(|j| control_points[span - degree + j])
        .collect();
    de_boor(&mut d, span, degree, u, knots);
    d[degree]
}

fn find_span(n: usize, p: usize, u: f64, knots: &[f64]) -> usize {
    if u >= knots[n + 1] {
        return n;
    }
    if u <= knots[p] {
        return p;
    }

    let mut low = p;
    let mut high = n + 1;
    let mut mid = (low + high) / 2;
    while u < knots[mid] || u >= knots[mid + 1] {
        if u < knots[mid] {
            high = mid;
        } else {
            low = mid;
        }
        mid = (low + high) / 2;
    }
    mid
}

fn de_boor(d: &mut [f64], span: usize, p: usize, u: f64, knots: &[f64]) {
    for r in 1..=p {
        for j in (r..=p).rev() {
            let i = span - p + j;
            let denom = knots[i + p + 1 - r] - knots[i];
            let alpha = if denom == 0.0 { 0.0 } else { (u - knots[i]) / denom };
            d[j] = d[j - 1] * (1.0 - alpha) + d[j] * alpha;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DEFAULT_ORDER, SplineError, clamped_knots, effective_order, interpolate,
        uniform_parameters,
    };

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn order_is_clamped_to_control_point_count() {
        assert_eq!(effective_order(DEFAULT_ORDER, 1), 1);
        assert_eq!(effective_order(DEFAULT_ORDER, 2), 2);
        assert_eq!(effective_order(DEFAULT_ORDER, 4), 4);
        assert_eq!(effective_order(DEFAULT_ORDER, 6), 4);
        assert_eq!(effective_order(0, 3), 1);
    }

    #[test]
    fn knot_vector_is_clamped() {
        let knots = clamped_knots(6, 4);
        assert_eq!(knots.len(), 10);
        assert_eq!(&knots[..4], &[0.0; 4]);
        assert_eq!(&knots[6..], &[1.0; 4]);
        assert_close(knots[4], 1.0 / 3.0);
        assert_close(knots[5], 2.0 / 3.0);

        assert_eq!(clamped_knots(1, 1), vec![0.0, 1.0]);
    }

    #[test]
    fn uniform_parameters_span_unit_interval() {
        assert!(uniform_parameters(0).is_empty());
        assert_eq!(uniform_parameters(1), vec![0.0]);
        assert_eq!(uniform_parameters(3), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn empty_control_points_are_rejected() {
        assert_eq!(
            interpolate(&[], 10, DEFAULT_ORDER),
            Err(SplineError::InvalidControlPoints)
        );
    }

    #[test]
    fn constant_control_points_stay_constant() {
        for count in 1..=7 {
            let control = vec![2.5; count];
            for k in [1, 2, 19, 20] {
                let dense = interpolate(&control, k, DEFAULT_ORDER).expect("interpolation");
                assert_eq!(dense.len(), k);
                for value in dense {
                    assert_close(value, 2.5);
                }
            }
        }
    }

    #[test]
    fn endpoints_match_first_and_last_control_point() {
        let control = [6.7, 2.2, -0.7, -1.8, -3.75];
        let dense = interpolate(&control, 20, DEFAULT_ORDER).expect("interpolation");
        assert_close(dense[0], 6.7);
        assert_close(dense[19], -3.75);
    }

    #[test]
    fn two_control_points_interpolate_linearly() {
        let dense = interpolate(&[0.0, 10.0], 5, DEFAULT_ORDER).expect("interpolation");
        let expected = [0.0, 2.5, 5.0, 7.5, 10.0];
        for (value, expected) in dense.iter().zip(expected) {
            assert_close(*value, expected);
        }
    }

    #[test]
    fn cubic_spline_reproduces_linear_data() {
        let control = [0.0, 1.0, 2.0, 3.0];
        let dense = interpolate(&control, 7, DEFAULT_ORDER).expect("interpolation");
        for (i, value) in dense.iter().enumerate() {
            assert_close(*value, 3.0 * i as f64 / 6.0);
        }
    }

    #[test]
    fn single_control_point_is_broadcast() {
        let dense = interpolate(&[-1.25], 4, DEFAULT_ORDER).expect("interpolation");
        assert_eq!(dense, vec![-1.25; 4]);
    }

    #[test]
    fn interpolation_is_deterministic() {
        let control = [1.0, 4.0, -2.0, 0.5, 3.0, 7.0];
        let first = interpolate(&control, 13, DEFAULT_ORDER).expect("interpolation");
        let second = interpolate(&control, 13, DEFAULT_ORDER).expect("interpolation");
        assert_eq!(first, second);
    }
}
