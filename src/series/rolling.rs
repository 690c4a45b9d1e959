//! Trailing window statistics.

/// Trailing simple moving average.
///
/// Position `i` holds the mean of `values[i + 1 - window..=i]`; the first
/// `window - 1` positions have no full window and are `None`, as is every position
/// when `window` is zero.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, value) in values.iter().enumerate() {
        sum += value;
        if i >= window {
            sum -= values[i - window];
        }
        if i + 1 >= window {
            out.push(Some(sum / window as f64));
        } else {
            out.push(None);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_period_mean_needs_a_full_window() {
        let out = rolling_mean(&[100.0, 200.0, 300.0, 600.0], 3);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert!((out[2].unwrap() - 200.0).abs() < 1e-12);
        assert!((out[3].unwrap() - 366.666_666_666_666_7).abs() < 1e-9);
    }

    #[test]
    fn zero_window_yields_nothing() {
        assert_eq!(rolling_mean(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn window_one_is_identity() {
        assert_eq!(rolling_mean(&[1.5, 2.5], 1), vec![Some(1.5), Some(2.5)]);
    }
}
