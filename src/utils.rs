//! Shared utility functions and traits

use std::time::Duration;

/// Running minimum/maximum kept in an `Option`.
///
/// ```
/// use keyboard_latency::utils::MinMaxExt;
/// use std::time::Duration;
///
/// let mut fastest: Option<Duration> = None;
/// fastest.update_min(Duration::from_millis(90));
/// fastest.update_min(Duration::from_millis(120));
/// assert_eq!(fastest, Some(Duration::from_millis(90)));
/// ```
pub trait MinMaxExt<T: Ord + Copy> {
    /// Store `value` if it is below the current minimum or none is set.
    fn update_min(&mut self, value: T);

    /// Store `value` if it is above the current maximum or none is set.
    fn update_max(&mut self, value: T);
}

impl<T: Ord + Copy> MinMaxExt<T> for Option<T> {
    fn update_min(&mut self, value: T) {
        *self = Some(self.map_or(value, |m| m.min(value)));
    }

    fn update_max(&mut self, value: T) {
        *self = Some(self.map_or(value, |m| m.max(value)));
    }
}

/// Milliseconds with two decimals, e.g. `"120.00 ms"`
pub fn format_ms(duration: Duration) -> String {
    format!("{:.2} ms", duration.as_secs_f64() * 1000.0)
}

/// Fit `label` into `width` terminal cells, centered, cutting it short if
/// it does not fit.
pub fn fit_label(label: &str, width: usize) -> String {
    let cut: String = label.chars().take(width).collect();
    format!("{:^width$}", cut, width = width)
}
