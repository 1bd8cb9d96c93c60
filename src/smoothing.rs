//! Exponential smoothing of sensor vectors
//!
//! Acts as a low-pass filter removing high-frequency sensor noise:
//! `out[i] = prev[i] + alpha * (new[i] - prev[i])`.

/// Smooth `new` against the previously smoothed vector
///
/// When `prev` is `None` (first value for that vector), `new` is returned
/// unchanged.
///
/// # Example
/// ```
/// use compass_heading::smoothing::smooth;
///
/// let out = smooth(&[10.0, 0.0, 0.0], Some(&[0.0, 0.0, 0.0]), 0.5);
/// assert_eq!(out, [5.0, 0.0, 0.0]);
///
/// let first = smooth(&[10.0, 0.0, 0.0], None, 0.5);
/// assert_eq!(first, [10.0, 0.0, 0.0]);
/// ```
pub fn smooth<const N: usize>(new: &[f32; N], prev: Option<&[f32; N]>, alpha: f32) -> [f32; N] {
    let Some(prev) = prev else {
        return *new;
    };

    let mut output = [0.0; N];
    for (i, out) in output.iter_mut().enumerate() {
        *out = prev[i] + alpha * (new[i] - prev[i]);
    }
    output
}

/// A smoothed sensor vector retained between samples
#[derive(Debug, Clone, Copy)]
pub struct SmoothedVector<const N: usize> {
    alpha: f32,
    value: Option<[f32; N]>,
}

impl<const N: usize> SmoothedVector<N> {
    pub fn new(alpha: f32) -> Self {
        Self { alpha, value: None }
    }

    /// Fold a new reading into the smoothed value and return it
    pub fn update(&mut self, new: &[f32; N]) -> [f32; N] {
        let smoothed = smooth(new, self.value.as_ref(), self.alpha);
        self.value = Some(smoothed);
        smoothed
    }

    /// Current smoothed value, `None` until the first update
    pub fn value(&self) -> Option<&[f32; N]> {
        self.value.as_ref()
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }
}
