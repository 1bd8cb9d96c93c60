//! Error types for the heading estimator

use thiserror::Error;

/// Conditions surfaced to the caller
///
/// Per-sample problems are never reported; they are resolved inside
/// [`Estimator::on_sample`](crate::Estimator::on_sample) by dropping the sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EstimatorError {
    /// Neither a rotation-vector sensor nor a magnetometer/accelerometer pair exists
    #[error("device lacks a rotation-vector sensor or a magnetometer/accelerometer pair")]
    Unavailable,
}
