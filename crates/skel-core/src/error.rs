use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("out of bounds")]
    OutOfBounds,
    #[error("extent mismatch: expected {expected:?}, got {actual:?}")]
    ExtentMismatch {
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    },
    #[error("invalid calibration: spacing ({sx}, {sy}, {sz}) must be positive and finite")]
    InvalidCalibration { sx: f64, sy: f64, sz: f64 },
}
