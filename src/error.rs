use thiserror::Error;

/// Per-instrument failures raised by the scan pipeline.
///
/// None of these abort a run: the caller logs the error and moves on to the
/// next instrument.
#[derive(Error, Debug, PartialEq)]
pub enum ScanError {
    #[error("insufficient history: need {required} bars, got {got}")]
    InsufficientHistory { required: usize, got: usize },

    #[error("price history unavailable for {0}")]
    Unavailable(String),

    #[error("invalid last price: {0}")]
    InvalidPrice(f64),
}

pub type ScanResult<T> = std::result::Result<T, ScanError>;
