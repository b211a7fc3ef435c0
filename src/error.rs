use thiserror::Error;
#[derive(Error, Debug)]
pub enum SptkError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("{0} is not initialized")]
    NotInitialized(&'static str),
    #[error("empty input")]
    EmptyInput,
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
    #[error("numeric error: {0}")]
    NumericError(String),
    #[error("degenerate model: mixture weights collapsed")]
    DegenerateModel,
    #[error("io failure: {0}")]
    IoFailure(#[from] std::io::Error),
}
pub type Result<T> = std::result::Result<T, SptkError>;
impl SptkError {
    pub fn numeric<S: Into<String>>(message: S) -> Self {
        SptkError::NumericError(message.into())
    }
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        SptkError::InvalidArgument(message.into())
    }
}
/// Fails with `ShapeMismatch` unless `actual == expected`.
#[inline]
pub fn check_length(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(SptkError::ShapeMismatch { expected, actual });
    }
    Ok(())
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_messages() {
        let e = SptkError::ShapeMismatch { expected: 3, actual: 2 };
        assert_eq!(e.to_string(), "shape mismatch: expected 3, got 2");
        assert_eq!(SptkError::NotInitialized("swipe").to_string(), "swipe is not initialized");
        assert!(check_length(4, 4).is_ok());
        assert!(matches!(check_length(4, 5), Err(SptkError::ShapeMismatch { .. })));
    }
    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let e: SptkError = io.into();
        assert!(matches!(e, SptkError::IoFailure(_)));
    }
}
