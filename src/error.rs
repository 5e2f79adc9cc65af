use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BloomError {
    /// The filter could not be set up: a digest algorithm is missing or a
    /// sizing parameter is out of range.
    #[error("Configuration: {0}")]
    Configuration(String),

    /// The filter already holds `capacity` elements.
    #[error("Not enough space: filter is sized for {capacity} elements")]
    CapacityExceeded { capacity: usize },
}

impl BloomError {
    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        BloomError::Configuration(msg.into())
    }

    pub fn is_capacity_exceeded(&self) -> bool {
        matches!(self, BloomError::CapacityExceeded { .. })
    }
}

pub type Result<T> = std::result::Result<T, BloomError>;
