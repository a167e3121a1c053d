use std::fmt::{Display, Formatter};

/// A convenience alias for results produced while measuring a container
pub type MeasureResult<T> = Result<T, MeasureError>;

/// An error produced while observing or measuring a container.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MeasureError {
    /// The resize probe never exposed a nested environment to listen to.
    ///
    /// This is not fatal: the wrapper keeps the measurement it took on mount and stops updating.
    #[error("resize sensor unavailable: {0}")]
    SensorUnavailable(String),

    /// A dimension reader failed or produced something that is not a size.
    #[error("failed to read the container {dimension}: {source}")]
    ReaderFailure {
        /// The dimension that was being read
        dimension: Dimension,
        /// Why the reader failed
        source: ReadError,
    },
}

/// The reason a single dimension reader failed.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ReadError {
    /// The container is not attached to a document, so it has no box to measure
    #[error("the container is not attached to a document")]
    Detached,

    /// The container has no parent element to measure
    #[error("the container has no parent element")]
    NoParent,

    /// The reader returned NaN, an infinite or a negative value
    #[error("expected a finite, non-negative size but the reader returned {0}")]
    NotANumber(f64),

    /// A custom reader failure
    #[error("{0}")]
    Custom(String),
}

/// One of the two measured dimensions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// The horizontal extent
    Width,
    /// The vertical extent
    Height,
}

impl Display for Dimension {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::Width => f.write_str("width"),
            Dimension::Height => f.write_str("height"),
        }
    }
}
