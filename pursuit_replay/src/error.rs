use thiserror::Error;

/// Result type alias for replay operations.
pub type ReplayResult<T> = std::result::Result<T, ReplayError>;

/// Failure taxonomy for the replay pipeline.
///
/// Every variant is fatal: the pipeline has no retry or per-frame recovery
/// policy. A grid point falling outside the convex hull of the sample sites
/// is *not* an error and never reaches this type; it is reported as a
/// missing surface value and rendered as background.
#[derive(Error, Debug)]
pub enum ReplayError {
    /// The study record references data that cannot exist: a node index out
    /// of range, or a posterior that does not line up with the network.
    #[error("schema violation: {0}")]
    Schema(String),

    /// The record blob could not be decoded into a `StudyRecord`.
    #[error("record decode failed: {0}")]
    Decode(String),

    /// The interpolation backend rejected the sample sites (non-finite
    /// coordinates make triangulation impossible).
    #[error("interpolation setup failed: {0}")]
    Interpolation(String),

    /// Output destination could not be written.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame could not be encoded into the output file.
    #[error("frame encode failed: {0}")]
    Encode(String),
}

impl ReplayError {
    /// Create a schema violation error.
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }
}
