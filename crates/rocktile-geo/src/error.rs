//! Error types for coordinate math.

/// Errors produced by the geometric transforms.
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    /// The four points of an affine fit are coplanar or coincident.
    #[error("corner points are degenerate, affine fit is singular")]
    SingularTransform,
}

/// Result type for coordinate math.
pub type GeoResult<T> = Result<T, GeoError>;
