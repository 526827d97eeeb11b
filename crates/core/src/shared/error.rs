use thiserror::Error;

use crate::shared::bounding_box::BoundingBox;
use crate::shared::image::ImageId;

/// Error type returned by localizer, embedder and I/O adapters.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Terminal failure of a clustering pass.
///
/// Every variant aborts the whole run; no partial clusters are delivered.
#[derive(Error, Debug)]
pub enum ClusteringError {
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("face detection failed for {image}: {source}")]
    DetectionFailure {
        image: ImageId,
        #[source]
        source: BoxError,
    },

    #[error("embedding failed for face {face_index} of {image}: {source}")]
    EmbeddingFailure {
        image: ImageId,
        face_index: usize,
        #[source]
        source: BoxError,
    },

    #[error("face {face_index} of {image} has an empty crop region {bbox} after clamping")]
    InvalidCropRegion {
        image: ImageId,
        face_index: usize,
        bbox: BoundingBox,
    },
}

impl ClusteringError {
    /// The image the failure is attributed to, if any.
    pub fn image(&self) -> Option<ImageId> {
        match self {
            ClusteringError::DimensionMismatch { .. } => None,
            ClusteringError::DetectionFailure { image, .. }
            | ClusteringError::EmbeddingFailure { image, .. }
            | ClusteringError::InvalidCropRegion { image, .. } => Some(*image),
        }
    }
}
