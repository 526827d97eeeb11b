use crate::shared::embedding::Embedding;
use crate::shared::error::BoxError;
use crate::shared::face_crop::FaceCrop;

/// Domain interface for turning a face crop into an identity descriptor.
///
/// Must be deterministic for identical pixels, otherwise clustering
/// results are not reproducible. Stateful backends (inference sessions)
/// take `&mut self`.
pub trait FaceEmbedder: Send {
    fn embed(&mut self, crop: &FaceCrop) -> Result<Embedding, BoxError>;
}
