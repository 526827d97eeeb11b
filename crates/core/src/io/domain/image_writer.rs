use std::path::Path;

use crate::shared::error::BoxError;
use crate::shared::face_crop::FaceCrop;

/// Writes a face crop to an image file.
pub trait ImageWriter: Send {
    /// Writes `crop` to `path`, optionally resized to `(width, height)`.
    fn write(&self, path: &Path, crop: &FaceCrop, size: Option<(u32, u32)>) -> Result<(), BoxError>;
}
