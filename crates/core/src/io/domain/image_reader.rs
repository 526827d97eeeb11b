use std::path::Path;

use crate::shared::error::BoxError;
use crate::shared::image::Image;

/// Decodes a photo from storage into an [`Image`].
pub trait ImageReader: Send {
    fn read(&self, path: &Path) -> Result<Image, BoxError>;
}
