use crate::shared::bounding_box::BoundingBox;
use crate::shared::error::BoxError;
use crate::shared::image::Image;

/// Domain interface for finding faces in a photo.
///
/// Boxes may extend past the image edges. An empty list means no faces.
/// The returned order is the order faces are clustered in.
pub trait FaceLocalizer: Send {
    fn detect(&mut self, image: &Image) -> Result<Vec<BoundingBox>, BoxError>;
}
