use crate::shared::bounding_box::BoundingBox;
use crate::shared::config::DegenerateBoxPolicy;
use crate::shared::error::ClusteringError;
use crate::shared::face_crop::FaceCrop;
use crate::shared::image::{Image, ImageId};

/// Cuts one crop per box out of `image`, in box order.
///
/// Each box is clamped to the image first. Boxes left with no area are
/// dropped under [`DegenerateBoxPolicy::Skip`] and abort with
/// `InvalidCropRegion` under [`DegenerateBoxPolicy::Fail`]. Crops keep the
/// index of their box, so skipped boxes leave gaps in `face_index`.
pub fn extract_faces(
    image: &Image,
    image_id: ImageId,
    boxes: &[BoundingBox],
    policy: DegenerateBoxPolicy,
) -> Result<Vec<FaceCrop>, ClusteringError> {
    let mut crops = Vec::with_capacity(boxes.len());
    for (face_index, bbox) in boxes.iter().enumerate() {
        let region = bbox.clamp_to(image.width(), image.height());
        if region.is_degenerate() {
            match policy {
                DegenerateBoxPolicy::Skip => {
                    log::debug!("Skipping empty face box {bbox} in {image_id}");
                    continue;
                }
                DegenerateBoxPolicy::Fail => {
                    return Err(ClusteringError::InvalidCropRegion {
                        image: image_id,
                        face_index,
                        bbox: *bbox,
                    });
                }
            }
        }
        crops.push(crop(image, image_id, face_index, region));
    }
    Ok(crops)
}

/// Copies a non-degenerate, in-bounds region out of the image.
fn crop(image: &Image, image_id: ImageId, face_index: usize, region: BoundingBox) -> FaceCrop {
    let x1 = region.left as usize;
    let y1 = region.top as usize;
    let x2 = region.right as usize;
    let y2 = region.bottom as usize;
    let channels = image.channels() as usize;

    let src = image.as_ndarray();
    let mut data = Vec::with_capacity((x2 - x1) * (y2 - y1) * channels);
    for row in y1..y2 {
        for col in x1..x2 {
            for c in 0..channels {
                data.push(src[[row, col, c]]);
            }
        }
    }

    FaceCrop::new(
        data,
        (x2 - x1) as u32,
        (y2 - y1) as u32,
        image.channels(),
        image_id,
        face_index,
        region,
    )
}
