use ndarray::ArrayView3;

use crate::shared::bounding_box::BoundingBox;
use crate::shared::image::ImageId;

/// Pixels of one detected face, cut out of its source image.
///
/// Keeps track of where it came from: the source image, the position of
/// its box in the localizer output, and the clamped region it covers.
#[derive(Clone, Debug)]
pub struct FaceCrop {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    source: ImageId,
    face_index: usize,
    region: BoundingBox,
}

impl FaceCrop {
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        channels: u8,
        source: ImageId,
        face_index: usize,
        region: BoundingBox,
    ) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            source,
            face_index,
            region,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn source(&self) -> ImageId {
        self.source
    }

    /// Index of the originating box in the localizer's output for the source image.
    pub fn face_index(&self) -> usize {
        self.face_index
    }

    /// Clamped region of the source image this crop covers.
    pub fn region(&self) -> BoundingBox {
        self.region
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(
            (
                self.height as usize,
                self.width as usize,
                self.channels as usize,
            ),
            &self.data,
        )
        .expect("FaceCrop data length must match dimensions")
    }
}
