use ndarray::ArrayView3;

/// Position of an image in the sequence handed to a clustering pass.
///
/// Images are identified by where they were supplied, never by pixel
/// content: two decodes of the same file are two distinct images.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageId(pub usize);

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "image #{}", self.0)
    }
}

/// A decoded photo: contiguous interleaved pixel bytes in row-major order.
///
/// Immutable once constructed; the clustering pass only ever borrows it.
#[derive(Clone, Debug)]
pub struct Image {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
}

impl Image {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Self {
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

    /// `(height, width, channels)` view over the pixel bytes.
    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Image data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 18]; // 3x2x3
        let image = Image::new(data.clone(), 3, 2, 3);
        assert_eq!(image.width(), 3);
        assert_eq!(image.height(), 2);
        assert_eq!(image.channels(), 3);
        assert_eq!(image.data(), &data[..]);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        Image::new(vec![0u8; 7], 2, 2, 3);
    }

    #[test]
    fn test_as_ndarray_is_row_major() {
        // 2x2 RGB: pixel (row=1, col=0) is green
        let mut data = vec![0u8; 12];
        data[7] = 200;
        let image = Image::new(data, 2, 2, 3);
        let arr = image.as_ndarray();
        assert_eq!(arr.shape(), &[2, 2, 3]);
        assert_eq!(arr[[1, 0, 1]], 200);
        assert_eq!(arr[[1, 0, 0]], 0);
    }

    #[test]
    fn test_image_id_display() {
        assert_eq!(ImageId(4).to_string(), "image #4");
    }
}
