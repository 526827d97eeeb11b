use std::path::Path;

use crate::io::domain::image_writer::ImageWriter;
use crate::shared::error::BoxError;
use crate::shared::face_crop::FaceCrop;

/// Writes RGB face crops with the `image` crate, format picked from the extension.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, crop: &FaceCrop, size: Option<(u32, u32)>) -> Result<(), BoxError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if crop.channels() != 3 {
            return Err(format!("Expected an RGB crop, got {} channels", crop.channels()).into());
        }

        let img = image::RgbImage::from_raw(crop.width(), crop.height(), crop.data().to_vec())
            .ok_or("Failed to create image from crop data")?;
        let img = match size {
            Some((w, h)) => image::imageops::resize(&img, w, h, image::imageops::FilterType::Triangle),
            None => img,
        };

        img.save(path)?;
        Ok(())
    }
}
