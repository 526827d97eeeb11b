use std::fs;
use std::path::{Path, PathBuf};

use crate::io::domain::image_reader::ImageReader;
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::error::BoxError;
use crate::shared::image::Image;

/// Decodes photos with the `image` crate, always yielding 8-bit RGB.
pub struct ImageFileReader;

impl ImageFileReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageReader for ImageFileReader {
    fn read(&self, path: &Path) -> Result<Image, BoxError> {
        let rgb = image::open(path)?.to_rgb8();
        let (width, height) = rgb.dimensions();
        Ok(Image::new(rgb.into_raw(), width, height, 3))
    }
}

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Image files directly inside `dir`, sorted by path so runs are reproducible.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, BoxError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_image(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_rgb_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        let mut img = image::RgbImage::new(4, 3);
        img.put_pixel(2, 1, image::Rgb([10, 20, 30]));
        img.save(&path).unwrap();

        let image = ImageFileReader::new().read(&path).unwrap();
        assert_eq!((image.width(), image.height(), image.channels()), (4, 3, 3));
        let arr = image.as_ndarray();
        assert_eq!(arr[[1, 2, 0]], 10);
        assert_eq!(arr[[1, 2, 1]], 20);
        assert_eq!(arr[[1, 2, 2]], 30);
    }

    #[test]
    fn test_grayscale_is_expanded_to_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        image::GrayImage::from_pixel(2, 2, image::Luma([77])).save(&path).unwrap();

        let image = ImageFileReader::new().read(&path).unwrap();
        assert_eq!(image.channels(), 3);
        assert_eq!(image.data(), &[77u8; 12][..]);
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ImageFileReader::new()
            .read(&dir.path().join("nope.jpg"))
            .is_err());
    }

    #[test]
    fn test_is_image_case_insensitive() {
        assert!(is_image(Path::new("a/B.JPG")));
        assert!(is_image(Path::new("c.webp")));
        assert!(!is_image(Path::new("notes.txt")));
        assert!(!is_image(Path::new("no_extension")));
    }

    #[test]
    fn test_list_images_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.jpg", "readme.md"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.png")).unwrap();

        let paths = list_images(dir.path()).unwrap();
        assert_eq!(
            paths,
            vec![dir.path().join("a.jpg"), dir.path().join("b.png")]
        );
    }
}
