/// Axis-aligned face box in source-image pixel coordinates.
///
/// Edges are half-open: the box covers columns `left..right` and rows
/// `top..bottom`. Localizers may emit boxes that extend past the image,
/// so coordinates are signed and unclamped until [`BoundingBox::clamp_to`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BoundingBox {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Builds a box from float corner coordinates, rounding outward so
    /// the rounded box never loses a partially covered pixel.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            left: x1.floor() as i32,
            top: y1.floor() as i32,
            right: x2.ceil() as i32,
            bottom: y2.ceil() as i32,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Clamps `left`/`top` to at least 0 and `right`/`bottom` to the image size.
    ///
    /// The result may be degenerate, e.g. when the box lies entirely
    /// outside the image.
    pub fn clamp_to(&self, image_width: u32, image_height: u32) -> BoundingBox {
        let max_x = i32::try_from(image_width).unwrap_or(i32::MAX);
        let max_y = i32::try_from(image_height).unwrap_or(i32::MAX);
        BoundingBox {
            left: self.left.max(0),
            top: self.top.max(0),
            right: self.right.min(max_x),
            bottom: self.bottom.min(max_y),
        }
    }

    /// True when the box covers no pixels.
    pub fn is_degenerate(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_dimensions() {
        let b = BoundingBox::new(10, 20, 50, 80);
        assert_eq!(b.width(), 40);
        assert_eq!(b.height(), 60);
    }

    #[test]
    fn test_clamp_inside_is_unchanged() {
        let b = BoundingBox::new(10, 10, 90, 90);
        assert_eq!(b.clamp_to(100, 100), b);
    }

    #[test]
    fn test_clamp_negative_origin() {
        let b = BoundingBox::new(-15, -5, 40, 30);
        assert_eq!(b.clamp_to(100, 100), BoundingBox::new(0, 0, 40, 30));
    }

    #[test]
    fn test_clamp_past_far_edges() {
        let b = BoundingBox::new(60, 70, 140, 130);
        assert_eq!(b.clamp_to(100, 80), BoundingBox::new(60, 70, 100, 80));
    }

    #[test]
    fn test_from_corners_rounds_outward() {
        let b = BoundingBox::from_corners(10.4, 20.6, 30.2, 40.9);
        assert_eq!(b, BoundingBox::new(10, 20, 31, 41));
    }

    #[rstest]
    #[case::fully_right_of_image(BoundingBox::new(1000, 10, 1100, 60), 500, 500)]
    #[case::fully_below_image(BoundingBox::new(10, 600, 60, 700), 500, 500)]
    #[case::fully_left_of_image(BoundingBox::new(-200, 10, -100, 60), 500, 500)]
    #[case::zero_width(BoundingBox::new(40, 10, 40, 60), 500, 500)]
    #[case::inverted(BoundingBox::new(60, 60, 40, 40), 500, 500)]
    fn test_degenerate_after_clamp(#[case] b: BoundingBox, #[case] w: u32, #[case] h: u32) {
        let clamped = b.clamp_to(w, h);
        assert!(clamped.is_degenerate());
        assert!(clamped.width() <= 0 || clamped.height() <= 0);
    }

    #[test]
    fn test_display_is_half_open() {
        assert_eq!(BoundingBox::new(1, 2, 3, 4).to_string(), "[1, 2, 3, 4)");
    }
}
