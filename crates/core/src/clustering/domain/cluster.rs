use crate::shared::embedding::Embedding;
use crate::shared::face_crop::FaceCrop;
use crate::shared::image::ImageId;

/// Index of a cluster in its store, in creation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClusterId(pub usize);

impl std::fmt::Display for ClusterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "face {}", self.0)
    }
}

/// One presumed identity: the face that founded it and every image a
/// matching face was seen in.
///
/// The representative and its embedding are fixed at creation. Source
/// images are appended in processing order and never deduplicated, so an
/// image with two faces of the same person appears twice.
#[derive(Clone, Debug)]
pub struct Cluster {
    id: ClusterId,
    representative: FaceCrop,
    embedding: Embedding,
    source_images: Vec<ImageId>,
}

impl Cluster {
    pub(crate) fn new(
        id: ClusterId,
        representative: FaceCrop,
        embedding: Embedding,
        source: ImageId,
    ) -> Self {
        Self {
            id,
            representative,
            embedding,
            source_images: vec![source],
        }
    }

    pub fn id(&self) -> ClusterId {
        self.id
    }

    pub fn representative(&self) -> &FaceCrop {
        &self.representative
    }

    pub fn embedding(&self) -> &Embedding {
        &self.embedding
    }

    /// Contributing images in append order; never empty.
    pub fn source_images(&self) -> &[ImageId] {
        &self.source_images
    }

    pub(crate) fn record(&mut self, image: ImageId) {
        self.source_images.push(image);
    }
}
