use crate::clustering::domain::cluster::{Cluster, ClusterId};
use crate::shared::face_crop::FaceCrop;
use crate::shared::image::{Image, ImageId};

/// Outcome of a clustering pass: every discovered identity, oldest first.
#[derive(Clone, Debug)]
pub struct ClusteringResult {
    clusters: Vec<Cluster>,
    images_processed: usize,
    images_total: usize,
}

impl ClusteringResult {
    pub fn new(clusters: Vec<Cluster>, images_processed: usize, images_total: usize) -> Self {
        Self {
            clusters,
            images_processed,
            images_total,
        }
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// One representative crop per person, in first-seen order.
    pub fn unique_faces(&self) -> Vec<&FaceCrop> {
        self.clusters.iter().map(Cluster::representative).collect()
    }

    /// Representative crop paired with the images it was seen in.
    pub fn images_by_face(&self) -> impl Iterator<Item = (&FaceCrop, &[ImageId])> {
        self.clusters
            .iter()
            .map(|c| (c.representative(), c.source_images()))
    }

    pub fn images_for(&self, id: ClusterId) -> Option<&[ImageId]> {
        self.clusters.get(id.0).map(Cluster::source_images)
    }

    /// Looks up the images of a cluster in the slice the pass was run on.
    pub fn resolve_images<'a>(&self, id: ClusterId, images: &'a [Image]) -> Vec<&'a Image> {
        self.images_for(id)
            .unwrap_or_default()
            .iter()
            .filter_map(|image_id| images.get(image_id.0))
            .collect()
    }

    pub fn images_processed(&self) -> usize {
        self.images_processed
    }

    pub fn images_total(&self) -> usize {
        self.images_total
    }

    /// False when the pass was cancelled before reaching the last image.
    pub fn is_complete(&self) -> bool {
        self.images_processed == self.images_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::bounding_box::BoundingBox;
    use crate::shared::embedding::Embedding;

    fn cluster(id: usize, images: &[usize]) -> Cluster {
        let crop = FaceCrop::new(
            vec![id as u8; 3],
            1,
            1,
            3,
            ImageId(images[0]),
            0,
            BoundingBox::new(0, 0, 1, 1),
        );
        let mut c = Cluster::new(
            ClusterId(id),
            crop,
            Embedding::new(vec![1.0]),
            ImageId(images[0]),
        );
        for &i in &images[1..] {
            c.record(ImageId(i));
        }
        c
    }

    #[test]
    fn test_empty_result() {
        let result = ClusteringResult::new(Vec::new(), 0, 0);
        assert!(result.is_empty());
        assert!(result.unique_faces().is_empty());
        assert_eq!(result.images_by_face().count(), 0);
        assert!(result.is_complete());
    }

    #[test]
    fn test_unique_faces_in_creation_order() {
        let result = ClusteringResult::new(vec![cluster(0, &[0]), cluster(1, &[2])], 3, 3);
        let faces = result.unique_faces();
        assert_eq!(faces.len(), 2);
        assert_eq!(faces[0].data()[0], 0);
        assert_eq!(faces[1].data()[0], 1);
    }

    #[test]
    fn test_images_by_face_preserves_duplicates() {
        let result = ClusteringResult::new(vec![cluster(0, &[0, 1, 1])], 2, 2);
        let (_, images) = result.images_by_face().next().unwrap();
        assert_eq!(images, &[ImageId(0), ImageId(1), ImageId(1)]);
    }

    #[test]
    fn test_resolve_images() {
        let images = vec![
            Image::new(vec![0; 3], 1, 1, 3),
            Image::new(vec![0; 12], 2, 2, 3),
        ];
        let result = ClusteringResult::new(vec![cluster(0, &[1])], 2, 2);
        let resolved = result.resolve_images(ClusterId(0), &images);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].width(), 2);
        assert!(result.resolve_images(ClusterId(9), &images).is_empty());
    }

    #[test]
    fn test_incomplete_when_cancelled_early() {
        let result = ClusteringResult::new(vec![cluster(0, &[0])], 1, 4);
        assert!(!result.is_complete());
        assert_eq!(result.images_processed(), 1);
        assert_eq!(result.images_total(), 4);
    }
}
