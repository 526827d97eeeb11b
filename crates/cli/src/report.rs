use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use facegroup_core::clustering::domain::clustering_result::ClusteringResult;
use facegroup_core::io::domain::image_writer::ImageWriter;
use facegroup_core::shared::config::ClusteringConfig;
use facegroup_core::shared::error::BoxError;

/// Thumbnail edge in pixels.
const THUMBNAIL_SIZE: u32 = 160;

pub const MANIFEST_NAME: &str = "clusters.json";

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    similarity_threshold: f64,
    match_policy: String,
    images_scanned: usize,
    clusters: Vec<ClusterEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct ClusterEntry<'a> {
    id: usize,
    thumbnail: String,
    /// Source photos in match order. A repeated path means several faces
    /// of this person in one photo.
    photos: Vec<&'a Path>,
}

/// Writes one thumbnail per cluster plus a JSON manifest into `output_dir`.
pub struct ReportWriter {
    output_dir: PathBuf,
    image_writer: Box<dyn ImageWriter>,
}

impl ReportWriter {
    pub fn new(output_dir: PathBuf, image_writer: Box<dyn ImageWriter>) -> Self {
        Self {
            output_dir,
            image_writer,
        }
    }

    /// `paths[i]` must be the file `ImageId(i)` was decoded from.
    pub fn write(
        &self,
        result: &ClusteringResult,
        paths: &[PathBuf],
        config: &ClusteringConfig,
    ) -> Result<PathBuf, BoxError> {
        fs::create_dir_all(&self.output_dir)?;

        let mut clusters = Vec::with_capacity(result.len());
        for cluster in result.clusters() {
            let id = cluster.id().0;
            let thumbnail = format!("face_{id}.jpg");
            self.image_writer.write(
                &self.output_dir.join(&thumbnail),
                cluster.representative(),
                Some((THUMBNAIL_SIZE, THUMBNAIL_SIZE)),
            )?;

            let photos = cluster
                .source_images()
                .iter()
                .map(|image_id| {
                    paths
                        .get(image_id.0)
                        .map(PathBuf::as_path)
                        .ok_or_else(|| format!("no path recorded for {image_id}"))
                })
                .collect::<Result<Vec<_>, _>>()?;

            clusters.push(ClusterEntry {
                id,
                thumbnail,
                photos,
            });
        }

        let manifest = Manifest {
            similarity_threshold: config.similarity_threshold,
            match_policy: config.match_policy.to_string(),
            images_scanned: result.images_processed(),
            clusters,
        };
        let manifest_path = self.output_dir.join(MANIFEST_NAME);
        fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)?;
        Ok(manifest_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use facegroup_core::clustering::domain::cluster_store::ClusterStore;
    use facegroup_core::shared::bounding_box::BoundingBox;
    use facegroup_core::shared::embedding::Embedding;
    use facegroup_core::shared::face_crop::FaceCrop;
    use facegroup_core::shared::image::ImageId;

    struct RecordingWriter {
        written: Arc<Mutex<Vec<(PathBuf, Option<(u32, u32)>)>>>,
    }

    impl ImageWriter for RecordingWriter {
        fn write(
            &self,
            path: &Path,
            _crop: &FaceCrop,
            size: Option<(u32, u32)>,
        ) -> Result<(), BoxError> {
            self.written
                .lock()
                .unwrap()
                .push((path.to_path_buf(), size));
            Ok(())
        }
    }

    fn crop(image: usize) -> FaceCrop {
        FaceCrop::new(
            vec![0; 3],
            1,
            1,
            3,
            ImageId(image),
            0,
            BoundingBox::new(0, 0, 1, 1),
        )
    }

    fn result() -> ClusteringResult {
        let mut store = ClusterStore::new(0.6);
        let faces = [
            (0, vec![1.0, 0.0]),
            (1, vec![0.0, 1.0]),
            (2, vec![1.0, 0.1]),
            (2, vec![0.9, 0.0]),
        ];
        for (image, embedding) in faces {
            store
                .match_or_create(crop(image), Embedding::new(embedding), ImageId(image))
                .unwrap();
        }
        ClusteringResult::new(store.into_clusters(), 3, 3)
    }

    #[test]
    fn test_writes_thumbnails_and_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let written = Arc::new(Mutex::new(Vec::new()));
        let writer = ReportWriter::new(
            dir.path().to_path_buf(),
            Box::new(RecordingWriter {
                written: written.clone(),
            }),
        );
        let paths: Vec<PathBuf> = ["a.jpg", "b.jpg", "c.jpg"]
            .iter()
            .map(PathBuf::from)
            .collect();

        let manifest_path = writer
            .write(&result(), &paths, &ClusteringConfig::default())
            .unwrap();

        let written = written.lock().unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0].0, dir.path().join("face_0.jpg"));
        assert_eq!(written[0].1, Some((THUMBNAIL_SIZE, THUMBNAIL_SIZE)));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(manifest_path).unwrap()).unwrap();
        assert_eq!(json["match_policy"], "first-match");
        assert_eq!(json["images_scanned"], 3);
        let clusters = json["clusters"].as_array().unwrap();
        assert_eq!(clusters.len(), 2);
        assert_eq!(
            clusters[0]["photos"],
            serde_json::json!(["a.jpg", "c.jpg", "c.jpg"])
        );
        assert_eq!(clusters[1]["photos"], serde_json::json!(["b.jpg"]));
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReportWriter::new(
            dir.path().to_path_buf(),
            Box::new(RecordingWriter {
                written: Arc::new(Mutex::new(Vec::new())),
            }),
        );
        let paths = vec![PathBuf::from("only.jpg")];
        assert!(writer
            .write(&result(), &paths, &ClusteringConfig::default())
            .is_err());
    }
}
