use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::clustering::domain::cluster_store::ClusterStore;
use crate::clustering::domain::clustering_result::ClusteringResult;
use crate::detection::domain::face_extraction::extract_faces;
use crate::detection::domain::face_localizer::FaceLocalizer;
use crate::embedding::domain::face_embedder::FaceEmbedder;
use crate::pipeline::clustering_sink::{ClusteringSink, RunStatus};
use crate::pipeline::pipeline_logger::{NullPipelineLogger, PipelineLogger};
use crate::shared::config::{ClusteringConfig, ConfigError};
use crate::shared::error::ClusteringError;
use crate::shared::image::{Image, ImageId};

/// Progress callback: `(images_done, images_total)`. Returning `false`
/// cancels the pass before the next image.
pub type ProgressFn = Box<dyn Fn(usize, usize) -> bool + Send>;

/// Groups the faces found across a photo collection by identity.
///
/// Runs one sequential pass: for each image in input order, detect faces,
/// crop them, embed each crop and assign it to a cluster before touching
/// the next face. Cluster assignment depends on everything seen before,
/// so nothing here is reordered or run concurrently.
///
/// Any detection, embedding or dimension failure aborts the whole pass.
pub struct ClusterFacesUseCase {
    localizer: Box<dyn FaceLocalizer>,
    embedder: Box<dyn FaceEmbedder>,
    config: ClusteringConfig,
    logger: Box<dyn PipelineLogger>,
    on_progress: Option<ProgressFn>,
    cancelled: Arc<AtomicBool>,
}

impl ClusterFacesUseCase {
    pub fn new(
        localizer: Box<dyn FaceLocalizer>,
        embedder: Box<dyn FaceEmbedder>,
        config: ClusteringConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            localizer,
            embedder,
            config,
            logger: Box::new(NullPipelineLogger),
            on_progress: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn with_logger(mut self, logger: Box<dyn PipelineLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_progress(mut self, on_progress: ProgressFn) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    /// Shares a cancellation flag with another thread.
    ///
    /// Setting the flag stops the current pass (or the next one, if none is
    /// running) before its next image. The pass that stops clears it.
    pub fn with_cancellation(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    pub fn cancellation_token(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    /// Clusters the faces in `images`; `ImageId(i)` refers to `images[i]`.
    ///
    /// A fresh cluster store is used per call, and a pass stopped by
    /// cancellation leaves nothing behind, so the same use case can run the
    /// whole batch again. When cancelled, returns the clusters built from
    /// the images processed so far with [`ClusteringResult::is_complete`] false.
    pub fn execute(&mut self, images: &[Image]) -> Result<ClusteringResult, ClusteringError> {
        let total = images.len();
        let mut store = ClusterStore::new(self.config.similarity_threshold)
            .with_policy(self.config.match_policy)
            .with_embedding_dim(self.config.embedding_dim);

        self.logger.info(&format!(
            "Clustering faces in {total} images ({}, threshold {})",
            self.config.match_policy, self.config.similarity_threshold
        ));

        let mut processed = 0;
        let mut keep_going = true;
        for (index, image) in images.iter().enumerate() {
            if !keep_going || self.cancelled.swap(false, Ordering::Relaxed) {
                self.logger
                    .info(&format!("Cancelled after {processed}/{total} images"));
                break;
            }
            self.process_image(&mut store, image, ImageId(index))?;
            processed += 1;
            self.logger.progress(processed, total);
            keep_going = self.report_progress(processed, total);
        }

        self.logger.metric("clusters", store.len() as f64);
        self.logger.summary();
        Ok(ClusteringResult::new(store.into_clusters(), processed, total))
    }

    /// Runs [`execute`](Self::execute) and hands a complete result to `sink`.
    pub fn execute_into(
        &mut self,
        images: &[Image],
        sink: &mut dyn ClusteringSink,
    ) -> Result<RunStatus, ClusteringError> {
        let result = self.execute(images)?;
        if !result.is_complete() {
            return Ok(RunStatus::Cancelled(result));
        }
        sink.deliver(result);
        Ok(RunStatus::Delivered)
    }

    fn process_image(
        &mut self,
        store: &mut ClusterStore,
        image: &Image,
        image_id: ImageId,
    ) -> Result<(), ClusteringError> {
        let started = Instant::now();
        let boxes = self
            .localizer
            .detect(image)
            .map_err(|source| ClusteringError::DetectionFailure {
                image: image_id,
                source,
            })?;
        self.logger.timing("detect", elapsed_ms(started));

        let crops = extract_faces(image, image_id, &boxes, self.config.degenerate_boxes)?;
        self.logger.metric("faces", crops.len() as f64);

        for crop in crops {
            let started = Instant::now();
            let embedding =
                self.embedder
                    .embed(&crop)
                    .map_err(|source| ClusteringError::EmbeddingFailure {
                        image: image_id,
                        face_index: crop.face_index(),
                        source,
                    })?;
            self.logger.timing("embed", elapsed_ms(started));

            let started = Instant::now();
            store.match_or_create(crop, embedding, image_id)?;
            self.logger.timing("match", elapsed_ms(started));
        }
        Ok(())
    }

    /// False when the progress callback asks to stop.
    fn report_progress(&self, current: usize, total: usize) -> bool {
        match self.on_progress {
            Some(ref callback) => callback(current, total),
            None => true,
        }
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
