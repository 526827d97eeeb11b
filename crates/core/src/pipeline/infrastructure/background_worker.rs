use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};

use crate::clustering::domain::clustering_result::ClusteringResult;
use crate::pipeline::cluster_faces_use_case::ClusterFacesUseCase;
use crate::pipeline::clustering_sink::{ClusteringSink, RunStatus};
use crate::shared::error::ClusteringError;
use crate::shared::image::Image;

/// Events emitted by a clustering pass running off the caller's thread.
///
/// Exactly one of `Complete`, `Cancelled` or `Failed` ends the stream.
#[derive(Debug)]
pub enum WorkerMessage {
    Progress(usize, usize),
    Complete(ClusteringResult),
    Cancelled(ClusteringResult),
    Failed(ClusteringError),
}

/// Delivers the finished result over the worker channel.
struct ChannelSink {
    tx: Sender<WorkerMessage>,
}

impl ClusteringSink for ChannelSink {
    fn deliver(&mut self, result: ClusteringResult) {
        let _ = self.tx.send(WorkerMessage::Complete(result));
    }
}

/// Runs the pass on a dedicated thread so the caller (UI, CLI spinner)
/// never blocks on inference.
///
/// The pass itself stays sequential. Setting the returned flag cancels it
/// before the next image; dropping the receiver does the same.
pub fn spawn(
    use_case: ClusterFacesUseCase,
    images: Vec<Image>,
) -> (Receiver<WorkerMessage>, Arc<AtomicBool>) {
    let (tx, rx) = crossbeam_channel::unbounded::<WorkerMessage>();
    let cancelled = use_case.cancellation_token();

    let progress_tx = tx.clone();
    let mut use_case = use_case.with_progress(Box::new(move |current: usize, total: usize| {
        progress_tx
            .send(WorkerMessage::Progress(current, total))
            .is_ok()
    }));

    thread::spawn(move || {
        let mut sink = ChannelSink { tx: tx.clone() };
        let last = match use_case.execute_into(&images, &mut sink) {
            Ok(RunStatus::Delivered) => return,
            Ok(RunStatus::Cancelled(partial)) => WorkerMessage::Cancelled(partial),
            Err(e) => {
                log::error!("Clustering failed: {e}");
                WorkerMessage::Failed(e)
            }
        };
        let _ = tx.send(last);
    });

    (rx, cancelled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use crate::detection::domain::face_localizer::FaceLocalizer;
    use crate::embedding::domain::face_embedder::FaceEmbedder;
    use crate::shared::bounding_box::BoundingBox;
    use crate::shared::config::ClusteringConfig;
    use crate::shared::embedding::Embedding;
    use crate::shared::error::BoxError;
    use crate::shared::face_crop::FaceCrop;

    /// Reports the whole image as one face; fails on all-black images.
    struct WholeImageLocalizer {
        delay: Duration,
    }

    impl FaceLocalizer for WholeImageLocalizer {
        fn detect(&mut self, image: &Image) -> Result<Vec<BoundingBox>, BoxError> {
            thread::sleep(self.delay);
            if image.data()[0] == 0 {
                return Err("no light".into());
            }
            Ok(vec![BoundingBox::new(
                0,
                0,
                image.width() as i32,
                image.height() as i32,
            )])
        }
    }

    /// Embeds by brightness: 1 and 2 point the same way, 3 is orthogonal.
    struct BrightnessEmbedder;

    impl FaceEmbedder for BrightnessEmbedder {
        fn embed(&mut self, crop: &FaceCrop) -> Result<Embedding, BoxError> {
            let v = if crop.data()[0] < 3 {
                vec![1.0, 0.0]
            } else {
                vec![0.0, 1.0]
            };
            Ok(Embedding::new(v))
        }
    }

    fn image(value: u8) -> Image {
        Image::new(vec![value; 4 * 4 * 3], 4, 4, 3)
    }

    fn use_case(delay: Duration) -> ClusterFacesUseCase {
        let config = ClusteringConfig {
            embedding_dim: 2,
            ..ClusteringConfig::default()
        };
        ClusterFacesUseCase::new(
            Box::new(WholeImageLocalizer { delay }),
            Box::new(BrightnessEmbedder),
            config,
        )
        .unwrap()
    }

    #[test]
    fn test_progress_then_complete() {
        let (rx, _cancel) = spawn(use_case(Duration::ZERO), vec![image(1), image(2), image(3)]);
        let messages: Vec<WorkerMessage> = rx.iter().collect();

        assert_eq!(messages.len(), 4);
        assert!(matches!(messages[0], WorkerMessage::Progress(1, 3)));
        assert!(matches!(messages[2], WorkerMessage::Progress(3, 3)));
        match &messages[3] {
            WorkerMessage::Complete(result) => {
                assert_eq!(result.len(), 2);
                assert!(result.is_complete());
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_failure_is_reported() {
        let (rx, _cancel) = spawn(use_case(Duration::ZERO), vec![image(1), image(0)]);
        let last = rx.iter().last().unwrap();
        match last {
            WorkerMessage::Failed(e) => assert!(e.to_string().contains("image #1")),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_cancel_flag_stops_between_images() {
        let images = (0..50).map(|_| image(1)).collect();
        let (rx, cancel) = spawn(use_case(Duration::from_millis(5)), images);

        let first = rx.recv().unwrap();
        assert!(matches!(first, WorkerMessage::Progress(1, 50)));
        cancel.store(true, Ordering::Relaxed);

        let last = rx.iter().last().unwrap();
        match last {
            WorkerMessage::Cancelled(partial) => {
                assert!(partial.images_processed() < 50);
                assert_eq!(partial.len(), 1);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_empty_input_completes() {
        let (rx, _cancel) = spawn(use_case(Duration::ZERO), Vec::new());
        match rx.recv().unwrap() {
            WorkerMessage::Complete(result) => assert!(result.is_empty()),
            other => panic!("unexpected message: {other:?}"),
        }
    }
}
