/// YOLO face localizer using ONNX Runtime via `ort`.
///
/// Letterboxes the image to the model input, runs inference, drops
/// low-confidence rows and applies NMS. Boxes come back in descending
/// confidence order, which is the order faces are then clustered in.
use std::path::Path;

use crate::detection::domain::face_localizer::FaceLocalizer;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::error::BoxError;
use crate::shared::image::Image;

/// Fallback input resolution when the model input shape is dynamic.
const DEFAULT_INPUT_SIZE: u32 = 640;

pub const DEFAULT_CONFIDENCE: f64 = 0.5;

const NMS_IOU_THRESH: f64 = 0.45;

/// Letterbox fill value, YOLO convention.
const PAD_VALUE: f32 = 114.0 / 255.0;

pub struct OnnxYoloLocalizer {
    session: ort::session::Session,
    confidence: f64,
    input_size: u32,
}

impl OnnxYoloLocalizer {
    /// Loads the model once; the session is reused for every image.
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, BoxError> {
        let session = ort::session::Session::builder()?.commit_from_file(model_path)?;

        // NCHW: [1, 3, H, W]
        let input_size = session
            .inputs()
            .first()
            .and_then(|input| match input.dtype() {
                ort::value::ValueType::Tensor { ref shape, .. }
                    if shape.len() >= 4 && shape[2] > 0 =>
                {
                    Some(shape[2] as u32)
                }
                _ => None,
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);
        log::debug!("YOLO localizer input size {input_size}");

        Ok(Self {
            session,
            confidence,
            input_size,
        })
    }
}

impl FaceLocalizer for OnnxYoloLocalizer {
    fn detect(&mut self, image: &Image) -> Result<Vec<BoundingBox>, BoxError> {
        if image.width() == 0 || image.height() == 0 {
            return Ok(Vec::new());
        }
        let (input_tensor, letterbox) = letterbox(image, self.input_size);

        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("YOLO model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape().to_vec();
        if shape.len() != 3 {
            return Err(format!("Unexpected YOLO output shape: {shape:?}").into());
        }

        // Either [1, features, detections] or [1, detections, features].
        let transposed = shape[1] < shape[2];
        let (num_dets, num_feats) = if transposed {
            (shape[2], shape[1])
        } else {
            (shape[1], shape[2])
        };
        if num_feats < 5 {
            return Err(format!("YOLO output has too few features: {shape:?}").into());
        }
        let data = tensor.as_slice().ok_or("Cannot get tensor slice")?;
        let feature = |det: usize, f: usize| -> f64 {
            if transposed {
                data[f * num_dets + det] as f64
            } else {
                data[det * num_feats + f] as f64
            }
        };

        // Row layout: [cx, cy, w, h, conf, ...keypoints]
        let mut candidates = Vec::new();
        for i in 0..num_dets {
            let confidence = feature(i, 4);
            if confidence < self.confidence {
                continue;
            }
            let (cx, cy, w, h) = (feature(i, 0), feature(i, 1), feature(i, 2), feature(i, 3));
            candidates.push(Candidate {
                bbox: [
                    letterbox.to_source_x(cx - w / 2.0),
                    letterbox.to_source_y(cy - h / 2.0),
                    letterbox.to_source_x(cx + w / 2.0),
                    letterbox.to_source_y(cy + h / 2.0),
                ],
                confidence,
            });
        }

        let kept = nms(&mut candidates, NMS_IOU_THRESH);
        log::debug!("YOLO kept {} of {} candidate faces", kept.len(), candidates.len());

        Ok(kept
            .iter()
            .map(|c| BoundingBox::from_corners(c.bbox[0], c.bbox[1], c.bbox[2], c.bbox[3]))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Mapping between letterboxed model coordinates and source pixels.
#[derive(Clone, Copy, Debug)]
struct Letterbox {
    scale: f64,
    pad_x: u32,
    pad_y: u32,
}

impl Letterbox {
    fn to_source_x(&self, x: f64) -> f64 {
        (x - self.pad_x as f64) / self.scale
    }

    fn to_source_y(&self, y: f64) -> f64 {
        (y - self.pad_y as f64) / self.scale
    }
}

/// Aspect-preserving nearest-neighbour resize onto a padded square, as NCHW f32 in [0, 1].
fn letterbox(image: &Image, target_size: u32) -> (ndarray::Array4<f32>, Letterbox) {
    let iw = image.width() as f64;
    let ih = image.height() as f64;
    let target = target_size as f64;

    let scale = (target / iw).min(target / ih);
    let new_w = ((iw * scale).round() as u32).min(target_size);
    let new_h = ((ih * scale).round() as u32).min(target_size);
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    let mut tensor = ndarray::Array4::<f32>::from_elem(
        (1, 3, target_size as usize, target_size as usize),
        PAD_VALUE,
    );

    let src = image.as_ndarray();
    let src_h = image.height() as usize;
    let src_w = image.width() as usize;
    // Grayscale images feed the same channel to all three planes.
    let last_channel = image.channels().saturating_sub(1) as usize;

    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = src[[src_y, src_x, c.min(last_channel)]] as f32 / 255.0;
            }
        }
    }

    (
        tensor,
        Letterbox {
            scale,
            pad_x,
            pad_y,
        },
    )
}

// ---------------------------------------------------------------------------
// NMS
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct Candidate {
    bbox: [f64; 4],
    confidence: f64,
}

/// Intersection over union of two `[x1, y1, x2, y2]` boxes; 0.0 when
/// they do not overlap or have no area.
fn iou(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    let overlap_w = (a[2].min(b[2]) - a[0].max(b[0])).max(0.0);
    let overlap_h = (a[3].min(b[3]) - a[1].max(b[1])).max(0.0);
    let inter = overlap_w * overlap_h;
    let union = (a[2] - a[0]) * (a[3] - a[1]) + (b[2] - b[0]) * (b[3] - b[1]) - inter;
    if inter <= 0.0 || union <= 0.0 {
        return 0.0;
    }
    inter / union
}

/// Greedy NMS: sort by confidence descending, suppress overlapping boxes.
fn nms(candidates: &mut [Candidate], iou_thresh: f64) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep: Vec<Candidate> = Vec::new();
    for candidate in candidates.iter() {
        if keep
            .iter()
            .all(|k| iou(&k.bbox, &candidate.bbox) <= iou_thresh)
        {
            keep.push(candidate.clone());
        }
    }
    keep
}
