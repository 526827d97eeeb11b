/// FaceNet embedder using ONNX Runtime.
///
/// Resizes each crop to a square input, scales pixels to [-1, 1] and
/// returns the raw model output. Layout (NCHW vs NHWC) is read from the
/// model's input shape since FaceNet exports differ.
use std::path::Path;

use crate::embedding::domain::face_embedder::FaceEmbedder;
use crate::shared::embedding::Embedding;
use crate::shared::error::BoxError;
use crate::shared::face_crop::FaceCrop;

const NORM_MEAN: f32 = 127.5;
const NORM_STD: f32 = 127.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Layout {
    Nchw,
    Nhwc,
}

pub struct OnnxFacenetEmbedder {
    session: ort::session::Session,
    input_size: usize,
    layout: Layout,
    embedding_dim: usize,
}

impl OnnxFacenetEmbedder {
    pub fn new(model_path: &Path, input_size: u32, embedding_dim: usize) -> Result<Self, BoxError> {
        let intra_threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let session = ort::session::Session::builder()?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)?
            .with_inter_threads(1)?
            .with_intra_threads(intra_threads)?
            .commit_from_file(model_path)?;

        let layout = session
            .inputs()
            .first()
            .and_then(|input| match input.dtype() {
                ort::value::ValueType::Tensor { ref shape, .. } if shape.len() == 4 => {
                    Some(if shape[1] == 3 {
                        Layout::Nchw
                    } else {
                        Layout::Nhwc
                    })
                }
                _ => None,
            })
            .unwrap_or(Layout::Nhwc);
        log::debug!("FaceNet embedder input {input_size}x{input_size} {layout:?}");

        Ok(Self {
            session,
            input_size: input_size as usize,
            layout,
            embedding_dim,
        })
    }
}

impl FaceEmbedder for OnnxFacenetEmbedder {
    fn embed(&mut self, crop: &FaceCrop) -> Result<Embedding, BoxError> {
        if crop.width() == 0 || crop.height() == 0 {
            return Err("Cannot embed an empty face crop".into());
        }
        let tensor = preprocess(crop, self.input_size, self.layout);
        let input_value = ort::value::Tensor::from_array(tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        let embedding_array = outputs[0].try_extract_array::<f32>()?;
        let values = embedding_array
            .as_slice()
            .ok_or("Cannot get embedding slice")?
            .to_vec();

        if values.len() != self.embedding_dim {
            return Err(format!(
                "FaceNet produced {} values, expected {}",
                values.len(),
                self.embedding_dim
            )
            .into());
        }
        Ok(Embedding::new(values))
    }
}

/// Nearest-neighbour resize to `size`×`size` and normalize to [-1, 1].
fn preprocess(crop: &FaceCrop, size: usize, layout: Layout) -> ndarray::Array4<f32> {
    let src_w = crop.width() as usize;
    let src_h = crop.height() as usize;
    let src = crop.as_ndarray();
    let last_channel = crop.channels().saturating_sub(1) as usize;

    let mut tensor = match layout {
        Layout::Nchw => ndarray::Array4::<f32>::zeros((1, 3, size, size)),
        Layout::Nhwc => ndarray::Array4::<f32>::zeros((1, size, size, 3)),
    };

    for y in 0..size {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / size as f64) as usize).min(src_h - 1);
        for x in 0..size {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / size as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                let value = (src[[src_y, src_x, c.min(last_channel)]] as f32 - NORM_MEAN) / NORM_STD;
                match layout {
                    Layout::Nchw => tensor[[0, c, y, x]] = value,
                    Layout::Nhwc => tensor[[0, y, x, c]] = value,
                }
            }
        }
    }

    tensor
}
