pub const YOLO_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const YOLO_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

/// FaceNet embedding model. Not downloadable; must be placed in the model
/// cache directory or passed explicitly.
pub const FACENET_MODEL_NAME: &str = "facenet.onnx";

/// Cosine similarity a face must exceed to join an existing cluster.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;

pub const DEFAULT_EMBEDDING_DIM: usize = 128;

/// Square input edge expected by the FaceNet embedder.
pub const DEFAULT_EMBEDDER_INPUT_SIZE: u32 = 160;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
