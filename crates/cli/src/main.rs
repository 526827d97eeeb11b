mod report;

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use facegroup_core::detection::infrastructure::onnx_yolo_localizer::{
    OnnxYoloLocalizer, DEFAULT_CONFIDENCE,
};
use facegroup_core::embedding::infrastructure::onnx_facenet_embedder::OnnxFacenetEmbedder;
use facegroup_core::io::domain::image_reader::ImageReader;
use facegroup_core::io::infrastructure::image_file_reader::{is_image, list_images, ImageFileReader};
use facegroup_core::io::infrastructure::image_file_writer::ImageFileWriter;
use facegroup_core::pipeline::cluster_faces_use_case::ClusterFacesUseCase;
use facegroup_core::pipeline::infrastructure::background_worker::{self, WorkerMessage};
use facegroup_core::pipeline::pipeline_logger::LogPipelineLogger;
use facegroup_core::shared::config::{ClusteringConfig, DegenerateBoxPolicy, MatchPolicy};
use facegroup_core::shared::error::{BoxError, ClusteringError};
use facegroup_core::shared::image::Image;
use facegroup_core::shared::model_resolver::{
    self, ModelSpec, FACE_EMBEDDER_MODEL, FACE_LOCALIZER_MODEL,
};

use report::ReportWriter;

/// Group photos by the people that appear in them.
#[derive(Parser)]
#[command(name = "facegroup")]
struct Cli {
    /// Photos to group, or directories containing them.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory for face thumbnails and clusters.json.
    #[arg(long, short)]
    output: PathBuf,

    /// JSON config file (default: per-user config if present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cosine similarity a face must exceed to join a cluster (-1.0-1.0).
    #[arg(long)]
    threshold: Option<f64>,

    /// Join the most similar cluster instead of the first one above threshold.
    #[arg(long)]
    best_match: bool,

    /// Abort on a detected box that is empty after clamping instead of skipping it.
    #[arg(long)]
    strict_boxes: bool,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    confidence: f64,

    /// Directory searched for model files not in the user cache.
    #[arg(long)]
    models_dir: Option<PathBuf>,

    /// Face detection model, skipping model resolution.
    #[arg(long)]
    detector_model: Option<PathBuf>,

    /// Face embedding model, skipping model resolution.
    #[arg(long)]
    embedder_model: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), BoxError> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = build_config(&cli)?;
    let paths = collect_inputs(&cli.inputs)?;
    if paths.is_empty() {
        return Err("No images found in the given inputs".into());
    }
    let images = read_images(&paths)?;

    let detector_path = model_path(cli.detector_model.as_deref(), &FACE_LOCALIZER_MODEL, &cli)?;
    let embedder_path = model_path(cli.embedder_model.as_deref(), &FACE_EMBEDDER_MODEL, &cli)?;

    let localizer = OnnxYoloLocalizer::new(&detector_path, cli.confidence)?;
    let embedder = OnnxFacenetEmbedder::new(
        &embedder_path,
        config.embedder_input_size,
        config.embedding_dim,
    )?;
    let use_case =
        ClusterFacesUseCase::new(Box::new(localizer), Box::new(embedder), config.clone())?
            .with_logger(Box::new(LogPipelineLogger::default()));

    let (rx, _cancel) = background_worker::spawn(use_case, images);
    for message in rx {
        match message {
            WorkerMessage::Progress(current, total) => {
                eprint!("\rScanning photo {current}/{total}");
            }
            WorkerMessage::Complete(result) => {
                eprintln!();
                let writer = ReportWriter::new(cli.output.clone(), Box::new(ImageFileWriter::new()));
                let manifest = writer.write(&result, &paths, &config)?;
                log::info!(
                    "Found {} distinct faces in {} photos, report written to {}",
                    result.len(),
                    result.images_processed(),
                    manifest.display()
                );
                return Ok(());
            }
            WorkerMessage::Cancelled(partial) => {
                eprintln!();
                return Err(format!(
                    "Clustering cancelled after {}/{} photos",
                    partial.images_processed(),
                    partial.images_total()
                )
                .into());
            }
            WorkerMessage::Failed(e) => {
                eprintln!();
                return Err(describe_failure(e, &paths).into());
            }
        }
    }
    Err("Clustering worker stopped without a result".into())
}

fn build_config(cli: &Cli) -> Result<ClusteringConfig, BoxError> {
    let mut config = match &cli.config {
        Some(path) => ClusteringConfig::load(path)?,
        None => ClusteringConfig::load_or_default()?,
    };
    if let Some(threshold) = cli.threshold {
        config.similarity_threshold = threshold;
    }
    if cli.best_match {
        config.match_policy = MatchPolicy::BestMatch;
    }
    if cli.strict_boxes {
        config.degenerate_boxes = DegenerateBoxPolicy::Fail;
    }
    config.validate()?;
    Ok(config)
}

/// Expands directories into their images; explicit files are kept as given.
fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, BoxError> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            paths.extend(list_images(input)?);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}

fn read_images(paths: &[PathBuf]) -> Result<Vec<Image>, BoxError> {
    let reader = ImageFileReader::new();
    paths
        .iter()
        .map(|path| {
            reader
                .read(path)
                .map_err(|e| BoxError::from(format!("Failed to read {}: {e}", path.display())))
        })
        .collect()
}

fn model_path(
    explicit: Option<&Path>,
    model: &ModelSpec,
    cli: &Cli,
) -> Result<PathBuf, BoxError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    log::info!("Resolving model: {}", model.name);
    let path = model_resolver::resolve(
        model,
        cli.models_dir.as_deref(),
        Some(Box::new(download_progress)),
    )?;
    Ok(path)
}

/// Names the photo an error refers to instead of its position in the batch.
fn describe_failure(error: ClusteringError, paths: &[PathBuf]) -> String {
    match error.image().and_then(|id| paths.get(id.0)) {
        Some(path) => format!("{error} ({})", path.display()),
        None => error.to_string(),
    }
}

fn validate(cli: &Cli) -> Result<(), BoxError> {
    for input in &cli.inputs {
        if !input.exists() {
            return Err(format!("Input not found: {}", input.display()).into());
        }
        if input.is_file() && !is_image(input) {
            return Err(format!("Not a supported image file: {}", input.display()).into());
        }
    }
    if cli.output.is_file() {
        return Err(format!("Output must be a directory: {}", cli.output.display()).into());
    }
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )
        .into());
    }
    for model in [&cli.detector_model, &cli.embedder_model].into_iter().flatten() {
        if !model.is_file() {
            return Err(format!("Model file not found: {}", model.display()).into());
        }
    }
    if let Some(dir) = &cli.models_dir {
        if !dir.is_dir() {
            return Err(format!("Models directory not found: {}", dir.display()).into());
        }
    }
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading model... {pct}%");
    } else {
        eprint!("\rDownloading model... {downloaded} bytes");
    }
}
