use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use filmotheque_core::annotation::infrastructure::box_annotator::BoxAnnotator;
use filmotheque_core::catalog::domain::film_repository::FilmRepository;
use filmotheque_core::catalog::infrastructure::flat_file_repository::FlatFileRepository;
use filmotheque_core::catalog::infrastructure::image_store::ImageStore;
use filmotheque_core::detection::domain::face_detector::FaceDetector;
use filmotheque_core::detection::infrastructure::detector_factory::{
    create_detector, DetectionSettings,
};
use filmotheque_core::imaging::infrastructure::image_file_reader::ImageFileReader;
use filmotheque_core::imaging::infrastructure::image_file_writer::ImageFileWriter;
use filmotheque_core::pipeline::annotate_faces_use_case::AnnotateFacesUseCase;

use crate::config::ServerConfig;
use crate::templates::Templates;

/// Shared handle passed to every handler.
pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub repository: Arc<dyn FilmRepository>,
    pub images: ImageStore,
    /// `None` when face detection is disabled.
    pub annotator: Option<Arc<Mutex<AnnotateFacesUseCase>>>,
    pub templates: Templates,
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        config: &ServerConfig,
        repository: Arc<dyn FilmRepository>,
        annotator: Option<AnnotateFacesUseCase>,
    ) -> Result<Self, minijinja::Error> {
        Ok(Self {
            repository,
            images: ImageStore::new(config.images_dir()),
            annotator: annotator.map(|uc| Arc::new(Mutex::new(uc))),
            templates: Templates::new()?,
            static_dir: config.static_dir.clone(),
            max_upload_bytes: config.max_upload_bytes,
        })
    }

    /// State backed by the configured catalog file, with a detector built
    /// from the detection settings.
    pub fn from_config(config: &ServerConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let repository = Arc::new(FlatFileRepository::new(&config.catalog_file));
        log::info!("Using catalog file {}", config.catalog_file.display());
        let annotator = build_annotator(&config.detection)?;
        Ok(Self::new(config, repository, annotator)?)
    }
}

/// Builds the face annotation pipeline, or `None` if detection is disabled.
/// May download the detection model; call before starting the async runtime.
pub fn build_annotator(
    settings: &DetectionSettings,
) -> Result<Option<AnnotateFacesUseCase>, Box<dyn std::error::Error>> {
    if !settings.enabled {
        log::info!("Face detection disabled");
        return Ok(None);
    }
    let detector = create_detector(settings, Some(Box::new(download_progress)))?;
    Ok(Some(annotation_pipeline(detector)))
}

pub fn annotation_pipeline(detector: Box<dyn FaceDetector>) -> AnnotateFacesUseCase {
    AnnotateFacesUseCase::new(
        Box::new(ImageFileReader::new()),
        Box::new(ImageFileWriter::new()),
        detector,
        Box::new(BoxAnnotator::default()),
    )
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}
