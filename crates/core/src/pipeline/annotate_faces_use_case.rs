use std::path::Path;

use serde::Serialize;

use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::catalog::domain::film::Film;
use crate::catalog::infrastructure::image_store::ImageStore;
use crate::detection::domain::face_detector::FaceDetector;
use crate::imaging::domain::image_reader::ImageReader;
use crate::imaging::domain::image_writer::ImageWriter;
use crate::shared::region::{Region, DEFAULT_IOU_THRESHOLD};

/// Outcome of annotating one film image.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FaceAnnotation {
    /// Filename of the annotated copy inside the upload folder.
    pub faces_image: String,
    pub num_faces: usize,
}

/// Single-image annotation pipeline: read → detect → deduplicate → draw → write.
pub struct AnnotateFacesUseCase {
    reader: Box<dyn ImageReader>,
    image_writer: Box<dyn ImageWriter>,
    detector: Box<dyn FaceDetector>,
    annotator: Box<dyn FrameAnnotator>,
}

impl AnnotateFacesUseCase {
    pub fn new(
        reader: Box<dyn ImageReader>,
        image_writer: Box<dyn ImageWriter>,
        detector: Box<dyn FaceDetector>,
        annotator: Box<dyn FrameAnnotator>,
    ) -> Self {
        Self {
            reader,
            image_writer,
            detector,
            annotator,
        }
    }

    /// Detects faces in `input_path`, draws their boxes and writes the result
    /// to `output_path`. Returns the number of faces drawn.
    pub fn execute(
        &mut self,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<usize, Box<dyn std::error::Error>> {
        let mut frame = self.reader.read(input_path)?;

        let regions = self.detector.detect(&frame)?;
        let faces = Region::deduplicate(&regions, DEFAULT_IOU_THRESHOLD);
        log::info!("Found {} faces!", faces.len());

        self.annotator.annotate(&mut frame, &faces)?;
        self.image_writer.write(output_path, &frame)?;

        Ok(faces.len())
    }

    /// Annotates a film's image into `faces_<image>` next to the original.
    ///
    /// Films without an image, or whose image file is gone, are skipped
    /// with `Ok(None)`.
    pub fn annotate_film(
        &mut self,
        store: &ImageStore,
        film: &Film,
    ) -> Result<Option<FaceAnnotation>, Box<dyn std::error::Error>> {
        if film.image.is_empty() {
            return Ok(None);
        }
        if !store.exists(&film.image) {
            log::warn!(
                "Image {} of film {} is missing, skipping face detection",
                film.image,
                film.id
            );
            return Ok(None);
        }

        let faces_image = ImageStore::annotated_name(&film.image);
        let num_faces = self.execute(&store.path(&film.image), &store.path(&faces_image))?;
        Ok(Some(FaceAnnotation {
            faces_image,
            num_faces,
        }))
    }
}
