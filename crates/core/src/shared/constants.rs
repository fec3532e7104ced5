pub const CASCADE_MODEL_NAME: &str = "seeta_fd_frontal_v1.0.bin";
pub const CASCADE_MODEL_URL: &str =
    "https://github.com/atomashpolskiy/rustface/raw/master/model/seeta_fd_frontal_v1.0.bin";

pub const YOLO_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const YOLO_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

/// Directory (relative to the working directory) searched for models
/// shipped alongside the binary.
pub const BUNDLED_MODEL_DIR: &str = "models";

pub const DEFAULT_CATALOG_FILE: &str = "films.txt";

/// Uploaded images live in this subdirectory of the static root.
pub const IMAGES_SUBDIR: &str = "images";

/// Prefix of the face-annotated copy written next to each film image.
pub const ANNOTATED_PREFIX: &str = "faces_";

/// Box outline color (RGB red) and stroke width used on annotated copies.
pub const ANNOTATION_COLOR: [u8; 3] = [255, 0, 0];
pub const ANNOTATION_THICKNESS: u32 = 5;
