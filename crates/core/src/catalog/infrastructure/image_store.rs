use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::catalog::domain::catalog_error::CatalogError;
use crate::shared::constants::ANNOTATED_PREFIX;

/// Upload folder holding film images and their face-annotated copies.
#[derive(Clone, Debug)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        !name.is_empty() && self.path(name).is_file()
    }

    /// Name of the annotated copy written next to `name`.
    pub fn annotated_name(name: &str) -> String {
        format!("{ANNOTATED_PREFIX}{name}")
    }

    /// Stores an uploaded file under its sanitized name and returns that name.
    ///
    /// An existing file with the same name is overwritten.
    pub fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, CatalogError> {
        let name = sanitize_filename(original_name);
        if name.is_empty() {
            return Err(CatalogError::Invalid(format!(
                "unusable image filename {original_name:?}"
            )));
        }
        if name.starts_with(ANNOTATED_PREFIX) {
            return Err(CatalogError::Invalid(format!(
                "image filename {name:?} clashes with annotated copies"
            )));
        }
        fs::create_dir_all(&self.root).map_err(|e| CatalogError::io(&self.root, e))?;
        let path = self.path(&name);
        fs::write(&path, bytes).map_err(|e| CatalogError::io(&path, e))?;
        log::info!("Stored image {} ({} bytes)", path.display(), bytes.len());
        Ok(name)
    }

    /// Deletes an image and its annotated copy. Missing files are ignored.
    pub fn remove(&self, name: &str) -> Result<(), CatalogError> {
        if name.is_empty() {
            return Ok(());
        }
        for candidate in [name.to_string(), Self::annotated_name(name)] {
            let path = self.path(&candidate);
            match fs::remove_file(&path) {
                Ok(()) => log::info!("Removed image {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(CatalogError::io(&path, e)),
            }
        }
        Ok(())
    }
}

/// Reduces a client-supplied filename to a flat, ASCII-only name that is
/// safe to join onto the upload folder.
///
/// Path separators and whitespace become `_`, anything outside
/// `[A-Za-z0-9_.-]` is dropped and leading/trailing `.`/`_` are stripped,
/// so `../../etc/passwd` becomes `etc_passwd`. The result may be empty.
pub fn sanitize_filename(name: &str) -> String {
    let spaced: String = name
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}
