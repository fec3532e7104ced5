use crate::catalog::domain::catalog_error::CatalogError;
use crate::catalog::domain::film::{Film, FilmDraft};
use crate::catalog::domain::film_repository::FilmRepository;
use crate::catalog::infrastructure::image_store::ImageStore;

/// An image file received with a new film.
#[derive(Clone, Debug)]
pub struct ImageUpload {
    /// Name as sent by the client; sanitized before use.
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Stores an optional uploaded image, then appends the film to the catalog.
pub struct CreateFilmUseCase<'a> {
    repository: &'a dyn FilmRepository,
    images: &'a ImageStore,
}

impl<'a> CreateFilmUseCase<'a> {
    pub fn new(repository: &'a dyn FilmRepository, images: &'a ImageStore) -> Self {
        Self { repository, images }
    }

    pub fn execute(
        &self,
        draft: FilmDraft,
        upload: Option<ImageUpload>,
    ) -> Result<Film, CatalogError> {
        let mut draft = draft.normalized();
        draft.validate()?;

        let Some(upload) = upload else {
            return self.repository.create(draft);
        };
        let stored = self.images.save(&upload.filename, &upload.bytes)?;
        draft.image = stored.clone();

        self.repository.create(draft).inspect_err(|_| {
            if let Err(e) = self.images.remove(&stored) {
                log::warn!("Cannot remove orphaned upload {stored}: {e}");
            }
        })
    }
}
