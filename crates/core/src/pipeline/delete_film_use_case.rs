use crate::catalog::domain::catalog_error::CatalogError;
use crate::catalog::domain::film::Film;
use crate::catalog::domain::film_repository::FilmRepository;
use crate::catalog::infrastructure::image_store::ImageStore;

/// Removes a film and, unless another film still uses it, its image files.
pub struct DeleteFilmUseCase<'a> {
    repository: &'a dyn FilmRepository,
    images: &'a ImageStore,
}

impl<'a> DeleteFilmUseCase<'a> {
    pub fn new(repository: &'a dyn FilmRepository, images: &'a ImageStore) -> Self {
        Self { repository, images }
    }

    /// Returns the deleted film, or `None` if no film had that id.
    pub fn execute(&self, id: u32) -> Result<Option<Film>, CatalogError> {
        let Some(film) = self.repository.delete(id)? else {
            return Ok(None);
        };

        let shared = !film.image.is_empty()
            && self
                .repository
                .list()?
                .iter()
                .any(|other| other.image == film.image);
        if shared {
            log::info!("Keeping image {} still used by another film", film.image);
        } else {
            self.images.remove(&film.image)?;
        }
        Ok(Some(film))
    }
}
