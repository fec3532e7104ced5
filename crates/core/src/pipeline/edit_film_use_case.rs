use crate::catalog::domain::catalog_error::CatalogError;
use crate::catalog::domain::film::{Film, FilmDraft};
use crate::catalog::domain::film_repository::FilmRepository;

/// Replaces the fields of an existing film with edited values.
pub struct EditFilmUseCase<'a> {
    repository: &'a dyn FilmRepository,
}

impl<'a> EditFilmUseCase<'a> {
    pub fn new(repository: &'a dyn FilmRepository) -> Self {
        Self { repository }
    }

    pub fn execute(&self, id: u32, draft: FilmDraft) -> Result<Film, CatalogError> {
        let draft = draft.normalized();
        draft.validate()?;
        self.repository.update(id, draft)
    }
}
