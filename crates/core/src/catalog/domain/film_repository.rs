use super::catalog_error::CatalogError;
use super::film::{Film, FilmDraft};

/// Domain interface for film persistence.
pub trait FilmRepository: Send + Sync {
    /// All films in storage order.
    fn list(&self) -> Result<Vec<Film>, CatalogError>;

    fn get(&self, id: u32) -> Result<Option<Film>, CatalogError>;

    /// Stores a new film under the next free identifier.
    fn create(&self, draft: FilmDraft) -> Result<Film, CatalogError>;

    /// Replaces every field of film `id`. Fails with `NotFound` for unknown ids.
    fn update(&self, id: u32, draft: FilmDraft) -> Result<Film, CatalogError>;

    /// Removes film `id`, returning it if it existed.
    fn delete(&self, id: u32) -> Result<Option<Film>, CatalogError>;
}
