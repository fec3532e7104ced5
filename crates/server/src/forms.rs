//! Decoding of request inputs: film ids in paths and the add and edit
//! forms.

use axum::extract::{FromRequestParts, Multipart, Path};
use axum::http::request::Parts;
use serde::Deserialize;

use filmotheque_core::catalog::domain::film::FilmDraft;
use filmotheque_core::pipeline::create_film_use_case::ImageUpload;

use crate::handlers::AppError;

/// `{film_id}` path segment. Anything that is not a film number names no
/// film, so it is answered with 404 like an unknown id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilmId(pub u32);

impl<S> FromRequestParts<S> for FilmId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        parse_film_id(&raw).map(FilmId)
    }
}

pub fn parse_film_id(raw: &str) -> Result<u32, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("Film {raw:?} not found")))
}

/// Fields posted by the edit page. Missing fields read as empty so that
/// validation reports them instead of the extractor.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EditFilmForm {
    pub image: String,
    pub title: String,
    pub description: String,
    pub year: String,
    pub cast: String,
    pub director: String,
}

impl EditFilmForm {
    pub fn into_draft(self) -> Result<FilmDraft, AppError> {
        Ok(FilmDraft {
            year: parse_year(&self.year)?,
            image: self.image,
            title: self.title,
            description: self.description,
            cast: self.cast,
            director: self.director,
        })
    }
}

pub fn parse_year(raw: &str) -> Result<i32, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("year must be an integer, got {raw:?}")))
}

/// Reads the multipart add form. The image part is only returned when the
/// client actually chose a file.
pub async fn read_add_form(
    mut multipart: Multipart,
) -> Result<(FilmDraft, Option<ImageUpload>), AppError> {
    let mut form = EditFilmForm::default();
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                if !filename.is_empty() && !bytes.is_empty() {
                    upload = Some(ImageUpload {
                        filename,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            "title" => form.title = field.text().await?,
            "description" => form.description = field.text().await?,
            "year" => form.year = field.text().await?,
            "cast" => form.cast = field.text().await?,
            "director" => form.director = field.text().await?,
            other => log::debug!("Ignoring unexpected form field {other:?}"),
        }
    }

    Ok((form.into_draft()?, upload))
}
