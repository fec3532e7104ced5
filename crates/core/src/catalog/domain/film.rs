use serde::{Deserialize, Serialize};

use super::catalog_error::CatalogError;
use crate::shared::constants::ANNOTATED_PREFIX;

/// Field separator of a film record line.
pub const FIELD_DELIMITER: char = ';';

const FIELD_COUNT: usize = 7;

/// A catalog entry as stored on one line of the catalog file:
/// `id;image;title;description;year;cast;director`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Film {
    pub id: u32,
    /// Filename inside the upload folder, empty when the film has no image.
    pub image: String,
    pub title: String,
    pub description: String,
    pub year: i32,
    pub cast: String,
    pub director: String,
}

/// Everything about a film except its identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilmDraft {
    pub image: String,
    pub title: String,
    pub description: String,
    pub year: i32,
    pub cast: String,
    pub director: String,
}

impl Film {
    pub fn from_draft(id: u32, draft: FilmDraft) -> Self {
        Self {
            id,
            image: draft.image,
            title: draft.title,
            description: draft.description,
            year: draft.year,
            cast: draft.cast,
            director: draft.director,
        }
    }

    /// Overwrites every field but the id.
    pub fn apply(&mut self, draft: FilmDraft) {
        self.image = draft.image;
        self.title = draft.title;
        self.description = draft.description;
        self.year = draft.year;
        self.cast = draft.cast;
        self.director = draft.director;
    }

    /// Parses one record. `line_number` is 1-based and only used in errors.
    pub fn parse_line(line_number: usize, line: &str) -> Result<Self, CatalogError> {
        let malformed = |reason: String| CatalogError::Malformed {
            line: line_number,
            reason,
        };

        let fields: Vec<&str> = line.trim().split(FIELD_DELIMITER).collect();
        if fields.len() != FIELD_COUNT {
            return Err(malformed(format!(
                "expected {FIELD_COUNT} fields, found {}",
                fields.len()
            )));
        }

        let id = fields[0]
            .trim()
            .parse::<u32>()
            .map_err(|e| malformed(format!("bad id {:?}: {e}", fields[0])))?;
        let year = fields[4]
            .trim()
            .parse::<i32>()
            .map_err(|e| malformed(format!("bad year {:?}: {e}", fields[4])))?;

        Ok(Self {
            id,
            image: fields[1].to_string(),
            title: fields[2].to_string(),
            description: fields[3].to_string(),
            year,
            cast: fields[5].to_string(),
            director: fields[6].to_string(),
        })
    }

    pub fn to_line(&self) -> String {
        format!(
            "{};{};{};{};{};{};{}",
            self.id, self.image, self.title, self.description, self.year, self.cast, self.director
        )
    }
}

impl FilmDraft {
    /// Folds line breaks into single spaces and trims the title, so form
    /// input always fits on one record line.
    pub fn normalized(self) -> Self {
        Self {
            image: single_line(&self.image).trim().to_string(),
            title: single_line(&self.title).trim().to_string(),
            description: single_line(&self.description),
            year: self.year,
            cast: single_line(&self.cast),
            director: single_line(&self.director),
        }
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.title.trim().is_empty() {
            return Err(CatalogError::Invalid("title must not be empty".into()));
        }
        if self.image.contains(['/', '\\']) || self.image.starts_with('.') {
            return Err(CatalogError::Invalid(format!(
                "image must be a plain file name, got {:?}",
                self.image
            )));
        }
        if self.image.starts_with(ANNOTATED_PREFIX) {
            return Err(CatalogError::Invalid(format!(
                "image names starting with {ANNOTATED_PREFIX:?} are reserved for annotated copies"
            )));
        }
        let fields = [
            ("image", &self.image),
            ("title", &self.title),
            ("description", &self.description),
            ("cast", &self.cast),
            ("director", &self.director),
        ];
        for (name, value) in fields {
            if value.contains(FIELD_DELIMITER) {
                return Err(CatalogError::Invalid(format!(
                    "{name} must not contain '{FIELD_DELIMITER}'"
                )));
            }
            if value.contains(['\n', '\r']) {
                return Err(CatalogError::Invalid(format!(
                    "{name} must fit on a single line"
                )));
            }
        }
        Ok(())
    }
}

/// Identifier for the next film: one past the current maximum, starting at 1.
pub fn next_film_id(films: &[Film]) -> u32 {
    films.iter().map(|f| f.id).max().map_or(1, |max| max + 1)
}

fn single_line(value: &str) -> String {
    value
        .split(['\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
