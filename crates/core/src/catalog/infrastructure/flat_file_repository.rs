use std::fs;
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::catalog::domain::catalog_error::CatalogError;
use crate::catalog::domain::film::{next_film_id, Film, FilmDraft};
use crate::catalog::domain::film_repository::FilmRepository;

/// Stores the catalog as one semicolon-delimited record per line.
///
/// Every mutation reads the whole file, edits the list in memory and
/// rewrites the file. A missing file reads as an empty catalog; blank
/// lines are skipped.
pub struct FlatFileRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FlatFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no broken state.
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn open_reader(&self) -> Result<Option<BufReader<fs::File>>, CatalogError> {
        match fs::File::open(&self.path) {
            Ok(file) => Ok(Some(BufReader::new(file))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CatalogError::io(&self.path, e)),
        }
    }

    fn read_all(&self) -> Result<Vec<Film>, CatalogError> {
        let Some(reader) = self.open_reader()? else {
            return Ok(Vec::new());
        };
        let mut films = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| CatalogError::io(&self.path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            films.push(Film::parse_line(idx + 1, &line)?);
        }
        Ok(films)
    }

    /// Writes all records to a `.part` sibling, then renames it over the
    /// catalog file.
    fn write_all(&self, films: &[Film]) -> Result<(), CatalogError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CatalogError::io(parent, e))?;
        }

        let temp_path = self.temp_path();
        let result = self.write_temp(&temp_path, films).and_then(|()| {
            fs::rename(&temp_path, &self.path).map_err(|e| CatalogError::io(&self.path, e))
        });
        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result
    }

    fn write_temp(&self, temp_path: &Path, films: &[Film]) -> Result<(), CatalogError> {
        let io_err = |e| CatalogError::io(temp_path, e);
        let mut file = fs::File::create(temp_path).map_err(io_err)?;
        let mut contents = String::new();
        for film in films {
            contents.push_str(&film.to_line());
            contents.push('\n');
        }
        file.write_all(contents.as_bytes()).map_err(io_err)?;
        file.flush().map_err(io_err)?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".part");
        self.path.with_file_name(name)
    }
}

impl FilmRepository for FlatFileRepository {
    fn list(&self) -> Result<Vec<Film>, CatalogError> {
        self.read_all()
    }

    fn get(&self, id: u32) -> Result<Option<Film>, CatalogError> {
        let Some(reader) = self.open_reader()? else {
            return Ok(None);
        };
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| CatalogError::io(&self.path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            let film = Film::parse_line(idx + 1, &line)?;
            if film.id == id {
                return Ok(Some(film));
            }
        }
        Ok(None)
    }

    fn create(&self, draft: FilmDraft) -> Result<Film, CatalogError> {
        let _guard = self.lock();
        let mut films = self.read_all()?;
        let film = Film::from_draft(next_film_id(&films), draft);
        films.push(film.clone());
        self.write_all(&films)?;
        log::info!("Added film {} ({})", film.id, film.title);
        Ok(film)
    }

    fn update(&self, id: u32, draft: FilmDraft) -> Result<Film, CatalogError> {
        let _guard = self.lock();
        let mut films = self.read_all()?;
        let film = films
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(CatalogError::NotFound(id))?;
        film.apply(draft);
        let updated = film.clone();
        self.write_all(&films)?;
        log::info!("Updated film {id}");
        Ok(updated)
    }

    fn delete(&self, id: u32) -> Result<Option<Film>, CatalogError> {
        let _guard = self.lock();
        let mut films = self.read_all()?;
        let Some(pos) = films.iter().position(|f| f.id == id) else {
            return Ok(None);
        };
        let removed = films.remove(pos);
        self.write_all(&films)?;
        log::info!("Deleted film {id}");
        Ok(Some(removed))
    }
}
