use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use minijinja::context;
use thiserror::Error;

use filmotheque_core::catalog::domain::catalog_error::CatalogError;
use filmotheque_core::catalog::domain::film::Film;
use filmotheque_core::pipeline::annotate_faces_use_case::FaceAnnotation;
use filmotheque_core::pipeline::create_film_use_case::CreateFilmUseCase;
use filmotheque_core::pipeline::delete_film_use_case::DeleteFilmUseCase;
use filmotheque_core::pipeline::edit_film_use_case::EditFilmUseCase;

use crate::forms::{read_add_form, EditFilmForm, FilmId};
use crate::state::SharedState;
use crate::templates::Templates;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{self}");
        } else {
            log::warn!("{self}");
        }

        let page = Templates::shared().and_then(|templates| {
            templates
                .render(
                    "error.html",
                    context! {
                        status => status.as_u16(),
                        reason => status.canonical_reason().unwrap_or_default(),
                        message => self.to_string(),
                    },
                )
                .map_err(|e| e.to_string())
        });
        match page {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                log::error!("Failed to render error page: {e}");
                (status, self.to_string()).into_response()
            }
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(id) => AppError::NotFound(format!("Film {id} not found")),
            CatalogError::Invalid(msg) => AppError::BadRequest(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(err.body_text())
        } else {
            AppError::BadRequest(err.body_text())
        }
    }
}

impl From<minijinja::Error> for AppError {
    fn from(err: minijinja::Error) -> Self {
        AppError::Internal(format!("template rendering failed: {err}"))
    }
}

/// Runs catalog file I/O off the async executor.
async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("worker task failed: {e}")))?
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn list_films(State(state): State<SharedState>) -> Result<Html<String>, AppError> {
    let repo = state.repository.clone();
    let films = run_blocking(move || Ok(repo.list()?)).await?;
    Ok(Html(
        state.templates.render("home.html", context! { films })?,
    ))
}

pub async fn film_detail(
    State(state): State<SharedState>,
    FilmId(film_id): FilmId,
) -> Result<Html<String>, AppError> {
    let repo = state.repository.clone();
    let film = run_blocking(move || Ok(repo.get(film_id)?))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Film {film_id} not found")))?;

    let faces = annotate(&state, &film).await;

    Ok(Html(state.templates.render(
        "film_detail.html",
        context! { film, faces },
    )?))
}

/// Draws detected faces onto the film's image. Detection problems are
/// logged and the page falls back to the plain image.
async fn annotate(state: &SharedState, film: &Film) -> Option<FaceAnnotation> {
    let annotator = state.annotator.clone()?;
    let worker_state = state.clone();
    let film_for_worker = film.clone();

    let outcome = tokio::task::spawn_blocking(move || {
        let mut use_case = annotator
            .lock()
            .map_err(|_| "face detector lock poisoned".to_string())?;
        use_case
            .annotate_film(&worker_state.images, &film_for_worker)
            .map_err(|e| e.to_string())
    })
    .await;

    match outcome {
        Ok(Ok(faces)) => faces,
        Ok(Err(e)) => {
            log::warn!("Face detection failed for film {}: {e}", film.id);
            None
        }
        Err(e) => {
            log::error!("Face detection task failed for film {}: {e}", film.id);
            None
        }
    }
}

pub async fn add_film_form(State(state): State<SharedState>) -> Result<Html<String>, AppError> {
    Ok(Html(state.templates.render("film_add.html", context! {})?))
}

pub async fn create_film(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let (draft, upload) = read_add_form(multipart).await?;
    let worker_state = state.clone();
    let film = run_blocking(move || {
        Ok(
            CreateFilmUseCase::new(worker_state.repository.as_ref(), &worker_state.images)
                .execute(draft, upload)?,
        )
    })
    .await?;
    Ok(Redirect::to(&format!("/film/{}", film.id)))
}

pub async fn edit_film_form(
    State(state): State<SharedState>,
    FilmId(film_id): FilmId,
) -> Result<Html<String>, AppError> {
    let repo = state.repository.clone();
    let film = run_blocking(move || Ok(repo.get(film_id)?))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Film {film_id} not found")))?;
    Ok(Html(
        state.templates.render("film_edit.html", context! { film })?,
    ))
}

pub async fn update_film(
    State(state): State<SharedState>,
    FilmId(film_id): FilmId,
    Form(form): Form<EditFilmForm>,
) -> Result<Redirect, AppError> {
    let draft = form.into_draft()?;
    let repo = state.repository.clone();
    run_blocking(move || Ok(EditFilmUseCase::new(repo.as_ref()).execute(film_id, draft)?))
        .await?;
    Ok(Redirect::to(&format!("/film/{film_id}")))
}

pub async fn delete_film(
    State(state): State<SharedState>,
    FilmId(film_id): FilmId,
) -> Result<Redirect, AppError> {
    let worker_state = state.clone();
    let removed = run_blocking(move || {
        Ok(
            DeleteFilmUseCase::new(worker_state.repository.as_ref(), &worker_state.images)
                .execute(film_id)?,
        )
    })
    .await?;
    if removed.is_none() {
        log::info!("Film {film_id} was already absent");
    }
    Ok(Redirect::to("/"))
}
