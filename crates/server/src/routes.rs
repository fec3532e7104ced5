//! Route table and request tracing.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::handlers;
use crate::state::SharedState;

pub fn create_router(state: SharedState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);
    let body_limit = state.max_upload_bytes;

    // Events are forwarded to `log`, so env_logger prints them at the
    // default `info` filter.
    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/", get(handlers::list_films))
        .route("/health", get(handlers::health))
        .route(
            "/film/add",
            get(handlers::add_film_form).post(handlers::create_film),
        )
        .route("/film/{film_id}", get(handlers::film_detail))
        .route(
            "/film/edit/{film_id}",
            get(handlers::edit_film_form).post(handlers::update_film),
        )
        .route("/film/delete/{film_id}", post(handlers::delete_film))
        .nest_service("/static", static_files)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(trace)
        .with_state(state)
}
