//! HTTP front-end of the film catalog: HTML pages, form handling and
//! static image serving.

pub mod config;
pub mod forms;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod templates;
