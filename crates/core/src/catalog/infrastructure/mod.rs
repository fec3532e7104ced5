pub mod flat_file_repository;
pub mod image_store;
