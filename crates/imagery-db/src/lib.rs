//! Imagery DB Library
//!
//! PostgreSQL implementation of [`imagery_core::ImageRepository`] plus pool
//! setup and migrations. Row mapping relies on the `sqlx` feature of
//! `imagery-core`.

pub mod images;
pub mod setup;

pub use images::PostgresImageRepository;
pub use setup::setup_database;
