//! Media table repositories
//!
//! `MediaRepository` is the seam between the services and storage of media
//! rows. `PgMediaRepository` talks to PostgreSQL through sqlx;
//! `InMemoryMediaRepository` backs tests and database-less setups.

pub mod memory;
pub mod postgres;
pub mod repository;

pub use memory::InMemoryMediaRepository;
pub use postgres::PgMediaRepository;
pub use repository::MediaRepository;
