//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Each repository implements one driven port from
//! [`crate::domain::ports`]. Row structs (`models.rs`) and table definitions
//! (`schema.rs`) stay private to this module; adapters translate rows into
//! domain types and map Diesel failures into the port's error enum.
//!
//! ```ignore
//! use trip_canvas::outbound::persistence::{DbPool, DieselProposalRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/trip_canvas")).await?;
//! let proposals = DieselProposalRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_canvas_repository;
mod diesel_itinerary_repository;
mod diesel_proposal_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_canvas_repository::DieselCanvasRepository;
pub use diesel_itinerary_repository::DieselItineraryRepository;
pub use diesel_proposal_repository::DieselProposalRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
