//! # partstore
//!
//! Backend for a storefront selling Tesla-compatible parts: a three-level
//! category tree with aggregate product counts, a product catalog, a bulk
//! importer that files feed rows under matching (or auto-created) categories,
//! and thin contracts for the payment and shipping providers.
//!
//! ```rust,ignore
//! let db = Database::connect(&config.database_url).await?;
//! Migrator::up(&db, None).await?;
//! let app = partstore::api::router(AppState::new(db, config.default_model));
//! ```

pub mod api;
pub mod catalog;
pub mod collaborators;
pub mod config;
pub mod core;
pub mod entities;
pub mod errors;
pub mod filtering;
pub mod migration;
pub mod slug;
pub mod telemetry;
pub mod validation;
pub mod vehicle;

pub use api::AppState;
pub use core::{CRUDResource, MergeIntoActiveModel};
pub use errors::ApiError;
pub use migration::Migrator;
