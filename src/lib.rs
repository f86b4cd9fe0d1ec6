//! Portfolio persistence and slug resolution for the page builder.
//!
//! [`portfolio::PortfolioStore`] is the library entry point; the `devfolio`
//! binary serves it over HTTP.

pub mod app;
pub mod backend;
pub mod config;
pub mod error;
pub mod portfolio;
pub mod slug;
pub mod state;
pub mod users;

pub use error::{StorageError, StorageErrorKind, StoreError, ValidationError};
pub use portfolio::{PortfolioRecord, PortfolioStore, SlugAvailability};
