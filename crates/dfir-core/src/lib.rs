//! dfir-core library: case records, their lifecycle, and the simulated
//! remote store behind the filing and tracking pages.
//!
//! # Conventions
//!
//! - **Errors**: Domain operations return [`error::FirError`]; file and
//!   config glue uses `anyhow::Result` with context.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).
//! - **Privacy**: Raw identity numbers never leave [`model::form::FilingForm`];
//!   records carry only their [`fingerprint`].

pub mod clock;
pub mod config;
pub mod error;
pub mod evidence;
pub mod fingerprint;
pub mod format;
pub mod lifecycle;
pub mod model;
pub mod pages;
pub mod snapshot;
pub mod store;
pub mod validate;
pub mod wallet;

pub use error::{ErrorCode, FirError};
pub use fingerprint::fingerprint;
pub use model::case::{CaseRecord, Category, Stage};
pub use store::CaseStore;
