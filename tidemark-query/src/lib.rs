//! Nearest-coastline queries
//!
//! [`QueryEngine`] owns the segment store and spatial index built once at
//! start-up and answers single points ([`QueryEngine::resolve`]) or whole
//! batches ([`QueryEngine::resolve_batch`]). Everything it holds is
//! read-only, so one engine can be shared across threads.

pub mod batch;
pub mod config;
pub mod engine;
pub mod error;
pub mod resolver;

pub use batch::{resolve_batch, BatchItem};
pub use config::EngineConfig;
pub use engine::QueryEngine;
pub use error::{QueryError, ResolverError};
pub use resolver::{QueryResult, Resolver};
