// brewdex-common/src/lib.rs
pub mod cache;
pub mod config;
pub mod dependency;
pub mod error;
pub mod model;
pub mod registry;

// Re-export key types
pub use cache::Cache;
pub use config::Config;
pub use error::{BrewdexError, Result};
pub use model::{FormulaRecord, Version};
pub use registry::{FormulaRegistry, IngestError, IngestOutcome, LookupError, SharedRegistry};
