// brewdex-common/src/model/mod.rs
pub mod formula;
pub mod version;

// Re-export
pub use formula::{Checksum, ChecksumAlgorithm, FormulaRecord, InstallCategory, InstallTarget};
pub use version::Version;
