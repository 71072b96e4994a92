// brewdex-aio/src/lib.rs
//! IO operations for brewdex (formula discovery, json, checksums)

pub mod checksum;
pub mod fs;
pub mod json_io;

// Re-export the primary functions
pub use checksum::{compute_sha256, verify_checksum_async, verify_checksum_sync};
pub use fs::discover_formula_files;
pub use json_io::{read_json_async, read_json_sync, write_json_async, write_json_sync};
