// brewdex-core/src/lib.rs
pub mod formulary;
pub mod parse;
pub mod plan;
pub mod tap;

pub use formulary::Formulary;
pub use plan::{plan_install, InstallPlan, InstallStep};
pub use tap::{load_tap, load_tap_async, IngestReport, TapIngestor};
