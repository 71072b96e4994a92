pub mod definition;

pub use definition::{Dependency, DependencyExt, DependencyPhase};
