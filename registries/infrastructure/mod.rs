pub mod catalog;
pub mod probe;

pub use catalog::RegistrySet;
pub use probe::{run_probe, run_registry};
