//! Configuration module
//!
//! Settings live in a YAML file (`agora.yaml` by default). Nothing in it is
//! required; missing sections fall back to the defaults in `types`.

pub mod types;
pub mod loader;

pub use types::*;
pub use loader::*;
