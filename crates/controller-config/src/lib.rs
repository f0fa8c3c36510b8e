mod loader;
mod preflight;
mod schema;
pub mod error;

pub use error::ConfigError;
pub use loader::load_manifest_library;
pub use preflight::{load_bundled_preflight_checks, parse_preflight_checks, CheckConfig, PreflightCheckDef, PreflightChecks};
pub use schema::bundled_sample_schema;
