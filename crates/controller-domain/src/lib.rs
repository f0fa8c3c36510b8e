pub mod error;
pub mod event;
pub mod manifest;
pub mod parameter;
pub mod reconcile;
pub mod value;

pub use error::DomainError;
pub use event::{Event, EventType};
pub use manifest::{validate_manifest_bytes, ManifestKey, ManifestRecord};
pub use parameter::ParameterInstance;
pub use reconcile::ReconcileIntent;
pub use value::Value;
