pub mod backoff;
pub mod error;
pub mod order;
pub mod preflight;
pub mod reconciler;
pub mod singleflight;

pub use backoff::{delay_for_attempt, BackoffConfig};
pub use error::ReconcileError;
pub use order::kind_rank;
pub use preflight::{run_preflight, Overall, PreflightReport, RequirementResult};
pub use reconciler::Reconciler;
pub use singleflight::SingleFlight;
