pub mod client;
pub mod crd;
pub mod engine;
pub mod error;
pub mod fake;
pub mod kube_client;

pub use client::ParameterClient;
pub use crd::{DeploymentParameters, DeploymentParametersSpec};
pub use engine::{derive_service_name, merge, merge_descriptions, merge_schema_with_instance, rewrite_manifests};
pub use error::OverlayError;
pub use fake::InMemoryParameterClient;
pub use kube_client::KubeParameterClient;
