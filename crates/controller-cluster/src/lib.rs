pub mod client;
pub mod error;
pub mod fake;
pub mod gvk;
pub mod kube_client;

pub use client::{ClusterClient, ClusterInfo};
pub use error::ClusterError;
pub use fake::FakeClusterClient;
pub use kube_client::KubeClusterClient;
