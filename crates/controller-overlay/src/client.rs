use async_trait::async_trait;
use controller_domain::{ParameterInstance, Value};

use crate::error::OverlayError;

/// Fetches the instance-scoped parameter custom resource (§4.3). The
/// cluster client itself is a narrow collaborator elsewhere in the
/// workspace ([`controller_cluster`]); this trait is specific to the one
/// resource kind the Overlay Engine depends on.
#[async_trait]
pub trait ParameterClient: Send + Sync + 'static {
    /// Absent without error when the instance doesn't exist.
    async fn get(&self, name: &str, namespace: &str) -> Result<Option<ParameterInstance>, OverlayError>;

    /// Convenience over `get`; always returns an owned deep copy, never a
    /// reference into any cache the implementation keeps.
    async fn get_spec(&self, name: &str, namespace: &str) -> Result<Option<Value>, OverlayError> {
        Ok(self.get(name, namespace).await?.map(|i| i.spec.deep_clone()))
    }

    async fn create_with_spec(&self, name: &str, namespace: &str, spec: Value) -> Result<ParameterInstance, OverlayError>;

    async fn update_spec(&self, name: &str, namespace: &str, spec: Value) -> Result<ParameterInstance, OverlayError>;

    async fn list(&self, namespace: &str) -> Result<Vec<ParameterInstance>, OverlayError>;

    /// May fail; callers (the façade) substitute `controller_config`'s
    /// bundled sample schema when this errors.
    async fn get_crd_schema(&self) -> Result<Value, OverlayError>;
}
