use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use controller_domain::{ParameterInstance, Value};
use tokio::sync::RwLock;

use crate::client::ParameterClient;
use crate::error::OverlayError;

/// In-memory [`ParameterClient`] for tests. Deep-copies on every read so
/// the no-aliasing guarantee (§4.3, §8) holds the same way it would
/// against a real cluster-backed implementation.
#[derive(Clone, Default)]
pub struct InMemoryParameterClient {
    instances: Arc<RwLock<HashMap<(String, String), ParameterInstance>>>,
    schema: Arc<RwLock<Option<Value>>>,
}

impl InMemoryParameterClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_schema(&self, schema: Value) {
        *self.schema.write().await = Some(schema);
    }
}

#[async_trait]
impl ParameterClient for InMemoryParameterClient {
    async fn get(&self, name: &str, namespace: &str) -> Result<Option<ParameterInstance>, OverlayError> {
        let guard = self.instances.read().await;
        Ok(guard.get(&(namespace.to_string(), name.to_string())).map(|i| ParameterInstance {
            spec: i.spec.deep_clone(),
            ..i.clone()
        }))
    }

    async fn create_with_spec(&self, name: &str, namespace: &str, spec: Value) -> Result<ParameterInstance, OverlayError> {
        let instance = ParameterInstance::new(name, namespace, spec);
        self.instances
            .write()
            .await
            .insert((namespace.to_string(), name.to_string()), instance.clone());
        Ok(instance)
    }

    async fn update_spec(&self, name: &str, namespace: &str, spec: Value) -> Result<ParameterInstance, OverlayError> {
        let mut guard = self.instances.write().await;
        let key = (namespace.to_string(), name.to_string());
        let instance = guard
            .get_mut(&key)
            .ok_or_else(|| OverlayError::NotFound(format!("{namespace}/{name}")))?;
        instance.spec = spec;
        Ok(instance.clone())
    }

    async fn list(&self, namespace: &str) -> Result<Vec<ParameterInstance>, OverlayError> {
        let guard = self.instances.read().await;
        Ok(guard
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, i)| i.clone())
            .collect())
    }

    async fn get_crd_schema(&self) -> Result<Value, OverlayError> {
        self.schema
            .read()
            .await
            .clone()
            .ok_or_else(|| OverlayError::NotFound("no schema configured on fake client".into()))
    }
}
