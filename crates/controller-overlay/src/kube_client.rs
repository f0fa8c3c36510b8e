use async_trait::async_trait;
use controller_domain::{ParameterInstance, Value};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::{ListParams, Patch, PatchParams, PostParams};
use kube::{Api, Client};

use crate::client::ParameterClient;
use crate::crd::{DeploymentParameters, DeploymentParametersSpec};
use crate::error::OverlayError;

const FIELD_MANAGER: &str = "controller";
const CRD_NAME: &str = "deploymentparameters.deploy.controller.example";

fn to_instance(cr: DeploymentParameters) -> Result<ParameterInstance, OverlayError> {
    let name = cr.metadata.name.clone().unwrap_or_default();
    let namespace = cr.metadata.namespace.clone().unwrap_or_default();
    let json = serde_json::to_value(&cr.spec.fields)?;
    Ok(ParameterInstance::new(name, namespace, Value::from_json(json)))
}

fn to_fields(spec: &Value) -> std::collections::BTreeMap<String, serde_json::Value> {
    match spec.to_json() {
        serde_json::Value::Object(m) => m.into_iter().collect(),
        _ => Default::default(),
    }
}

/// `kube`-backed [`ParameterClient`]. The custom resource it fetches
/// follows the `kube::CustomResource` derive pattern of
/// `ASoldo-rust_operator`'s `RustOperator`/`akirill0v-flux-kcl-operator`'s
/// CRDs — a namespaced resource under its own group/version/kind.
pub struct KubeParameterClient {
    client: Client,
}

impl KubeParameterClient {
    pub fn new(client: Client) -> Self {
        KubeParameterClient { client }
    }

    fn api(&self, namespace: &str) -> Api<DeploymentParameters> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ParameterClient for KubeParameterClient {
    async fn get(&self, name: &str, namespace: &str) -> Result<Option<ParameterInstance>, OverlayError> {
        match self.api(namespace).get_opt(name).await? {
            Some(cr) => Ok(Some(to_instance(cr)?)),
            None => Ok(None),
        }
    }

    async fn create_with_spec(&self, name: &str, namespace: &str, spec: Value) -> Result<ParameterInstance, OverlayError> {
        let cr = DeploymentParameters::new(
            name,
            DeploymentParametersSpec {
                fields: to_fields(&spec),
            },
        );
        let created = self.api(namespace).create(&PostParams::default(), &cr).await?;
        to_instance(created)
    }

    async fn update_spec(&self, name: &str, namespace: &str, spec: Value) -> Result<ParameterInstance, OverlayError> {
        let patch = serde_json::json!({ "spec": to_fields(&spec) });
        let params = PatchParams::apply(FIELD_MANAGER).force();
        let updated = self
            .api(namespace)
            .patch(name, &params, &Patch::Merge(&patch))
            .await?;
        to_instance(updated)
    }

    async fn list(&self, namespace: &str) -> Result<Vec<ParameterInstance>, OverlayError> {
        let list = self.api(namespace).list(&ListParams::default()).await?;
        list.items.into_iter().map(to_instance).collect()
    }

    async fn get_crd_schema(&self) -> Result<Value, OverlayError> {
        let api: Api<CustomResourceDefinition> = Api::all(self.client.clone());
        let crd = api.get(CRD_NAME).await?;
        let schema = crd
            .spec
            .versions
            .into_iter()
            .find_map(|v| v.schema)
            .and_then(|s| s.open_api_v3_schema)
            .ok_or_else(|| OverlayError::NotFound(format!("{CRD_NAME} has no openAPIV3Schema")))?;
        Ok(Value::from_json(serde_json::to_value(schema)?))
    }
}
