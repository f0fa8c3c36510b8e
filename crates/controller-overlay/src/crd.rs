use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The instance-scoped custom resource the Parameter Client fetches.
/// `spec` carries the free-form `global`/`services` tree (§3); everything
/// else that a caller might set is preserved verbatim via `flatten`
/// rather than declared field-by-field, since this controller only cares
/// about the two recognized top-level keys.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
#[kube(
    group = "deploy.controller.example",
    version = "v1",
    kind = "DeploymentParameters",
    plural = "deploymentparameters",
    namespaced
)]
pub struct DeploymentParametersSpec {
    #[serde(flatten, default)]
    pub fields: BTreeMap<String, serde_json::Value>,
}
