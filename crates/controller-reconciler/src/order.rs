/// The fixed, finite dependency-order table from §4.5: `DeployManifests`/
/// `UpdateManifests` apply in ascending rank order, `DeleteManifests`
/// applies in descending (reverse) rank order. This is an explicit
/// per-Kind lookup, not a general dependency graph (§9 open question
/// #2) — there is no user-declared cross-resource graph for this
/// controller to resolve.
pub fn kind_rank(kind: &str) -> u8 {
    match kind {
        "Namespace" => 0,
        "CustomResourceDefinition" | "ClusterRole" | "ClusterRoleBinding" | "Role" | "RoleBinding" | "ServiceAccount" => 1,
        "ConfigMap" | "Secret" | "PersistentVolumeClaim" => 2,
        "Service" => 3,
        "Deployment" | "StatefulSet" | "DaemonSet" | "Job" | "CronJob" => 4,
        "Ingress" => 5,
        _ => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaces_rank_before_workloads() {
        assert!(kind_rank("Namespace") < kind_rank("Deployment"));
    }

    #[test]
    fn configmaps_rank_before_services_rank_before_workloads_rank_before_ingress() {
        assert!(kind_rank("ConfigMap") < kind_rank("Service"));
        assert!(kind_rank("Service") < kind_rank("Deployment"));
        assert!(kind_rank("Deployment") < kind_rank("Ingress"));
    }

    #[test]
    fn unknown_kinds_rank_last() {
        assert!(kind_rank("Ingress") < kind_rank("SomeCustomKind"));
    }
}
