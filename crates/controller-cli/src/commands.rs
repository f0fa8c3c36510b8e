use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use controller_api::{build_app, AppState};
use controller_cluster::{ClusterClient, KubeClusterClient};
use controller_overlay::{KubeParameterClient, ParameterClient};
use controller_reconciler::Reconciler;
use controller_store::{EventStore, KvBackend, ManifestStore, MemoryBackend, RedbBackend};
use kube::config::KubeConfigOptions;
use kube::{Client, Config};
use tokio::sync::mpsc;
use tracing::{info, warn};

const RESYNC_INTERVAL: Duration = Duration::from_secs(30);

async fn open_backend(store_path: &Path, ephemeral: bool) -> Result<Arc<dyn KvBackend>> {
    if ephemeral {
        info!("using in-memory (ephemeral) store; state will be lost on restart");
        return Ok(Arc::new(MemoryBackend::new()));
    }
    info!(path = %store_path.display(), "opening on-disk store");
    let backend = RedbBackend::open(store_path).with_context(|| format!("failed to open store at {}", store_path.display()))?;
    Ok(Arc::new(backend))
}

/// Same in-cluster-then-kubeconfig fallback `KubeClusterClient::try_new`
/// uses, kept here because the Parameter Client needs its own
/// `kube::Client` independent of the cluster client's.
async fn new_kube_client() -> Result<Client> {
    let config = match Config::incluster() {
        Ok(c) => c,
        Err(e) => {
            warn!("in-cluster config unavailable ({e}), falling back to kubeconfig");
            Config::from_kubeconfig(&KubeConfigOptions::default())
                .await
                .context("failed to load kubeconfig")?
        }
    };
    Client::try_from(config).context("failed to build kube client")
}

async fn seed_if_empty(manifests: &ManifestStore, manifest_dir: &Path) -> Result<()> {
    let existing = manifests.list().await?;
    if !existing.is_empty() {
        info!(count = existing.len(), "store already has manifests, skipping seed");
        return Ok(());
    }
    seed(manifests, manifest_dir).await
}

async fn seed(manifests: &ManifestStore, manifest_dir: &Path) -> Result<()> {
    let loaded = controller_config::load_manifest_library(manifest_dir)
        .with_context(|| format!("failed to load manifest library from {}", manifest_dir.display()))?;
    let mut created = 0;
    for (key, yaml_bytes) in loaded {
        match manifests.create(key.clone(), yaml_bytes).await {
            Ok(_) => created += 1,
            Err(e) => warn!("failed to seed manifest {key}: {e}"),
        }
    }
    info!(created, "seeded manifest library");
    Ok(())
}

/// The background control loop (§1, §9): drains the Manifest Store's
/// reconcile-notification channel one key at a time, and falls back to a
/// full periodic resync of every tracked manifest — the notification
/// channel is a latency optimization, never a correctness dependency
/// (§4.1/§5), so a dropped notification is made whole by the next tick.
async fn control_loop(reconciler: Arc<Reconciler>, manifests: ManifestStore, mut notify: mpsc::Receiver<controller_domain::ManifestKey>) {
    let mut ticker = tokio::time::interval(RESYNC_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            Some(key) = notify.recv() => {
                match manifests.get(&key).await {
                    Ok(Some(record)) => {
                        if let Err(e) = reconciler.deploy_manifests(&[record]).await {
                            warn!("reconcile of {key} failed: {e}");
                        }
                    }
                    Ok(None) => {
                        // The record is already gone from the store, so its
                        // kind/apiVersion can't be recovered to drive a
                        // targeted cluster delete; `/api/down` (which still
                        // holds the manifest bytes at call time) is the
                        // explicit deletion path for this case.
                        info!("manifest {key} removed from store, nothing to reconcile");
                    }
                    Err(e) => warn!("failed to read notified key {key} from store: {e}"),
                }
            }
            _ = ticker.tick() => {
                match manifests.list().await {
                    Ok(records) if !records.is_empty() => {
                        info!(count = records.len(), "periodic resync");
                        if let Err(e) = reconciler.deploy_manifests(&records).await {
                            warn!("periodic resync reported failures: {e}");
                        }
                    }
                    Ok(_) => {}
                    Err(e) => warn!("periodic resync failed to list manifests: {e}"),
                }
            }
            else => break,
        }
    }
}

pub async fn serve(bind: String, port: u16, store_path: PathBuf, manifest_dir: Option<PathBuf>, ephemeral: bool) -> Result<()> {
    let backend = open_backend(&store_path, ephemeral).await?;
    let (manifests, notify) = ManifestStore::open(backend.clone()).await.context("failed to open manifest store")?;
    let events = EventStore::new(backend);

    if let Some(dir) = &manifest_dir {
        seed_if_empty(&manifests, dir).await?;
    }

    let cluster: Arc<dyn ClusterClient> = match KubeClusterClient::try_new().await {
        Ok(c) => Arc::new(c),
        Err(e) => {
            warn!("no reachable cluster ({e}); reconciler will surface kubernetes_error until one is available");
            Arc::new(controller_cluster::FakeClusterClient::new())
        }
    };

    let parameters: Arc<dyn ParameterClient> = match new_kube_client().await {
        Ok(client) => Arc::new(KubeParameterClient::new(client)),
        Err(e) => {
            warn!("no reachable cluster for parameter client ({e}); falling back to an empty in-memory client");
            Arc::new(controller_overlay::InMemoryParameterClient::new())
        }
    };

    let reconciler = Arc::new(Reconciler::new(cluster, events.clone()));
    // The store's index rebuild in `ManifestStore::open` above is this
    // controller's "initial cache sync" (§4.5 readiness) — there is no
    // further cluster-side sync the reconciler waits on before serving.
    reconciler.set_ready(true);

    let control_loop_handle = tokio::spawn(control_loop(reconciler.clone(), manifests.clone(), notify));

    let state = AppState {
        manifests,
        events,
        reconciler,
        parameters,
        http_client: reqwest::Client::new(),
    };
    let app = build_app(state);

    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await.with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "controller listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    control_loop_handle.abort();
    Ok(())
}

pub async fn seed_command(store_path: PathBuf, manifest_dir: PathBuf) -> Result<()> {
    let backend = open_backend(&store_path, false).await?;
    let (manifests, _notify) = ManifestStore::open(backend).await.context("failed to open manifest store")?;
    seed(&manifests, &manifest_dir).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown signal received, draining in-flight requests");
}
