//! Main controller implementation.
//!
//! This module contains the `Controller` struct that wires the object store,
//! the reconciler, the resource watcher and the probe server together.

use crate::backoff::BackoffTracker;
use crate::config::Config;
use crate::error::ControllerError;
use crate::metrics::Metrics;
use crate::reconciler::Reconciler;
use crate::server::{self, ProbeState};
use crate::watcher::{self, Context};
use kube::{Api, Client};
use kube_runtime::controller::Config as ControllerConfig;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use typed_store::{KubeObjectStore, TypeRegistry};

/// Main controller for reference management.
pub struct Controller {
    watcher: JoinHandle<()>,
    server: JoinHandle<Result<(), ControllerError>>,
    cancel: CancellationToken,
}

impl Controller {
    /// Creates a new controller instance and starts its background tasks.
    pub async fn new(config: Config) -> Result<Self, ControllerError> {
        info!("Initializing Reference Controller");

        let kube_client = Client::try_default().await?;

        // Only the owning kind is known up front; referenced kinds go through discovery
        let registry = TypeRegistry::new().register::<crds::Controller>();
        let store = KubeObjectStore::new(kube_client.clone(), registry);

        let api: Api<crds::Controller> = match config.namespace.as_deref() {
            Some(ns) => Api::namespaced(kube_client, ns),
            None => Api::all(kube_client),
        };

        let metrics = Arc::new(Metrics::new()?);
        let ready = Arc::new(AtomicBool::new(false));
        let cancel = CancellationToken::new();

        let context = Arc::new(Context {
            reconciler: Reconciler::new(Arc::new(store)),
            backoff: BackoffTracker::new(config.backoff_min_minutes, config.backoff_max_minutes),
            metrics: metrics.clone(),
            cancel: cancel.clone(),
        });

        let controller_config = ControllerConfig::default()
            .debounce(config.debounce)
            .concurrency(config.concurrency);

        let watcher = tokio::spawn(watcher::watch_controllers(
            api,
            context,
            controller_config,
            ready.clone(),
        ));

        let server = tokio::spawn(server::serve(
            config.metrics_addr,
            ProbeState { metrics, ready },
            cancel.clone(),
        ));

        tokio::spawn(cancel_on_signal(cancel.clone()));

        Ok(Self {
            watcher,
            server,
            cancel,
        })
    }

    /// Runs the controller until shutdown.
    pub async fn run(mut self) -> Result<(), ControllerError> {
        info!("Reference Controller running");

        let result = tokio::select! {
            result = &mut self.watcher => {
                result.map_err(|e| ControllerError::Watch(format!("Controller watcher panicked: {}", e)))
            }
            result = &mut self.server => {
                match result {
                    Ok(Ok(())) => Err(ControllerError::Watch("Probe server exited".to_string())),
                    Ok(Err(e)) => Err(e),
                    Err(e) => Err(ControllerError::Watch(format!("Probe server panicked: {}", e))),
                }
            }
        };

        self.cancel.cancel();
        if let Err(e) = &result {
            warn!("Reference Controller stopping: {}", e);
        }
        result
    }
}

/// Cancel in-flight reconciliations on SIGINT or SIGTERM
async fn cancel_on_signal(cancel: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        () = terminate => {}
    }

    info!("Shutdown signal received, cancelling in-flight reconciliations");
    cancel.cancel();
}
