//! Kubernetes resource watcher.
//!
//! Drives the reconciler from `kube_runtime::Controller`, which handles
//! reconnection, per-key serialization and requeues. The error policy here
//! turns the reconciler's error classes into requeue decisions.

use crate::backoff::BackoffTracker;
use crate::error::{ErrorClass, ReconcileError};
use crate::metrics::Metrics;
use crate::reconciler::Reconciler;
use crds::Controller;
use futures::StreamExt;
use kube::Api;
use kube_runtime::{Controller as RuntimeController, watcher, controller::{Action, Config as ControllerConfig}, reflector::Store};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use typed_store::ObjectKey;

/// Delay before re-running a pass that lost an optimistic-concurrency race
const CONFLICT_REQUEUE: Duration = Duration::from_secs(1);

/// Shared state handed to every reconciliation
pub struct Context {
    pub reconciler: Reconciler,
    pub backoff: BackoffTracker,
    pub metrics: Arc<Metrics>,
    pub cancel: CancellationToken,
}

async fn reconcile(obj: Arc<Controller>, ctx: Arc<Context>) -> Result<Action, ReconcileError> {
    let Some(key) = ObjectKey::from_resource(obj.as_ref()) else {
        warn!("Ignoring Controller without name or namespace");
        return Ok(Action::await_change());
    };

    let started = Instant::now();
    let result = ctx.reconciler.reconcile(&key, &ctx.cancel).await;
    ctx.metrics.observe(
        started.elapsed(),
        result.as_ref().map(|_| ()).map_err(ReconcileError::class),
    );

    if result.is_ok() {
        ctx.backoff.reset(&key);
    }
    result
}

fn error_policy(_obj: Arc<Controller>, error: &ReconcileError, ctx: Arc<Context>) -> Action {
    let key = error.key();
    match error.class() {
        ErrorClass::Transient => {
            let delay = ctx.backoff.next(key);
            warn!("Reconciliation of {} failed at {}, retrying in {:?}: {}", key, error.step(), delay, error);
            Action::requeue(delay)
        }
        ErrorClass::Conflict => {
            debug!("Status of {} changed concurrently, re-running reconciliation: {}", key, error);
            Action::requeue(CONFLICT_REQUEUE)
        }
        ErrorClass::Permanent => {
            error!("Reconciliation of {} failed permanently, waiting for a spec change: {}", key, error);
            Action::await_change()
        }
        ErrorClass::ContractViolation => {
            error!("Reconciliation of {} hit a contract violation, needs investigation: {}", key, error);
            Action::await_change()
        }
        ErrorClass::Cancelled => {
            debug!("{}", error);
            Action::await_change()
        }
    }
}

/// Watch `Controller` resources and reconcile them until shutdown.
pub async fn watch_controllers(
    api: Api<Controller>,
    context: Arc<Context>,
    controller_config: ControllerConfig,
    ready: Arc<AtomicBool>,
) {
    info!("Starting Controller watcher");

    let controller = RuntimeController::new(api, watcher::Config::default())
        .with_config(controller_config)
        .shutdown_on_signal();
    let synced = mark_ready_when_synced(controller.store(), ready.clone());

    let run = controller
        .run(reconcile, error_policy, context)
        .for_each(|res| async move {
            match res {
                Ok((obj_ref, _)) => debug!("Reconciled {}", obj_ref),
                Err(e) => debug!("Controller stream error: {}", e),
            }
        });

    tokio::join!(synced, run);

    ready.store(false, Ordering::Relaxed);
    info!("Controller watcher stopped");
}

/// Flip `ready` once the watcher has completed its initial list
async fn mark_ready_when_synced(store: Store<Controller>, ready: Arc<AtomicBool>) {
    match store.wait_until_ready().await {
        Ok(()) => {
            info!("Initial Controller list synced, ready");
            ready.store(true, Ordering::Relaxed);
        }
        Err(_) => debug!("Controller watcher stopped before the initial sync"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use serde_json::json;
    use typed_store::{MockFailure, MockObjectStore};

    fn context(store: &MockObjectStore) -> Arc<Context> {
        Arc::new(Context {
            reconciler: create_test_reconciler(store),
            backoff: BackoffTracker::new(1, 10),
            metrics: Arc::new(Metrics::new().unwrap()),
            cancel: CancellationToken::new(),
        })
    }

    fn reference_error(source: typed_store::StoreError) -> ReconcileError {
        ReconcileError::ReferenceFetch {
            key: ObjectKey::new("a", "o1"),
            reference: widget_ref("w1"),
            source,
        }
    }

    #[test]
    fn test_transient_errors_back_off() {
        let ctx = context(&MockObjectStore::new());
        let owner = Arc::new(create_test_controller("o1", "a", Some(widget_ref("w1"))));
        let err = reference_error(typed_store::StoreError::Unavailable("down".to_string()));

        assert_eq!(error_policy(owner.clone(), &err, ctx.clone()), Action::requeue(Duration::from_secs(60)));
        assert_eq!(error_policy(owner.clone(), &err, ctx.clone()), Action::requeue(Duration::from_secs(60)));
        assert_eq!(error_policy(owner, &err, ctx), Action::requeue(Duration::from_secs(120)));
    }

    #[test]
    fn test_permanent_errors_wait_for_change() {
        let ctx = context(&MockObjectStore::new());
        let owner = Arc::new(create_test_controller("o1", "a", None));
        let err = ReconcileError::InvalidReference {
            key: ObjectKey::new("a", "o1"),
            source: typed_store::GroupVersion::parse("///bad").unwrap_err(),
        };

        assert_eq!(error_policy(owner, &err, ctx), Action::await_change());
    }

    #[tokio::test]
    async fn test_success_resets_backoff() {
        let store = MockObjectStore::new();
        let owner = create_test_controller("o1", "a", Some(widget_ref("w1")));
        store.insert(&owner);
        store.insert_dynamic(&widget_gvk(), &ObjectKey::new("a", "w1"), json!({"status": {}}));
        let ctx = context(&store);
        let key = ObjectKey::new("a", "o1");

        ctx.backoff.next(&key);
        ctx.backoff.next(&key);
        ctx.backoff.next(&key);

        reconcile(Arc::new(owner), ctx.clone()).await.unwrap();
        assert_eq!(ctx.backoff.next(&key), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_failed_pass_is_counted() {
        let store = MockObjectStore::new();
        let owner = create_test_controller("o1", "a", Some(widget_ref("w1")));
        store.insert(&owner);
        store.fail_next_get(MockFailure::Unavailable);
        let ctx = context(&store);

        assert!(reconcile(Arc::new(owner), ctx.clone()).await.is_err());

        let text = ctx.metrics.render().unwrap();
        assert!(text.contains("ref_controller_reconcile_errors_total{class=\"transient\"} 1"));
    }

    #[tokio::test]
    async fn test_ready_only_after_initial_sync() {
        let (reader, mut writer) = kube_runtime::reflector::store::<Controller>();
        let ready = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(mark_ready_when_synced(reader, ready.clone()));

        writer.apply_watcher_event(&watcher::Event::Init);
        tokio::task::yield_now().await;
        assert!(!ready.load(Ordering::Relaxed));

        writer.apply_watcher_event(&watcher::Event::InitDone);
        task.await.unwrap();
        assert!(ready.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn test_not_ready_when_watcher_stops_early() {
        let (reader, writer) = kube_runtime::reflector::store::<Controller>();
        let ready = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(mark_ready_when_synced(reader, ready.clone()));

        drop(writer);
        task.await.unwrap();
        assert!(!ready.load(Ordering::Relaxed));
    }
}
