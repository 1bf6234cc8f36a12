//! Background task plumbing shared by the input handlers.

use crate::app::{App, AppEvent};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;

/// Run a future, turning a panic into `Err(message)`.
///
/// Spawned tasks that panic would otherwise vanish without the UI noticing.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic payload".to_string()
            }
        })
}

/// Spawn a scan of `target` in the background.
///
/// The controller rejects overlapping scans on its own; checking here as well
/// only spares the user a task spawn and gives immediate feedback.
pub(super) fn spawn_scan(app: &mut App, target: String, event_tx: &mpsc::Sender<AppEvent>) {
    if app.controller.is_scanning() {
        app.set_status("Scan already in progress");
        return;
    }

    let controller = app.controller.clone();
    let tx = event_tx.clone();
    tracing::debug!(scan_target = %target, "Spawning scan task");

    tokio::spawn(async move {
        let event = match catch_task_panic(controller.trigger_scan(&target)).await {
            Ok(outcome) => AppEvent::ScanFinished { target, outcome },
            Err(error) => {
                tracing::error!(error = %error, "Scan task panicked");
                AppEvent::TaskPanicked { task: "scan", error }
            }
        };
        if let Err(e) = tx.send(event).await {
            tracing::warn!(error = %e, "Failed to send scan result (receiver dropped)");
        }
    });
}

/// Spawn a manual refresh (poll with reshuffled fallback).
pub(super) fn spawn_refresh(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if app.refreshing {
        return;
    }
    app.refreshing = true;
    app.set_status("Refreshing...");

    let controller = app.controller.clone();
    let tx = event_tx.clone();

    tokio::spawn(async move {
        let event = match catch_task_panic(controller.refresh()).await {
            Ok(status) => AppEvent::RefreshFinished(status),
            Err(error) => {
                tracing::error!(error = %error, "Refresh task panicked");
                AppEvent::TaskPanicked {
                    task: "refresh",
                    error,
                }
            }
        };
        if let Err(e) = tx.send(event).await {
            tracing::warn!(error = %e, "Failed to send refresh result (receiver dropped)");
        }
    });
}
