//! Background task result handling.

use crate::app::{App, AppEvent};
use cyberhound::feed::{ScanOutcome, SyncStatus};
use cyberhound::util::sanitize;

/// Apply a finished background task to the view state.
///
/// Feed data arrives through the controller; these events only drive the
/// transient status-bar messages.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::ScanFinished { target, outcome } => match outcome {
            ScanOutcome::Completed { found, status } => {
                let found = found.map_or_else(|| "unknown".to_string(), |n| n.to_string());
                let suffix = if status == SyncStatus::OfflineSimulated {
                    " (feed offline)"
                } else {
                    ""
                };
                app.set_status(format!(
                    "Scan of '{}' found {}{}",
                    sanitize(&target),
                    found,
                    suffix
                ));
            }
            ScanOutcome::Busy => app.set_status("Scan already in progress"),
            ScanOutcome::Failed(reason) => app.set_status(format!(
                "Scan of '{}' failed: {}",
                sanitize(&target),
                sanitize(&reason)
            )),
            ScanOutcome::Closed => {}
        },
        AppEvent::RefreshFinished(status) => {
            app.refreshing = false;
            let msg = match status {
                SyncStatus::ConnectedLive => "Feed refreshed",
                SyncStatus::ConnectedEmpty => "Feed empty, showing cached intel",
                _ => "Feed offline, simulation reshuffled",
            };
            app.set_status(msg);
        }
        AppEvent::TaskPanicked { task, error } => {
            if task == "refresh" {
                app.refreshing = false;
            }
            app.set_status(format!("Internal error in {}: {}", task, error));
        }
    }
}
