use cyberhound::feed::{
    Deal, FeedSyncController, FeedView, HttpIntelSource, ScanOutcome, SyncStatus,
};
use std::borrow::Cow;
use std::sync::Arc;
use tokio::time::Instant;

pub type Controller = FeedSyncController<HttpIntelSource>;

/// How long transient status-bar messages stay on screen.
const STATUS_TTL_SECS: u64 = 3;

/// Results of background tasks, delivered to the UI loop.
#[derive(Debug)]
pub enum AppEvent {
    ScanFinished {
        target: String,
        outcome: ScanOutcome,
    },
    RefreshFinished(SyncStatus),
    /// `task` is "scan" or "refresh"; `error` is the panic payload text.
    TaskPanicked {
        task: &'static str,
        error: String,
    },
}

/// View state for the dashboard. Feed data itself lives in the controller;
/// `view` is the last copy pulled from it.
pub struct App {
    pub controller: Controller,
    pub view: FeedView,
    pub selected: usize,
    pub clearance: bool,
    pub promo_url: String,
    pub needs_redraw: bool,
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub spinner_frame: usize,
    pub refreshing: bool,
}

impl App {
    pub fn new(controller: Controller, promo_url: String, clearance: bool) -> Self {
        let view = controller.view();
        Self {
            controller,
            view,
            selected: 0,
            clearance,
            promo_url,
            needs_redraw: true,
            status_message: None,
            spinner_frame: 0,
            refreshing: false,
        }
    }

    /// Pull a fresh view from the controller if anything changed since the
    /// last pull. Returns true when the view was replaced.
    pub fn sync_view(&mut self) -> bool {
        if self.controller.version() == self.view.version {
            return false;
        }
        self.view = self.controller.view();
        self.clamp_selection();
        true
    }

    fn clamp_selection(&mut self) {
        let len = self.view.snapshot.len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    pub fn deals(&self) -> &Arc<Vec<Deal>> {
        &self.view.snapshot
    }

    pub fn selected_deal(&self) -> Option<&Deal> {
        self.view.snapshot.get(self.selected)
    }

    /// Link for the selected record, falling back to the promo link.
    pub fn selected_link(&self) -> Option<&str> {
        self.selected_deal()
            .map(|deal| deal.link_or(&self.promo_url))
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.view.snapshot.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.view.snapshot.len().saturating_sub(1);
    }

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Drop the transient message once it is [`STATUS_TTL_SECS`] old.
    /// Returns whether anything was dropped.
    pub fn clear_expired_status(&mut self) -> bool {
        let expired = self
            .status_message
            .as_ref()
            .is_some_and(|(_, shown)| shown.elapsed().as_secs() >= STATUS_TTL_SECS);
        if expired {
            self.status_message = None;
        }
        expired
    }

    /// True while something worth animating is in flight.
    pub fn is_busy(&self) -> bool {
        self.refreshing
            || matches!(
                self.view.status,
                SyncStatus::Scanning | SyncStatus::Initializing
            )
    }
}
