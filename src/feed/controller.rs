//! Feed synchronisation: polling, scan dispatch, fallback substitution and the
//! status narration the dashboard shows.
//!
//! # Status model
//!
//! ```text
//! Idle -> Initializing -> {ConnectedLive | ConnectedEmpty | OfflineSimulated}
//!                                   ^                 |
//!                                   +---- Scanning <--+
//! ```
//!
//! The link phase (everything but `Scanning`) is tracked separately from the
//! scan flag. A poll that lands while a scan is in flight updates the link
//! phase and the snapshot, but the visible status stays `Scanning` until the
//! scan settles.
//!
//! # Concurrency
//!
//! State sits behind a `std::sync::Mutex` that is never held across an
//! `.await`. Polls are serialised by an async gate so at most one read request
//! is in flight; scans are guarded by an atomic busy flag. Snapshot writes are
//! last-write-wins.

use chrono::{DateTime, Local};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::fixtures::FixtureProvider;
use super::normalize::{normalize, Normalized};
use super::source::{FetchError, IntelSource};
use super::types::{Deal, FeedSnapshot, Intercept};
use crate::config::Config;

/// Number of narration lines kept in the activity log.
pub const LOG_CAPACITY: usize = 10;

/// Visible controller status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Idle,
    Initializing,
    /// Endpoint reachable and returned records.
    ConnectedLive,
    /// Endpoint reachable but returned nothing usable; fixtures shown.
    ConnectedEmpty,
    /// Endpoint unreachable; fixtures shown.
    OfflineSimulated,
    Scanning,
}

impl SyncStatus {
    pub fn label(self) -> &'static str {
        match self {
            SyncStatus::Idle => "IDLE",
            SyncStatus::Initializing => "INITIALIZING",
            SyncStatus::ConnectedLive => "ONLINE",
            SyncStatus::ConnectedEmpty => "NO DATA",
            SyncStatus::OfflineSimulated => "OFFLINE",
            SyncStatus::Scanning => "SCANNING",
        }
    }

    /// True when the last poll reached the endpoint.
    pub fn is_connected(self) -> bool {
        matches!(self, SyncStatus::ConnectedLive | SyncStatus::ConnectedEmpty)
    }

    /// True when the snapshot holds fixture records rather than live ones.
    pub fn is_simulated(self) -> bool {
        matches!(
            self,
            SyncStatus::ConnectedEmpty | SyncStatus::OfflineSimulated
        )
    }
}

/// Result of [`FeedSyncController::trigger_scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Scan accepted by the backend. `found` is the reported count, if any.
    Completed {
        found: Option<u64>,
        status: SyncStatus,
    },
    /// Another scan is already in flight; nothing was dispatched.
    Busy,
    /// Transport failure or a backend-reported failure. Snapshot untouched.
    Failed(String),
    /// The controller was shut down; the result was discarded.
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub at: DateTime<Local>,
    pub message: String,
}

impl LogEntry {
    /// `[HH:MM:SS] message`
    pub fn display(&self) -> String {
        format!("[{}] {}", self.at.format("%H:%M:%S"), self.message)
    }
}

/// Point-in-time copy of everything the view renders.
#[derive(Debug, Clone)]
pub struct FeedView {
    pub status: SyncStatus,
    pub message: String,
    pub snapshot: FeedSnapshot,
    /// Newest first.
    pub log: Vec<LogEntry>,
    /// Most recent single-target scan result, kept until another replaces it.
    pub last_intercept: Option<Intercept>,
    pub version: u64,
}

/// Controller behaviour derived from [`Config`].
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub default_target: String,
    pub shuffle_fallback: bool,
    /// Narration played by [`FeedSyncController::initialize`], in order.
    pub boot_sequence: Vec<(String, Duration)>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl SyncOptions {
    pub fn from_config(config: &Config) -> Self {
        let boot_sequence = if config.boot_sequence {
            boot_lines(config.boot_step())
        } else {
            Vec::new()
        };
        Self {
            default_target: config.default_target.clone(),
            shuffle_fallback: config.shuffle_fallback,
            boot_sequence,
        }
    }
}

fn boot_lines(step: Duration) -> Vec<(String, Duration)> {
    [
        "POWERING NOSE ARRAY...",
        "CALIBRATING BRAIN CORE...",
        "ESTABLISHING NEURAL LINK...",
        "DECRYPTING INTEL STREAM...",
    ]
    .into_iter()
    .map(|line| (line.to_string(), step))
    .collect()
}

struct SyncState {
    /// Never `Scanning`; see module docs.
    link: SyncStatus,
    scanning: Option<String>,
    message: String,
    snapshot: FeedSnapshot,
    log: VecDeque<LogEntry>,
    last_intercept: Option<Intercept>,
}

impl SyncState {
    fn status(&self) -> SyncStatus {
        if self.scanning.is_some() {
            SyncStatus::Scanning
        } else {
            self.link
        }
    }

    fn narrate(&mut self, message: String, log: bool) {
        if log {
            self.log.push_front(LogEntry {
                at: Local::now(),
                message: message.clone(),
            });
            self.log.truncate(LOG_CAPACITY);
        }
        self.message = message;
    }
}

struct Inner<S> {
    source: S,
    fixtures: FixtureProvider,
    options: SyncOptions,
    state: Mutex<SyncState>,
    poll_gate: tokio::sync::Mutex<()>,
    scan_busy: AtomicBool,
    torn_down: AtomicBool,
    version: AtomicU64,
}

/// Owns the feed snapshot and status for one dashboard view.
///
/// Cheap to clone; clones share state. Transport failures never escape: every
/// operation converts them into a status transition and fixture substitution.
pub struct FeedSyncController<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for FeedSyncController<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Clears the scan flag even if the scanning future is dropped mid-flight.
struct ScanGuard<'a, S> {
    inner: &'a Inner<S>,
}

impl<S> Drop for ScanGuard<'_, S> {
    fn drop(&mut self) {
        lock(&self.inner.state).scanning = None;
        self.inner.version.fetch_add(1, Ordering::AcqRel);
        self.inner.scan_busy.store(false, Ordering::Release);
    }
}

fn lock(state: &Mutex<SyncState>) -> MutexGuard<'_, SyncState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Scan replies name their count field differently across backend versions.
fn scan_count(body: &Value) -> Option<u64> {
    ["deals_found", "intel_count"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_u64))
}

/// A 2xx scan reply can still report failure in its body.
fn scan_failure(body: &Value) -> Option<String> {
    let status = body.get("status").and_then(Value::as_str)?;
    if !status.eq_ignore_ascii_case("failed") {
        return None;
    }
    Some(
        body.get("error")
            .and_then(Value::as_str)
            .unwrap_or("backend reported failure")
            .to_string(),
    )
}

impl<S: IntelSource> FeedSyncController<S> {
    pub fn new(source: S, fixtures: FixtureProvider, options: SyncOptions) -> Self {
        let state = SyncState {
            link: SyncStatus::Idle,
            scanning: None,
            message: "SYSTEM READY".to_string(),
            snapshot: Arc::new(Vec::new()),
            log: VecDeque::with_capacity(LOG_CAPACITY),
            last_intercept: None,
        };
        Self {
            inner: Arc::new(Inner {
                source,
                fixtures,
                options,
                state: Mutex::new(state),
                poll_gate: tokio::sync::Mutex::new(()),
                scan_busy: AtomicBool::new(false),
                torn_down: AtomicBool::new(false),
                version: AtomicU64::new(0),
            }),
        }
    }

    // ------------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------------

    pub fn status(&self) -> SyncStatus {
        lock(&self.inner.state).status()
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        Arc::clone(&lock(&self.inner.state).snapshot)
    }

    pub fn message(&self) -> String {
        lock(&self.inner.state).message.clone()
    }

    /// Monotonic counter bumped on every state write.
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }

    pub fn view(&self) -> FeedView {
        let state = lock(&self.inner.state);
        FeedView {
            status: state.status(),
            message: state.message.clone(),
            snapshot: Arc::clone(&state.snapshot),
            log: state.log.iter().cloned().collect(),
            last_intercept: state.last_intercept.clone(),
            version: self.version(),
        }
    }

    pub fn last_intercept(&self) -> Option<Intercept> {
        lock(&self.inner.state).last_intercept.clone()
    }

    pub fn is_scanning(&self) -> bool {
        self.inner.scan_busy.load(Ordering::Acquire)
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.torn_down.load(Ordering::Acquire)
    }

    pub fn default_target(&self) -> &str {
        &self.inner.options.default_target
    }

    pub fn fixtures(&self) -> &FixtureProvider {
        &self.inner.fixtures
    }

    // ------------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------------

    /// Play the boot narration, then perform the first poll.
    ///
    /// Each narration delay only suspends this call. Returns early if the
    /// controller is shut down part way through.
    pub async fn initialize(&self) {
        if self.is_torn_down() {
            return;
        }
        self.update(|state| {
            state.link = SyncStatus::Initializing;
            state.narrate("INITIALIZING CYBERHOUND...".to_string(), true);
        });
        tracing::info!("Feed controller initializing");

        for (line, delay) in &self.inner.options.boot_sequence {
            self.update(|state| state.narrate(line.clone(), true));
            tokio::time::sleep(*delay).await;
            if self.is_torn_down() {
                tracing::debug!("Shut down during boot sequence");
                return;
            }
        }

        self.poll().await;
    }

    /// Read the feed once and replace the snapshot.
    ///
    /// Waits for any poll already in flight. Returns the resulting link phase.
    pub async fn poll(&self) -> SyncStatus {
        let _gate = self.inner.poll_gate.lock().await;
        self.poll_locked(false).await
    }

    /// Like [`poll`](Self::poll), but returns `None` instead of waiting when a
    /// poll is already in flight.
    pub async fn try_poll(&self) -> Option<SyncStatus> {
        let _gate = self.inner.poll_gate.try_lock().ok()?;
        Some(self.poll_locked(false).await)
    }

    /// Poll, reshuffling the fallback records if the endpoint cannot supply
    /// live ones.
    pub async fn refresh(&self) -> SyncStatus {
        let _gate = self.inner.poll_gate.lock().await;
        self.poll_locked(true).await
    }

    /// Ask the backend to rescan `target`, then re-poll.
    ///
    /// Rejected with [`ScanOutcome::Busy`] while another scan is in flight;
    /// a rejected call changes nothing and sends nothing. On failure the
    /// snapshot is left as it was.
    pub async fn trigger_scan(&self, target: &str) -> ScanOutcome {
        if self.is_torn_down() {
            return ScanOutcome::Closed;
        }
        if self
            .inner
            .scan_busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!(scan_target = %target, "Scan already in flight, rejecting");
            return ScanOutcome::Busy;
        }
        let _guard = ScanGuard { inner: &self.inner };

        self.update(|state| {
            state.scanning = Some(target.to_string());
            state.narrate(format!("SCANNING TARGET '{}'...", target), true);
        });
        tracing::info!(scan_target = %target, "Scan started");

        let result = self.inner.source.request_scan(target).await;
        if self.is_torn_down() {
            return ScanOutcome::Closed;
        }

        let body = match result {
            Ok(body) => body,
            Err(e) => return self.scan_failed(target, e.to_string()),
        };
        if let Some(reason) = scan_failure(&body) {
            return self.scan_failed(target, reason);
        }

        let intercept = Intercept::from_reply(&body);
        // A lone intercept is one target, unless the reply says otherwise
        let found = scan_count(&body).or(intercept.as_ref().map(|_| 1));
        let normalized = normalize(&body);
        if let Normalized::Live(deals) = normalized.outcome {
            let count = deals.len();
            self.update(|state| {
                state.snapshot = Arc::new(deals);
                state.link = SyncStatus::ConnectedLive;
            });
            tracing::debug!(records = count, "Applied intel from scan reply");
        }

        let found_text = found.map_or_else(|| "?".to_string(), |n| n.to_string());
        let mut narration = format!("SCAN COMPLETE // {} TARGETS ACQUIRED", found_text);
        if let Some(intercept) = &intercept {
            narration.push_str(" // VERDICT: ");
            narration.push_str(intercept.verdict_or_unknown());
            tracing::info!(
                scan_target = %target,
                verdict = intercept.verdict_or_unknown(),
                "Intercept confirmed"
            );
        }
        self.update(|state| {
            if intercept.is_some() {
                state.last_intercept = intercept;
            }
            state.narrate(narration, true);
        });
        tracing::info!(scan_target = %target, found = ?found, "Scan complete, refreshing feed");

        let status = self.poll().await;
        ScanOutcome::Completed { found, status }
    }

    /// Stop accepting results. In-flight requests complete but are discarded.
    pub fn shutdown(&self) {
        if !self.inner.torn_down.swap(true, Ordering::AcqRel) {
            tracing::info!("Feed controller shut down");
        }
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn update<R>(&self, f: impl FnOnce(&mut SyncState) -> R) -> R {
        let result = f(&mut lock(&self.inner.state));
        self.inner.version.fetch_add(1, Ordering::AcqRel);
        result
    }

    fn fallback_records(&self, reshuffle: bool) -> Vec<Deal> {
        if reshuffle || self.inner.options.shuffle_fallback {
            self.inner.fixtures.reshuffled(&mut rand::thread_rng())
        } else {
            self.inner.fixtures.records().to_vec()
        }
    }

    /// Caller must hold `poll_gate`.
    async fn poll_locked(&self, reshuffle: bool) -> SyncStatus {
        let result = self.inner.source.fetch_feed().await;
        if self.is_torn_down() {
            tracing::debug!("Discarding poll result after shutdown");
            return self.status();
        }

        match result {
            Ok(body) => self.apply_body(&body, reshuffle),
            Err(e) => self.apply_offline(&e, reshuffle),
        }
    }

    fn apply_body(&self, body: &Value, reshuffle: bool) -> SyncStatus {
        let normalized = normalize(body);
        if normalized.skipped > 0 {
            tracing::warn!(skipped = normalized.skipped, "Malformed records skipped");
        }

        match normalized.outcome {
            Normalized::Live(deals) => {
                let count = deals.len();
                tracing::debug!(records = count, shape = ?normalized.shape, "Feed poll succeeded");
                self.settle(
                    SyncStatus::ConnectedLive,
                    deals,
                    format!("LINK ESTABLISHED // {} INTERCEPTS", count),
                )
            }
            outcome => {
                if outcome == Normalized::Unrecognized {
                    tracing::warn!("Feed response matched no known shape, treating as empty");
                } else {
                    tracing::debug!(shape = ?normalized.shape, "Feed poll returned no records");
                }
                self.settle(
                    SyncStatus::ConnectedEmpty,
                    self.fallback_records(reshuffle),
                    "LINK UP // NO DATA STREAM, SHOWING CACHED INTEL".to_string(),
                )
            }
        }
    }

    fn apply_offline(&self, error: &FetchError, reshuffle: bool) -> SyncStatus {
        tracing::warn!(error = %error, "Feed poll failed, switching to simulation");
        self.settle(
            SyncStatus::OfflineSimulated,
            self.fallback_records(reshuffle),
            "LINK FAILURE // RUNNING SIMULATION".to_string(),
        )
    }

    /// Write a poll result. Narration is logged only when the link phase
    /// changes, so a steady feed does not flood the activity log.
    fn settle(&self, link: SyncStatus, deals: Vec<Deal>, message: String) -> SyncStatus {
        self.update(|state| {
            let changed = state.link != link;
            state.link = link;
            state.snapshot = Arc::new(deals);
            if state.scanning.is_none() {
                state.narrate(message, changed);
            } else if changed {
                // Keep the scan narration on screen, but record the transition.
                state.log.push_front(LogEntry {
                    at: Local::now(),
                    message,
                });
                state.log.truncate(LOG_CAPACITY);
            }
        });
        link
    }

    fn scan_failed(&self, target: &str, reason: String) -> ScanOutcome {
        tracing::warn!(scan_target = %target, reason = %reason, "Scan failed");
        self.update(|state| state.narrate(format!("SCAN FAILED: {}", reason), true));
        ScanOutcome::Failed(reason)
    }
}
