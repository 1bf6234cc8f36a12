//! Intel feed synchronisation.
//!
//! - [`types`] - The deal/bounty record and snapshot type
//! - [`normalize`] - Decoding of the response shapes the backends emit
//! - [`fixtures`] - Fallback records shown when the backend has nothing
//! - [`source`] - The HTTP collaborator seam and its `reqwest` implementation
//! - [`controller`] - Polling, scanning, fallback and status narration
//! - [`scheduler`] - Periodic background polling with clean teardown
//!
//! # Example
//!
//! ```ignore
//! use cyberhound::feed::{FeedSyncController, FixtureProvider, HttpIntelSource, PollScheduler, SyncOptions};
//!
//! let source = HttpIntelSource::from_config(reqwest::Client::new(), &config)?;
//! let controller = FeedSyncController::new(source, FixtureProvider::default(), SyncOptions::from_config(&config));
//! let scheduler = PollScheduler::spawn(controller.clone(), config.poll_interval());
//!
//! // ... render controller.view() ...
//!
//! controller.shutdown();
//! scheduler.stop();
//! ```

pub mod controller;
pub mod fixtures;
pub mod normalize;
pub mod scheduler;
pub mod source;
pub mod types;

pub use controller::{
    FeedSyncController, FeedView, LogEntry, ScanOutcome, SyncOptions, SyncStatus, LOG_CAPACITY,
};
pub use fixtures::{FixtureProvider, FIXTURE_COUNT};
pub use normalize::{normalize, NormalizeResult, Normalized, Shape};
pub use scheduler::PollScheduler;
pub use source::{build_client, FetchError, HttpIntelSource, IntelSource};
pub use types::{Deal, DealId, FeedSnapshot, Intercept};
