//! Cyberhound: a terminal dashboard over a polled deal/bounty intel feed.
//!
//! The library hosts everything except the terminal view, so integration
//! tests can drive the feed controller against a mock backend.

pub mod config;
pub mod feed;
pub mod storage;
pub mod util;
