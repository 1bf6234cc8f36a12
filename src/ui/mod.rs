//! Terminal dashboard.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `helpers` - Background task spawning
//! - `render` - Layout and size checks
//! - `header` - Link status banner
//! - `deals` - Intercept list widget
//! - `detail` - Selected record panel
//! - `activity` - Activity log widget
//! - `status` - Status bar widget

mod activity;
mod deals;
mod detail;
mod events;
mod header;
mod helpers;
mod input;
mod loop_runner;
mod render;
mod status;

pub use loop_runner::{run, Action};
