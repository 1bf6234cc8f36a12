//! Helpers shared by the feed view.
//!
//! - **Text**: sanitising backend strings for the terminal and fitting them to a column
//! - **Links**: checking outbound record links before handing them to the OS opener

mod link;
mod text;

pub use link::{validate_link, LinkError};
pub use text::{sanitize, truncate_to_width};
