//! Local key-value persistence.
//!
//! Holds the handful of display flags that survive a restart (currently only
//! the `clearance` flag). Nothing here influences feed synchronisation.

mod preferences;
mod schema;
mod types;

pub use preferences::CLEARANCE_KEY;
pub use schema::Database;
pub use types::DatabaseError;
