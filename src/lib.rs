// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod comparator;
pub mod corpus;
pub mod error;
pub mod events;
pub mod logging;
pub mod persistence;
pub mod runtime;
pub mod session;
pub mod settings;
pub mod sound;
pub mod stats;
pub mod store;
pub mod tester;
pub mod util;

pub use error::{Result, WpmError};
pub use tester::{KeyOutcome, Snapshot, WpmTester};

/// Timer period while a session is active
pub const TICK_RATE_MS: u64 = 100;
