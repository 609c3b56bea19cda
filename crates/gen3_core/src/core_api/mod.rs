mod engine;
mod error;
mod types;

pub use engine::{Engine, Session};
pub use error::{CoreError, CoreErrorCode};
pub use types::{BoxRecordEntry, Capabilities, CapabilityIssue, Snapshot};
