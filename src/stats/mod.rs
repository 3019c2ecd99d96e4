//! Level response statistics
//!
//! - Response events and the record-entry validation
//! - Append-only JSON event store
//! - Aggregation by level type, symbol, time context and confluence
//! - Markdown report

pub mod aggregate;
pub mod event;
pub mod record;
pub mod report;
pub mod store;

pub use aggregate::{aggregate, ConfluenceEffect, GroupStats, GroupTable, LevelTypeStats, Report};
pub use event::{Response, ResponseEvent};
pub use record::{record_response, RecordRequest};
pub use report::render_report;
pub use store::{EventLog, EventStore};
