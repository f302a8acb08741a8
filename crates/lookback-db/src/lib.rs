mod db;
mod types;

pub use db::DatabaseManager;
pub use types::{CaptureRecord, ClockTime, RecordQuery};
