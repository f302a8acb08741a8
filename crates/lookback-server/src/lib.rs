mod capture;
mod planner;
pub mod routes;
mod server;

pub use capture::CaptureFlag;
pub use planner::{search_records, SearchPage};
pub use server::{create_router, run, AppState};
