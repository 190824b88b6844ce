//! Search execution: request types and the gated path to the engine.

mod gateway;
mod types;

pub use gateway::SearchGateway;
pub use types::{CellValue, SearchOutcome, SearchRequest, SearchRow};
