//! Evidence intake: the per-tool status table and parallel collection.

pub mod collector;
pub mod status_map;

pub use collector::EvidenceCollector;
pub use status_map::StatusMap;
