//! Query modules, one per table.

pub mod outcome_history;
pub mod recommendations;
