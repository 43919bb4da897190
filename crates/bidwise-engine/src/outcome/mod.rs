//! Outcome recording, calibration, and the learning gatekeeper.
//!
//! All of this is observational. Nothing here feeds back into scoring.

pub mod calibration;
pub mod gatekeeper;
pub mod recorder;

pub use calibration::{CalibrationBin, CalibrationCalculator, CalibrationReport};
pub use gatekeeper::{GatekeeperDecision, GatekeeperStatus, LearningGatekeeper};
pub use recorder::OutcomeRecorder;
