//! Configuration system for Bidwise.
//! TOML-based, 4-layer resolution: caller overrides > env > project > defaults.

pub mod bidwise_config;
pub mod calibration_config;
pub mod decision_config;
pub mod defaults;
pub mod enrichment_config;
pub mod gatekeeper_config;
pub mod persistence_config;
pub mod review_config;

pub use bidwise_config::{BidwiseConfig, ConfigOverrides, StatusMapEntry};
pub use calibration_config::CalibrationConfig;
pub use decision_config::{BaseScores, DecisionConfig, LevelPenalties, RiskPenalties};
pub use enrichment_config::EnrichmentConfig;
pub use gatekeeper_config::GatekeeperConfig;
pub use persistence_config::PersistenceConfig;
pub use review_config::ReviewConfig;
