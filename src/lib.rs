pub mod config;
pub mod error;
pub mod reconcile;
pub mod sources;
pub mod telemetry;
