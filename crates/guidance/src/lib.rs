pub mod candidates;
pub mod config;
pub mod content;
pub mod error;
pub mod telemetry;
