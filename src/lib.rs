pub mod auth;
pub mod configuration;
pub mod error;
pub mod repository;
pub mod telemetry;
