pub mod answers;
pub mod benchmark;
pub mod config;
pub mod ordered;
pub mod output;
pub mod scoring;
pub mod store;
pub mod telemetry;
