pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod infra;
pub mod notifications;
pub mod observability;
pub mod releases;
pub mod server;
pub mod types;
