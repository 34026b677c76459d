pub mod aggregate;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod describe;
pub mod reports;
pub mod simulator;
pub mod unnest;

/// Placeholder substituted for missing categorical data.
pub const SENTINEL: &str = "Unknown";

/// Application name for XDG paths
pub const APP_NAME: &str = "streamscope";
