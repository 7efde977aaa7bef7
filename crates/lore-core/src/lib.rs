//! Configuration loading for the Lore workspace.

pub mod config;

pub use config::Config;
