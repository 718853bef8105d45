//! Data models: the invoice itself and application configuration.

pub mod config;
pub mod invoice;
