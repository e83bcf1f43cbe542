// src/services/mod.rs
//
// Process-wide services that sit outside the request path

pub mod monitoring;

pub use monitoring::{init_sentry, MonitoringConfig};
