// HTTP front end for the read-only syslog viewer.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod state;
