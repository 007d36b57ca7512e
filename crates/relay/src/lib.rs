pub mod api;
pub mod config;
pub mod logging;
pub mod mcp;
pub mod metrics;
pub mod server;
