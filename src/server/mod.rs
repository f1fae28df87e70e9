//! Server bootstrap
//!
//! Configuration loading and the control-connection accept loop.

pub mod config;
pub mod core;

pub use config::ServerConfig;
pub use core::Server;
