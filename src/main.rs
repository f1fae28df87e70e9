//! solo-ftpd - Entry Point
//!
//! A small FTP server serving one directory tree over RFC 959.

use env_logger::Env;
use log::{error, info};

use solo_ftpd::{Server, ServerConfig};

#[tokio::main]
async fn main() {
    // Default to info; RUST_LOG overrides
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Launching FTP server...");

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let server = match Server::new(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            std::process::exit(1);
        }
    };

    server.start().await;
}
