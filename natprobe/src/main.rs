//! Entry point: discover this host's public address via STUN.
//!
//! Usage: `natprobe [config-file] [server:port]`. The second argument
//! overrides whatever server the config selects.

mod config;
mod logger;

use config::AppConfig;
use logger::Logger;
use std::time::Duration;
use stun_client::StunClient;

fn main() -> std::io::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "natprobe.conf".to_string());
    let config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!(
                "could not load config {} ({}), using default values",
                config_path, err
            );
            AppConfig::default()
        }
    };
    let logger = Logger::start(&config.log_file)?;

    let server = std::env::args().nth(2).unwrap_or(config.stun_server);

    let mut client = StunClient::with_server(server.clone());
    client.timeout = Some(Duration::from_secs(config.timeout_secs));

    logger.info(&format!("sending Binding Request to {}", server));

    let result = if config.fallback_servers.is_empty() {
        client.discover()
    } else {
        let mut servers = vec![server];
        servers.extend(config.fallback_servers.iter().cloned());
        client.discover_multiple(&servers)
    };

    match result {
        Ok(addr) => {
            logger.info(&format!("public address {}", addr));
            println!("public address: {}", addr);
            Ok(())
        }
        Err(err) => {
            logger.error(&format!("discovery failed: {}", err));
            eprintln!("discovery failed: {}", err);
            Err(std::io::Error::other(err.to_string()))
        }
    }
}
