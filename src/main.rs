//! Flow dispatch load balancer.
//!
//! # Architecture Overview
//!
//! ```text
//!     POST /balance ──┐
//!     POST /release ──┼──▶ http server ──▶ FlowDispatcher ──▶ strategy
//!     GET  /monitor ──┘                        │             ├─ round_robin
//!                                              │             ├─ least_connections
//!                                              │             └─ hairpin / rss_meta ──▶ pipeline device
//!                                              ├─▶ connection tracker
//!                                              └─▶ latency stats
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use flow_balancer::config::loader::resolve_config;
use flow_balancer::config::{BalancerConfig, ConfigOverrides};
use flow_balancer::http::HttpServer;
use flow_balancer::lifecycle::{signals, startup, Shutdown, StartupError};
use flow_balancer::observability::logging;
use flow_balancer::pipeline::InMemoryProvisioner;

#[derive(Parser, Debug)]
#[command(name = "flow-balancer")]
#[command(about = "Flow dispatch load balancer", long_about = None)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "BALANCER_CONFIG")]
    config: Option<PathBuf>,

    /// Comma-separated backend addresses.
    #[arg(long, env = "SERVERS", value_delimiter = ',')]
    servers: Option<Vec<String>>,

    /// Interface to listen on.
    #[arg(long, env = "BIND_HOST")]
    host: Option<String>,

    /// Listening port, also reported as the backend port.
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// round_robin, least_connections, hairpin or rss_meta.
    #[arg(short, long, env = "STRATEGY")]
    strategy: Option<String>,

    /// Log level when RUST_LOG is unset.
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            servers: self.servers.clone(),
            host: self.host.clone(),
            port: self.port,
            strategy: self.strategy.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let cli = Cli::parse();

    let config = match resolve_config(cli.config.as_deref(), cli.overrides()) {
        Ok(config) => config,
        Err(e) => {
            logging::init_logging(&BalancerConfig::default().observability);
            tracing::error!(error = %e, "Invalid configuration, refusing to start");
            return Err(e.into());
        }
    };

    logging::init_logging(&config.observability);
    tracing::info!("flow-balancer v{} starting", env!("CARGO_PKG_VERSION"));

    let provisioner = Arc::new(InMemoryProvisioner::new());
    let dispatcher = Arc::new(startup::build_dispatcher(&config, provisioner)?);
    startup::start_exporters(&config)?;

    let listener = TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    signals::spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config, dispatcher);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
