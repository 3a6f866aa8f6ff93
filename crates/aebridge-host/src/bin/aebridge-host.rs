//! Simulated After Effects script endpoint

use aebridge_host::{HostServer, HostServerConfig};
use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "aebridge-host", version = aebridge_host::VERSION)]
#[command(about = "Serve a simulated After Effects script panel over HTTP")]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 2000)]
    port: u16,

    /// Allow cross-origin requests
    #[arg(long)]
    cors: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aebridge_host=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();
    println!("AE Bridge simulated host v{}", aebridge_host::VERSION);

    let config = HostServerConfig {
        host: args.host,
        port: args.port,
        enable_cors: args.cors,
    };
    println!("Listening on http://{}:{}", config.host, config.port);

    HostServer::new(config).start().await
}
