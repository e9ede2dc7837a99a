use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use cloud_relay::{
    adapters::inbound::http::router::{create_router, AppState},
    app::create_app_from_env,
    ports::services::FetchService,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

#[derive(Parser, Debug)]
#[command(name = "cloud-relay-server")]
#[command(about = "Relays storage events and fetch requests between buckets and topics", long_about = None)]
struct Cli {
    /// Server port to listen on
    #[arg(short, long, env = "PORT", default_value = "8080")]
    port: u16,

    /// Server host to bind to
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Log level when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,
}

impl Cli {
    fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.log_level));

        match self.log_format {
            LogFormat::Json => tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init(),
            LogFormat::Pretty => tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli.init_logging();

    info!("Starting cloud-relay server");

    let services = create_app_from_env().context("Failed to build application")?;

    let state = AppState {
        relay_service: Arc::new(services.relay_service),
        fetch_service: services
            .fetch_service
            .map(|service| Arc::new(service) as Arc<dyn FetchService>),
    };

    if state.fetch_service.is_some() {
        info!("Fetch endpoint enabled");
    }

    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, router)
        .await
        .context("Failed to start server")?;

    Ok(())
}
