//! `bootcamp-server` binary: parses configuration, wires the store and
//! geocoder, and serves the API until Ctrl-C.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bootcamp_server::geocode::build_geocoder;
use bootcamp_server::network::{NetworkConfig, NetworkModule, TlsConfig};
use bootcamp_server::storage::DocumentStore;
use bootcamp_server::{GeocoderConfig, GeocoderProvider, ServerConfig};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "bootcamp-server", version, about = "Bootcamp directory REST API")]
struct Args {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// Comma-separated allowed CORS origins.
    #[arg(long, env = "CORS_ORIGINS", value_delimiter = ',', default_value = "*")]
    cors_origins: Vec<String>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    request_timeout_secs: u64,

    #[arg(long, env = "TLS_CERT", requires = "tls_key")]
    tls_cert: Option<PathBuf>,

    #[arg(long, env = "TLS_KEY", requires = "tls_cert")]
    tls_key: Option<PathBuf>,

    #[arg(long, env = "GEOCODER_PROVIDER", value_enum, default_value_t = GeocoderProvider::Mapquest)]
    geocoder_provider: GeocoderProvider,

    #[arg(long, env = "GEOCODER_API_KEY", hide_env_values = true)]
    geocoder_api_key: Option<String>,

    #[arg(long, env = "GEOCODER_BASE_URL")]
    geocoder_base_url: Option<String>,

    /// JSON zipcode table for the static geocoder.
    #[arg(long, env = "GEOCODER_FIXTURE")]
    geocoder_fixture: Option<PathBuf>,

    /// Address for the Prometheus scrape endpoint.
    #[arg(long, env = "METRICS_ADDR")]
    metrics_addr: Option<SocketAddr>,

    /// Emit logs as JSON lines. The env var takes `1/0`, `yes/no`, `on/off`
    /// or `true/false`.
    #[arg(
        long,
        env = "LOG_JSON",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    log_json: bool,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        let tls = match (self.tls_cert, self.tls_key) {
            (Some(cert_path), Some(key_path)) => Some(TlsConfig {
                cert_path,
                key_path,
            }),
            _ => None,
        };

        let defaults = GeocoderConfig::default();
        ServerConfig {
            network: NetworkConfig {
                host: self.host,
                port: self.port,
                tls,
                cors_origins: self.cors_origins,
                request_timeout: Duration::from_secs(self.request_timeout_secs),
                ..NetworkConfig::default()
            },
            geocoder: GeocoderConfig {
                provider: self.geocoder_provider,
                api_key: self.geocoder_api_key,
                base_url: self.geocoder_base_url.unwrap_or(defaults.base_url),
                fixture_path: self.geocoder_fixture,
                request_timeout: defaults.request_timeout,
            },
            metrics_addr: self.metrics_addr,
        }
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_json);
    let config = args.into_config();

    if let Some(addr) = config.metrics_addr {
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("failed to install Prometheus exporter")?;
        info!(%addr, "Prometheus exporter listening");
    }

    let store = Arc::new(DocumentStore::bootcamps());
    let geocoder = build_geocoder(&config.geocoder).await?;

    let mut module = NetworkModule::new(config.network, store, geocoder);
    let port = module.start().await?;
    info!(port, "bootcamp server started");

    module
        .serve(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "failed to listen for Ctrl-C");
            }
            info!("shutdown signal received");
        })
        .await
}
