//! tiktok-dl server binary
//!
//! Serves the download form and `POST /api/download` until SIGINT/SIGTERM.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tiktok_dl::{Config, Relay, api};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default log filter when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "info,tiktok_dl=debug";

#[derive(Debug, Parser)]
#[command(name = "tiktok-dl", version, about = "Resolve TikTok links and download the video")]
struct Cli {
    /// JSON configuration file.
    #[arg(long, short, env = "TIKTOK_DL_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind to (overrides config value).
    #[arg(long, env = "TIKTOK_DL_BIND")]
    bind: Option<SocketAddr>,

    /// Directory for downloaded videos (overrides config value).
    #[arg(long, env = "TIKTOK_DL_DOWNLOAD_DIR")]
    download_dir: Option<PathBuf>,

    /// Keep served videos on disk instead of deleting them after the response.
    #[arg(long, env = "TIKTOK_DL_KEEP_FILES")]
    keep_files: bool,
}

impl Cli {
    /// Load the config file (or defaults) and apply command line overrides.
    fn load_config(&self) -> tiktok_dl::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };

        if let Some(bind) = self.bind {
            config.server.api.bind_address = bind;
        }
        if let Some(dir) = &self.download_dir {
            config.download.download_dir = dir.clone();
        }
        if self.keep_files {
            config.download.keep_files = true;
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .init();
}

async fn run(cli: Cli) -> tiktok_dl::Result<()> {
    let config = Arc::new(cli.load_config()?);

    tracing::info!(
        bind_address = %config.server.api.bind_address,
        download_dir = %config.download_dir().display(),
        keep_files = config.download.keep_files,
        "starting tiktok-dl"
    );

    let relay = Arc::new(Relay::new(config.clone())?);
    relay.prepare().await?;
    tracing::debug!(strategies = ?relay.resolver().strategy_names(), "resolver chain ready");

    api::start_api_server(relay, config, tiktok_dl::shutdown_signal()).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "tiktok-dl exited with an error");
            ExitCode::FAILURE
        }
    }
}
