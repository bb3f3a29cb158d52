use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mixlist_server::{run_server, JsonFileStore, RequestsLoggingLevel, ServerConfig};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the JSON document holding all users and their playlists.
    #[clap(value_parser = parse_path)]
    pub store_file: PathBuf,

    /// Directory uploaded audio files are written to (served at /uploads).
    #[clap(long, default_value = "uploads", value_parser = parse_path)]
    pub uploads_dir: PathBuf,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3000)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Maximum accepted upload size in megabytes.
    #[clap(long, default_value_t = 25)]
    pub max_upload_mb: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    info!("Using store document at {:?}", cli_args.store_file);
    let store = Arc::new(JsonFileStore::new(cli_args.store_file));

    let config = ServerConfig {
        requests_logging_level: cli_args.logging_level,
        port: cli_args.port,
        uploads_dir: cli_args.uploads_dir,
        frontend_dir_path: cli_args.frontend_dir_path,
        max_upload_bytes: cli_args.max_upload_mb * 1024 * 1024,
    };

    info!("Ready to serve at port {}!", config.port);
    run_server(config, store).await
}
