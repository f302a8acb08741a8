use std::{
    fs,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lookback_db::DatabaseManager;
use lookback_server::CaptureFlag;

#[derive(Parser)]
#[command(
    name = "lookback",
    about = "search server for your personal screen history",
    version
)]
struct Cli {
    /// Port for the API server
    #[arg(long, env = "LOOKBACK_PORT", default_value_t = 3035)]
    port: u16,

    /// Data directory for the database and logs (default: ~/.lookback)
    #[arg(long, env = "LOOKBACK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Enable debug logging for lookback crates
    #[arg(long)]
    debug: bool,
}

fn setup_logging(data_dir: &Path, debug: bool) -> anyhow::Result<WorkerGuard> {
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("lookback")
        .filename_suffix("log")
        .max_log_files(5)
        .build(data_dir)?;

    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let make_env_filter = || {
        let filter = EnvFilter::from_default_env().add_directive("info".parse().unwrap());
        if debug {
            filter
                .add_directive("lookback_server=debug".parse().unwrap())
                .add_directive("lookback_db=debug".parse().unwrap())
                .add_directive("lookback_core=debug".parse().unwrap())
        } else {
            filter
        }
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(make_env_filter()),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer)
                .with_filter(make_env_filter()),
        )
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => dirs::home_dir()
            .context("could not determine home directory")?
            .join(".lookback"),
    };
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("could not create data dir {}", data_dir.display()))?;

    let _guard = setup_logging(&data_dir, cli.debug)?;

    let db_path = data_dir.join("lookback.db");
    let db = Arc::new(
        DatabaseManager::new(&db_path.to_string_lossy())
            .await
            .with_context(|| format!("could not open database at {}", db_path.display()))?,
    );
    info!("database ready at {}", db_path.display());

    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), cli.port);
    lookback_server::run(addr, db, CaptureFlag::default()).await?;

    Ok(())
}
