use c9s::{app, config};
use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "c9s")]
#[command(about = "A terminal admin console for an e-commerce catalog, inspired by k9s")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/c9s/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Override the API base URL from the config file
  #[arg(short, long)]
  url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;
  let _log_guard = init_tracing();

  let args = Args::parse();

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Override the API URL if specified on the command line
  if let Some(url) = args.url {
    config.api.url = url;
  }

  // Initialize and run the app
  let mut app = app::App::new(config)?;
  app.run().await?;

  Ok(())
}

/// Log to a file under the data dir - the terminal itself belongs to the TUI.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
  let log_dir = dirs::data_dir()?.join("c9s");
  std::fs::create_dir_all(&log_dir).ok()?;

  let appender = tracing_appender::rolling::never(log_dir, "c9s.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("c9s=info")),
    )
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Some(guard)
}
