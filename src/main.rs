use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use peerdeck::core::config::{self, CliOverrides};
use peerdeck::tui;

#[derive(Parser)]
#[command(name = "peerdeck", about = "Terminal control panel for a gossip node")]
struct Args {
    /// Base URL of the node's HTTP interface
    #[arg(short, long)]
    node: Option<String>,

    /// Milliseconds between snapshot refreshes
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Where downloaded files are saved
    #[arg(long)]
    download_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to peerdeck.log in current directory
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("peerdeck.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().map_err(std::io::Error::other)?;
    let cli = CliOverrides {
        node_url: args.node,
        poll_interval_ms: args.poll_interval_ms,
        download_dir: args.download_dir,
    };
    let resolved = config::resolve(&file_config, &cli);

    log::info!("peerdeck starting up against {}", resolved.node_url);

    tui::run(resolved)
}
