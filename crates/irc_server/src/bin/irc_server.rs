//! CLI entry point (§1 non-goal: "The ... CLI/argument wrapper" is an
//! external collaborator). Parses flags with `clap`, loads the TOML
//! config `irc_server::config` defines, sets up logging with
//! `flexi_logger` the way the teacher's `main` does, loads the optional
//! MOTD file, and hands off to `irc_server::accept::run`.

use clap::Parser;
use flexi_logger::{Duplicate, Logger};
use log::info;
use tokio::net::TcpListener;

use irc_server::accept;
use irc_server::config::Config;
use irc_server::motd::load_motd;
use irc_server::registry::ServerState;

#[derive(Debug, Parser)]
#[command(name = "mantatail", about = "A single-process IRC server")]
struct Args {
    /// Path to a TOML config file; defaults are used for anything it
    /// doesn't set, per `irc_server::config::Config::default`.
    #[arg(long)]
    config: Option<String>,

    /// Overrides `network.bind_address` from the config file.
    #[arg(long)]
    bind: Option<String>,

    /// Overrides `network.port` from the config file.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    Logger::try_with_str("info")?
        .log_to_stderr()
        .duplicate_to_stderr(Duplicate::All)
        .start()?;

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(bind) = args.bind {
        config.network.bind_address = bind;
    }
    if let Some(port) = args.port {
        config.network.port = port;
    }

    let motd_lines = config.server.motd_path.as_deref().and_then(load_motd);

    let bind_addr = format!("{}:{}", config.network.bind_address, config.network.port);
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("{} listening on {bind_addr}", config.server.name);

    let state = ServerState::new(&config, motd_lines);
    accept::run(listener, state).await;
}
