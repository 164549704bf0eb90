mod config;
mod console;
mod host;
mod store;

use config::ServerConfig;
use host::ConsoleHost;
use skywars_archive::ArchiveWorker;
use skywars_setup::{ArenaEditCoordinator, Stores};
use store::{JsonAnchorStore, JsonArenaStore, JsonStatsDatabase};
use tokio::io::AsyncBufReadExt;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let config = match ServerConfig::load("server.toml") {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load server.toml: {e}");
            std::process::exit(1);
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!("SkyWars setup v{} starting", env!("CARGO_PKG_VERSION"));
    info!("Worlds: {}", config.setup.worlds_dir.display());
    info!("Plugin data: {}", config.setup.data_dir.display());
    info!("Lobby world: {}", config.setup.lobby_world);

    let stores = Stores {
        arenas: Box::new(JsonArenaStore::new(config.setup.arenas_dir())),
        anchors: Box::new(JsonAnchorStore::new(config.setup.npc_file())),
        stats: Box::new(JsonStatsDatabase::new(config.setup.players_dir())),
    };
    let (worker, mut completions) = ArchiveWorker::new(tokio::runtime::Handle::current());
    let mut coordinator =
        ArenaEditCoordinator::new(config.setup.settings(), config.messages, worker, stores);
    if let Err(e) = coordinator.load_arenas() {
        error!("Failed to load arenas: {e}");
        std::process::exit(1);
    }
    let mut host = ConsoleHost::new(&config.setup.worlds_dir, config.setup.lobby_world.clone());

    // Console REPL: read lines from stdin
    let (console_tx, mut console_rx) = tokio::sync::mpsc::channel::<String>(32);
    tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim().to_string();
            if !line.is_empty() && console_tx.send(line).await.is_err() {
                break;
            }
        }
    });

    info!("Ready. Type 'help' for commands.");
    loop {
        tokio::select! {
            Some(line) = console_rx.recv() => {
                let result = match console::parse(&line) {
                    Ok(command) => console::execute(command, &mut coordinator, &mut host),
                    Err(message) => console::CommandResult::err(message),
                };
                for message in &result.messages {
                    if result.success {
                        info!("{message}");
                    } else {
                        warn!("{message}");
                    }
                }
                if result.should_stop {
                    break;
                }
            }
            Some(outcome) = completions.recv() => {
                coordinator.on_job_complete(&mut host, outcome);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    // Let running archive jobs land so no world is left half packed.
    if coordinator.jobs_in_flight() > 0 {
        info!("Waiting for {} archive job(s)...", coordinator.jobs_in_flight());
    }
    while coordinator.jobs_in_flight() > 0 {
        match completions.recv().await {
            Some(outcome) => coordinator.on_job_complete(&mut host, outcome),
            None => break,
        }
    }
    info!("Server shut down.");
}
