mod aoi;
mod config;
mod connection;
mod context;
mod error;
mod listener;
mod player;
mod transport;
mod translator;
mod world;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use polaris_scheduler::Scheduler;
use polaris_world::flat_generator::FlatWorld;
use polaris_world::Location;
use tracing::{error, info, warn};

use config::ServerConfig;
use context::ServerContext;
use listener::Listener;
use transport::TransportKind;
use world::World;

fn main() {
    let config = Arc::new(match ServerConfig::load("server.toml") {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load server.toml: {e}");
            std::process::exit(1);
        }
    });

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let workers = config.network.worker_threads();
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(workers)
        .thread_name("polaris-worker")
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {e}");
            std::process::exit(1);
        }
    };

    runtime.block_on(serve(config, workers));
}

async fn serve(config: Arc<ServerConfig>, workers: usize) {
    info!(
        "Polaris v{} starting on {}",
        env!("CARGO_PKG_VERSION"),
        config.bind_address()
    );
    info!("MOTD: {}", config.server.motd);
    info!(
        "Max players: {}, view distance: {}",
        config.server.max_players, config.server.view_distance
    );

    let transport = TransportKind::probe();
    if transport.is_native() {
        info!(%transport, workers, "transport selected");
    } else {
        warn!(%transport, workers, "no native readiness backend, using portable transport");
    }

    let spawn = config.world.spawn;
    let provider = FlatWorld::generate(
        config.world.size as i32,
        Location::new(spawn.x, spawn.y, spawn.z),
    );
    info!(
        "World: {} ({}x{} chunks, spawn {:.1}/{:.1}/{:.1})",
        config.world.name, config.world.size, config.world.size, spawn.x, spawn.y, spawn.z
    );
    let world = Arc::new(World::new(
        Arc::new(provider),
        config.server.max_players as usize,
        config.server.view_distance,
    ));

    let scheduler = match Scheduler::new(tokio::runtime::Handle::current()) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to start scheduler");
            return;
        }
    };

    let mut ctx = ServerContext::new(Arc::clone(&config), Arc::clone(&world), scheduler.clone());
    if let Some(path) = &config.server.favicon {
        match context::load_favicon(path) {
            Ok(favicon) => ctx = ctx.with_favicon(favicon),
            Err(e) => warn!(path = %path, error = %e, "favicon not loaded"),
        }
    }
    let ctx = Arc::new(ctx);

    let listener = match Listener::bind(&config.bind_address(), Arc::clone(&ctx)).await {
        Ok(l) => l,
        Err(e) => {
            error!(address = %config.bind_address(), error = %e, "failed to bind");
            return;
        }
    };

    let shutdown_world = Arc::clone(&world);
    if let Err(e) = scheduler
        .shutdown_task(move || {
            info!(
                players = shutdown_world.player_count(),
                "scheduler shutting down"
            );
        })
        .schedule()
    {
        warn!(error = %e, "shutdown hook not registered");
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    listener.run(shutdown_rx).await;

    let players = world.players();
    for player in &players {
        player.session().disconnect("Shutting down");
    }
    futures::future::join_all(players.iter().map(|p| p.session().flushed())).await;
    scheduler.shutdown().await;
    info!("Server shut down.");
}
