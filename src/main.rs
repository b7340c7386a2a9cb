use std::path::Path;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use product_reviews::config::{AppState, Config};
use product_reviews::logger;
use product_reviews::server::{
    create_reusable_listener, start_server_loop, start_signal_handler, SignalHandler,
};
use product_reviews::store::{seed, MemoryStore, Services};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    let store = Arc::new(MemoryStore::new());
    if let Some(ref path) = cfg.seed.path {
        let summary = seed::load_file(&store, Path::new(path)).await?;
        logger::log_seed_loaded(path, &summary);
    }

    let state = Arc::new(AppState::new(cfg, Services::in_memory(store)));
    let listener = create_reusable_listener(addr)?;
    logger::log_server_start(&addr, &state.config, state.router.len());

    let signals = Arc::new(SignalHandler::new());
    start_signal_handler(Arc::clone(&signals));

    // Connections are served with spawn_local
    let local = tokio::task::LocalSet::new();
    local
        .run_until(start_server_loop(
            listener,
            state,
            Arc::new(AtomicUsize::new(0)),
            Arc::clone(&signals.shutdown),
        ))
        .await;

    Ok(())
}
