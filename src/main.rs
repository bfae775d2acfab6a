use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

mod admin;
mod catalog;
mod config;
mod error;
mod handler;
mod http;
mod logger;
mod routes;
mod routing;
mod server;
mod views;

use error::AppResult;

fn main() -> AppResult<()> {
    let config_path = config::config_path_from_args(std::env::args().skip(1));
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Tokio runtime sized by `server.workers`
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> AppResult<()> {
    let addr = cfg.get_socket_addr()?;
    let state = Arc::new(config::AppState::new(&cfg)?);
    let listener = server::create_reusable_listener(addr)?;

    logger::log_server_start(&addr, &cfg, &state.routes.patterns());
    logger::log_info(&format!(
        "[Catalog] {} video(s) registered",
        state.catalog.len().await
    ));

    let shutdown = Arc::new(server::Shutdown::new());
    server::start_signal_handler(Arc::clone(&shutdown));

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(
            listener,
            state,
            Arc::new(AtomicUsize::new(0)),
            shutdown,
        ))
        .await;

    Ok(())
}
