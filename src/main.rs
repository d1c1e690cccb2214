use ranksim::transport::{ServerConfig, SimulationServer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env()?;
    log::info!(
        "Engine settings: {:?} mode, pool size {:?}, seed {:?}, max rejection attempts {}",
        config.engine.concurrency_mode,
        config.engine.thread_pool_size,
        config.engine.seed,
        config.engine.max_rejection_attempts
    );

    let server = SimulationServer::bind(config)?;
    server.serve()?;
    Ok(())
}
