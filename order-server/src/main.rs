use order_server::{Config, Server, ServerState, init_logger_with_file};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Environment (dotenv, logging)
    dotenv::dotenv().ok();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;
    init_logger_with_file(None, config.log_dir().to_str());

    tracing::info!("Order server starting...");

    // 2. Initialize server state
    let state = ServerState::initialize(&config).await?;

    // 3. Run (background tasks start inside Server::run)
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
