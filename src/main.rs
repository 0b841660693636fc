use mediflow::{init_tracing, run};

#[tokio::main]
async fn main() {
    init_tracing();

    let mut server = match run().await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Startup failed: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {e}");
    }
    server.shutdown();
}
