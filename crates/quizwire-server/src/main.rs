use quizwire_server::{health, QuizServer, ServerConfig, ServerError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();

    let http_addr = config.http_addr.clone();
    tokio::spawn(async move {
        if let Err(e) = health::serve(&http_addr).await {
            tracing::error!(error = %e, "health endpoint failed");
        }
    });

    let server = QuizServer::bind(&config.ws_addr).await?;
    server.run().await
}
