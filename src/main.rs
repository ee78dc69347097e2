pub mod api;
pub mod config;
pub mod db;
pub mod engine;
pub mod rooms;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
            |_| tracing_subscriber::EnvFilter::new("info"),
        ))
        .init();

    let config = config::Config::from_env();
    api::server::start_server(config).await;
}
