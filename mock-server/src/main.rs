use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let mut config = mock_server::MockConfig::default();
    if let Ok(token) = std::env::var("MOCK_AUTH_TOKEN") {
        config.auth_token = token;
    }

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("mock Hakuna API listening on http://{addr}/api/v1");
    mock_server::serve(listener, mock_server::app_with(config)).await
}
