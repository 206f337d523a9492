//! Clinex Server
//!
//! HTTP front end for the clinical note extractor. Serves a health probe at
//! `GET /` and accepts multipart uploads at `POST /extract`.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use clinex_extractor::Extractor;
use clinex_llm::{GroqProvider, LlmError};
use config::ServerConfig;
use handlers::{build_app, AppState};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log directives used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "clinex_server=info,clinex_extractor=info,clinex_llm=info";

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Provider could not be constructed
    #[error("LLM provider error: {0}")]
    Llm(#[from] LlmError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Install the global tracing subscriber
///
/// Honors `RUST_LOG`, falling back to [`DEFAULT_LOG_FILTER`].
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Start the HTTP server
///
/// Builds the Groq provider and extractor from `config`, then serves until
/// the listener fails.
pub async fn start_server(config: ServerConfig, api_key: String) -> Result<(), ServerError> {
    config.validate()?;

    info!("Starting Clinex server");
    info!("Model: {}", config.llm.model);
    info!("Allowed origins: {}", config.allowed_origins.join(", "));

    let provider = GroqProvider::new(api_key, config.llm.clone())?;
    let extractor = Extractor::new(provider, config.extractor.clone());
    let app = build_app(AppState::new(extractor), &config)?;

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_display() {
        let err = ServerError::from(config::ConfigError::MissingApiKey(
            config::API_KEY_ENV.to_string(),
        ));
        assert_eq!(
            err.to_string(),
            "Configuration error: Set GROQ_API_KEY in the environment or a .env file"
        );
    }

    #[tokio::test]
    async fn test_start_server_rejects_invalid_config() {
        let config = ServerConfig {
            max_upload_bytes: 0,
            ..ServerConfig::default()
        };
        let result = start_server(config, "key".to_string()).await;
        assert!(matches!(result, Err(ServerError::Config(_))));
    }
}
