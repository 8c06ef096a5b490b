use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};

use reform_assistant::config::ProviderConfig;
use reform_assistant::openai::OpenAiClient;
use reform_assistant::prompt::StyleRules;
use reform_assistant::web_server::{self, AppState};

/// Chat backend for the Re-Home Kumamoto renovation assistant widget.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port for the web server.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for environment variables like API keys)
    dotenvy::dotenv().ok();

    // Initialize tracing (logging) subscriber.
    // Reads log level from RUST_LOG (e.g. RUST_LOG=info,reform_assistant=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // Provider settings are read once here and stay immutable for the
    // process lifetime; every handler sees the same config through AppState.
    let config = ProviderConfig::from_env();
    if !config.has_credential() {
        warn!("OPENAI_API_KEY is not set; requests will return the fallback message");
    }

    let state = AppState {
        client: Arc::new(OpenAiClient::new(config)),
        rules: Arc::new(StyleRules::default()),
    };

    info!("Starting reform-assistant on port {}", cli.port);

    let mut server_handle = tokio::spawn(async move {
        if let Err(e) = web_server::start_web_server(cli.port, state).await {
            error!("Web server failed: {:?}", e);
        }
    });

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    tokio::select! {
        _ = &mut ctrl_c => {
            info!("Ctrl-C received, initiating shutdown...");
            server_handle.abort();
        }
        res = &mut server_handle => {
            match res {
                Ok(()) => info!("Web server task completed unexpectedly."),
                Err(e) if e.is_panic() => error!("Web server task panicked: {:?}", e),
                Err(e) => error!("Web server task failed: {:?}", e),
            }
        }
    }

    info!("Shutdown complete.");
    Ok(())
}
