use std::{io, sync::Arc, time::Duration};

use anyhow::Context;
use chat_widget::{
    config::{ServerConfig, WidgetConfig},
    routes,
    services::backend_client::HttpBackend,
    state::AppState,
    widget::{
        ChatWidget, Controls,
        terminal::{LineActivations, LineBuffer, TerminalDispatch, TerminalSurface},
    },
};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chat with the backend from the terminal
    Chat {
        /// Chat endpoint URL
        #[arg(long, env = "CHAT_API_URL")]
        endpoint: Option<String>,

        /// Session id sent with every message
        #[arg(long, env = "CHAT_SESSION_ID")]
        session_id: Option<String>,
    },
    /// Run the development chat backend
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first so clap's env fallbacks see it
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    match Cli::parse().command {
        Command::Chat { endpoint, session_id } => {
            let mut config = WidgetConfig::from_env();
            if let Some(endpoint) = endpoint {
                config.endpoint_url = endpoint;
            }
            if let Some(session_id) = session_id {
                config.session_id = session_id;
            }
            chat(config).await
        }
        Command::Serve { host, port } => {
            let mut config = ServerConfig::from_env()?;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            serve(config).await
        }
    }
}

async fn chat(config: WidgetConfig) -> anyhow::Result<()> {
    let backend = HttpBackend::new(config.endpoint_url.clone());
    let input = LineBuffer::default();
    let controls = Controls {
        surface: TerminalSurface::new(io::stdout()),
        input: input.clone(),
        dispatch: TerminalDispatch::default(),
    };

    let mut widget = ChatWidget::new(config, backend, controls);
    let mut activations = LineActivations::new(tokio::io::stdin(), input);
    widget.run(&mut activations).await;
    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(config.session_ttl));

    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let period = sessions.ttl().clamp(Duration::from_secs(1), Duration::from_secs(60));
        let mut tick = tokio::time::interval(period);
        loop {
            tick.tick().await;
            let removed = sessions.purge_expired().await;
            if removed > 0 {
                info!(removed, "purged idle sessions");
            }
        }
    });

    let app = routes::create_router().with_state(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("chat backend running at http://{}", addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
