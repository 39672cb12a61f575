use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use playground_saver::ai::openai::ReasoningEffort;
use playground_saver::ai::{ClientFactory, OpenAiClientFactory};
use playground_saver::cache::TurnCache;
use playground_saver::cli::{self, ChatSession, TurnOptions};
use playground_saver::config::Settings;
use playground_saver::server::{create_router, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

#[derive(Debug, Parser)]
#[command(name = "playground-saver")]
#[command(about = "Continue OpenAI Playground conversations from a response ID")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the web UI and JSON API.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Send one message continuing from a response.
    Continue {
        /// Response ID to continue from (e.g. resp_0a6e586e...).
        response_id: String,
        message: String,
        #[arg(short, long)]
        model: Option<String>,
        #[arg(short, long, value_enum)]
        reasoning_effort: Option<ReasoningEffort>,
        /// Local image to attach; repeatable.
        #[arg(short = 'i', long = "image")]
        images: Vec<PathBuf>,
        /// Image URL to attach; repeatable.
        #[arg(short = 'u', long = "image-url")]
        image_urls: Vec<String>,
        #[arg(long)]
        instructions: Option<String>,
    },
    /// Interactive chat continuing from a response.
    Chat {
        response_id: String,
        #[arg(short, long)]
        model: Option<String>,
        #[arg(short, long, value_enum)]
        reasoning_effort: Option<ReasoningEffort>,
        /// System instructions to add or override.
        #[arg(long)]
        instructions: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playground_saver=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();
    let settings = Settings::from_env().context("Failed to load settings")?;

    let outcome = match args.command {
        Command::Serve { host, port } => serve(settings, host, port).await,
        Command::Continue {
            response_id,
            message,
            model,
            reasoning_effort,
            images,
            image_urls,
            instructions,
        } => {
            let options = TurnOptions {
                model: model.unwrap_or_else(|| settings.default_model.clone()),
                reasoning_effort,
                instructions,
            };
            continue_once(&settings, &response_id, &message, &options, &images, &image_urls)
                .await
        }
        Command::Chat {
            response_id,
            model,
            reasoning_effort,
            instructions,
        } => {
            let options = TurnOptions {
                model: model.unwrap_or_else(|| settings.default_model.clone()),
                reasoning_effort,
                instructions,
            };
            chat(&settings, response_id, options).await
        }
    };

    if let Err(e) = outcome {
        error!("{:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn client_factory(settings: &Settings) -> Result<OpenAiClientFactory> {
    OpenAiClientFactory::new(settings.upstream.base_url.clone(), settings.upstream.timeout)
        .context("Failed to build HTTP client")
}

async fn serve(settings: Settings, host: Option<String>, port: Option<u16>) -> Result<()> {
    let state = AppState {
        clients: Arc::new(client_factory(&settings)?),
        cache: Arc::new(TurnCache::new(
            settings.cache.capacity,
            settings.cache.ttl,
        )),
        default_model: settings.default_model.clone(),
        fallback_api_key: settings.upstream.api_key.clone(),
    };

    let app = create_router(state);

    let addr = format!(
        "{}:{}",
        host.unwrap_or(settings.server.host),
        port.unwrap_or(settings.server.port)
    );
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Server listening on http://{}", addr);
    if settings.upstream.api_key.is_some() {
        warn!(
            "OPENAI_API_KEY is set: requests without an api_key will use the server's key. Cross-origin requests are refused"
        );
    }
    if settings.cache.capacity == 0 {
        info!("Turn cache disabled");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

async fn continue_once(
    settings: &Settings,
    response_id: &str,
    message: &str,
    options: &TurnOptions,
    images: &[PathBuf],
    image_urls: &[String],
) -> Result<()> {
    let api = client_factory(settings)?.connect(&settings.require_api_key()?);

    println!("Continuing from: {}", response_id);
    println!("Model: {}", options.model);
    let attached = images.len() + image_urls.len();
    if attached > 0 {
        println!("Images: {}", attached);
    }
    println!("{}", "-".repeat(50));

    let reply = cli::run_continue(
        api.as_ref(),
        response_id,
        message,
        options,
        images,
        image_urls,
    )
    .await?;

    println!("{}", reply.text);
    println!("{}", "-".repeat(50));
    println!("New response ID: {}", reply.response_id);
    Ok(())
}

async fn chat(settings: &Settings, response_id: String, options: TurnOptions) -> Result<()> {
    let api = client_factory(settings)?.connect(&settings.require_api_key()?);
    let mut session = ChatSession::new(response_id, options);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    cli::run_chat(api.as_ref(), &mut session, stdin, &mut stdout).await?;
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate_signal) => {
                tokio::select! {
                    res = tokio::signal::ctrl_c() => {
                        if let Err(err) = res {
                            error!("Failed to listen for Ctrl+C: {}", err);
                        }
                    },
                    _ = terminate_signal.recv() => {},
                }
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {}", err);
                if let Err(err) = tokio::signal::ctrl_c().await {
                    error!("Failed to listen for Ctrl+C: {}", err);
                }
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", err);
        }
    }

    info!("Shutdown signal received, commencing graceful shutdown");
}
