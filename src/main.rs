mod chat;
mod cli;
mod color;
mod config;
mod persona;
mod providers;
mod session;
mod utils;
mod version;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use cli::{chat::chat_cmd, personas::personas_cmd, ColorMode};
use persona::Personas;
use tracing_subscriber::EnvFilter;

#[derive(
    Parser, Default, Clone, Copy, ValueEnum, strum_macros::Display, strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum RequestedColorMode {
    #[default]
    Auto,
    On,
    Off,
}

#[derive(Parser)]
#[command(name = "persona-chat")]
#[command(about = "A terminal chat client for persona-driven chat models", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    #[arg(long, default_value_t = RequestedColorMode::default())]
    color: RequestedColorMode,
    /// Read the configuration from the specified file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a chat
    Chat(ChatArgs),
    /// List available personas
    Personas(PersonasArgs),
}

#[derive(Parser, Default)]
pub(crate) struct ChatArgs {
    /// Chat with the specified persona
    #[arg(short, long)]
    persona: Option<String>,
    /// Specifies the model to be used during the chat
    #[arg(short, long)]
    model: Option<String>,
}

/// Output formats
#[derive(
    Parser, ValueEnum, Default, Clone, Copy, strum_macros::Display, strum_macros::EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub(crate) enum ListingFormat {
    /// Format the output as a table
    #[default]
    Table,
    /// Format the output as JSON
    Json,
    /// Format the output as a table without a header
    HeaderlessTable,
}

#[derive(Parser)]
pub(crate) struct PersonasArgs {
    /// Output the listing with the specified format
    #[arg(short, long, default_value_t = ListingFormat::default())]
    format: ListingFormat,
}

/// Developer logging goes to standard error and is silent unless `RUST_LOG`
/// asks for it, so it never interleaves with the conversation.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing();

    color::configure_color(ColorMode::resolve_auto(cli.color));

    let config = match config::read_config(cli.config) {
        Ok(config) => config,
        Err(err) => die!("{}", err),
    };

    let personas = Personas::with_overrides(&config.personas);

    match &cli.command {
        Some(Commands::Chat(args)) => chat_cmd(&config, &personas, args).await,
        Some(Commands::Personas(args)) => personas_cmd(&personas, args),
        None => chat_cmd(&config, &personas, &ChatArgs::default()).await,
    }
}
