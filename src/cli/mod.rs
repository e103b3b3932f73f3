pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "portfolio")]
#[command(about = "Portfolio CLI - admin interface for the portfolio API")]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "API server base URL (defaults to PORTFOLIO_SERVER_URL or http://localhost:3000)"
    )]
    pub server: Option<String>,

    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Admin session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Privileged data operations on portfolio tables")]
    Data {
        #[command(subcommand)]
        cmd: commands::data::DataCommands,
    },
}

#[derive(Debug, Clone)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub fn server_url(cli: &Cli) -> String {
    cli.server
        .clone()
        .or_else(|| std::env::var("PORTFOLIO_SERVER_URL").ok())
        .unwrap_or_else(|| "http://localhost:3000".to_string())
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let server = server_url(&cli);

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &server, output_format).await,
        Commands::Data { cmd } => commands::data::handle(cmd, &server, output_format).await,
    }
}
