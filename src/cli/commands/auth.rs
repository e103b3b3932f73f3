use clap::Subcommand;
use serde_json::json;

use crate::cli::{utils, OutputFormat};
use crate::client;
use crate::session::{FileSessionStore, SessionManager, SessionState, SystemClock};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login with the pre-shared admin key")]
    Login {
        #[arg(help = "Admin access key")]
        key: String,
    },

    #[command(about = "Logout (deletes the stored session, no server call)")]
    Logout,

    #[command(about = "Show current session status")]
    Status,
}

fn session_manager() -> anyhow::Result<SessionManager<FileSessionStore, SystemClock>> {
    let path = FileSessionStore::default_path()?;
    Ok(SessionManager::new(FileSessionStore::new(path), SystemClock))
}

pub async fn handle(
    cmd: AuthCommands,
    server: &str,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let manager = session_manager()?;

    match cmd {
        AuthCommands::Login { key } => {
            if client::login(server, &manager, &key).await? {
                utils::output_success(&output_format, "Logged in", None)?;
            } else {
                utils::output_error(&output_format, "Access denied")?;
                std::process::exit(1);
            }
            Ok(())
        }
        AuthCommands::Logout => {
            client::logout(&manager)?;
            utils::output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            match manager.current()? {
                SessionState::Authenticated(session) => {
                    let expires = chrono::DateTime::from_timestamp_millis(session.expires_at)
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| session.expires_at.to_string());
                    utils::output_success(
                        &output_format,
                        &format!("Authenticated (session expires {})", expires),
                        Some(json!({ "expiresAt": session.expires_at })),
                    )
                }
                SessionState::Unauthenticated => {
                    utils::output_error(&output_format, "Not authenticated")
                }
            }
        }
    }
}
