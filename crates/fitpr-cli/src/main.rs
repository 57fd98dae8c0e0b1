//! fitpr CLI
//!
//! Command-line interface for the fitpr service

use std::fmt::Write as _;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use fitpr_api::ApiErrorResponse;
use fitpr_client::{ClientError, HttpClient};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:8000";

#[derive(Parser)]
#[command(name = "fitpr-cli")]
#[command(about = "FitPr service CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Service base URL
    #[arg(long, env = "FITPR_URL")]
    url: Option<String>,

    /// Print raw JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service health
    Health,
    /// Show service information
    Info,
    /// Check a client's PIN
    #[command(name = "verify-pin")]
    VerifyPin {
        /// Client id
        client: String,
        /// 4-6 digit PIN
        pin: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let url = base_url(cli.url, std::env::var("NEXT_PUBLIC_BACKEND_URL").ok());
    let client = HttpClient::new(&url)?;

    let json = cli.json;
    let outcome = match cli.command {
        Commands::Health => client
            .health()
            .await
            .map(|health| render(json, &health, |h| format!("{url}: {}", h.status))),
        Commands::Info => client.root().await.map(|info| {
            render(json, &info, |i| format!("{} {} ({})", i.message, i.version, i.status))
        }),
        Commands::VerifyPin { client: id, pin } => {
            client.verify_pin(id, pin).await.map(|verified| {
                render(json, &verified, |v| {
                    format!("Verified {} ({}) at {}", v.client.name, v.client.id, v.verified_at)
                })
            })
        }
    };

    match outcome {
        Ok(line) => println!("{}", line?),
        Err(ClientError::Api(error)) => {
            eprintln!("{}", describe_failure(&error));
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

/// Explicit flag or `FITPR_URL`, then the frontend variable, then localhost
fn base_url(explicit: Option<String>, frontend: Option<String>) -> String {
    explicit
        .or(frontend)
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_URL.to_string())
}

fn render<T: Serialize>(
    json: bool,
    value: &T,
    text: impl FnOnce(&T) -> String,
) -> serde_json::Result<String> {
    if json {
        serde_json::to_string(value)
    } else {
        Ok(text(value))
    }
}

fn describe_failure(error: &ApiErrorResponse) -> String {
    let mut line = format!("{} ({}): {}", error.code, error.status_code, error.message);
    if let Some(request_id) = &error.request_id {
        let _ = write!(line, " [request {request_id}]");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitpr_api::ErrorCode;

    #[test]
    fn test_base_url_precedence() {
        assert_eq!(
            base_url(Some("http://a:1".into()), Some("http://b:2".into())),
            "http://a:1"
        );
        assert_eq!(base_url(None, Some("http://b:2".into())), "http://b:2");
        assert_eq!(base_url(None, None), DEFAULT_URL);
        assert_eq!(base_url(Some(" ".into()), None), DEFAULT_URL);
    }

    #[test]
    fn test_render_modes() {
        let health = fitpr_api::responses::HealthResponse {
            status: "healthy".to_string(),
        };
        assert_eq!(
            render(true, &health, |h| h.status.clone()).unwrap(),
            r#"{"status":"healthy"}"#
        );
        assert_eq!(render(false, &health, |h| h.status.clone()).unwrap(), "healthy");
    }

    #[test]
    fn test_describe_failure() {
        let error = ApiErrorResponse::new(ErrorCode::AuthenticationError, "Incorrect PIN")
            .with_request_id("req-1");
        assert_eq!(
            describe_failure(&error),
            "AUTHENTICATION_ERROR (401): Incorrect PIN [request req-1]"
        );
    }
}
