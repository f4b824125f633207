//! Canvass CLI
//!
//! Runs the survey API and a few operator utilities around it.
//!
//! ```bash
//! canvass serve                          # listen on server.bind
//! canvass serve --bind 127.0.0.1:8080
//! canvass issue-token --email ann@example.com --name Ann
//! canvass config                         # print the resolved configuration
//! canvass routes
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use canvass_ai::SummaryGenerator;
use canvass_config::{Config, DatabaseBackend};
use canvass_core::{InMemoryStore, SocialProfile};
use canvass_mongodb::MongoStore;
use canvass_web::middleware::session_cookie;
use canvass_web::routes::ROUTES;
use canvass_web::AppState;

const REDACTED: &str = "<redacted>";

#[derive(Parser)]
#[command(name = "canvass")]
#[command(about = "Canvass - survey API with dashboard statistics and AI summaries")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.config/canvass/config.yaml)
    #[arg(short, long, global = true, env = "CANVASS_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Address to bind, overrides server.bind
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Sign a user in as if they came back from Google and print a session token
    IssueToken {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,

        /// Google account id (defaults to the email)
        #[arg(long)]
        provider_id: Option<String>,
    },

    /// Print the resolved configuration as YAML
    Config {
        /// Include the JWT secret and API key
        #[arg(long)]
        show_secrets: bool,
    },

    /// List the API routes
    Routes,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Serve { bind } => serve(config, bind).await,
        Commands::IssueToken {
            email,
            name,
            provider_id,
        } => issue_token(config, &email, name.as_deref(), provider_id.as_deref()).await,
        Commands::Config { show_secrets } => print_config(config, show_secrets),
        Commands::Routes => {
            print_routes(&config);
            Ok(())
        }
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "canvass=info,canvass_web=info,canvass_ai=info,canvass_mongodb=info,tower_http=info".into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn build_state(config: &Config) -> Result<Arc<AppState>> {
    config.validate()?;

    let repos = match config.database.backend {
        DatabaseBackend::Memory => {
            tracing::warn!("using the in-memory store; data is lost on exit");
            InMemoryStore::repositories()
        }
        DatabaseBackend::Mongodb => {
            let store = MongoStore::connect(&config.database.uri, &config.database.name)
                .await
                .with_context(|| format!("connecting to MongoDB at {}", config.database.uri))?;
            tracing::info!(database = %config.database.name, "connected to MongoDB");
            store.repositories()
        }
    };

    let generator = SummaryGenerator::from_config(&config.ai).context("configuring AI client")?;
    Ok(AppState::new(config, repos, generator)?)
}

async fn serve(mut config: Config, bind: Option<String>) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    let state = build_state(&config).await?;
    canvass_web::serve(state, &config.server.bind)
        .await
        .with_context(|| format!("serving on {}", config.server.bind))
}

async fn issue_token(
    config: Config,
    email: &str,
    name: Option<&str>,
    provider_id: Option<&str>,
) -> Result<()> {
    if config.database.backend == DatabaseBackend::Memory {
        tracing::warn!("memory backend: the user will not exist in a separate server process");
    }
    let state = build_state(&config).await?;

    let profile = SocialProfile::google(provider_id.unwrap_or(email), email, name);
    let user = state.auth.validate_social_user(&profile).await?;
    let login = state.auth.login(&user)?;

    println!("User:   {} <{}>", user.id, user.email);
    println!("Token:  {}", login.access_token);
    println!(
        "Cookie: {}",
        session_cookie(&state.session, login.access_token.clone())
    );
    Ok(())
}

fn print_config(mut config: Config, show_secrets: bool) -> Result<()> {
    if !show_secrets {
        if !config.auth.jwt_secret.is_empty() {
            config.auth.jwt_secret = REDACTED.to_string();
        }
        if config.ai.api_key.is_some() {
            config.ai.api_key = Some(REDACTED.to_string());
        }
    }
    print!("{}", config.to_yaml()?);
    Ok(())
}

fn print_routes(config: &Config) {
    let prefix = config.api_prefix();
    for (method, path, description) in ROUTES {
        println!("{:<7} {:<32} {}", method, format!("{prefix}{path}"), description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_config_after_subcommand() {
        let cli = Cli::parse_from(["canvass", "serve", "--bind", "127.0.0.1:9000", "-c", "x.yaml"]);
        assert_eq!(cli.config, Some(PathBuf::from("x.yaml")));
        match cli.command {
            Commands::Serve { bind } => assert_eq!(bind.as_deref(), Some("127.0.0.1:9000")),
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn issue_token_requires_email() {
        assert!(Cli::try_parse_from(["canvass", "issue-token"]).is_err());
    }
}
