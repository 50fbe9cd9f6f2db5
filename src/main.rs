//! sql-desk - a conversational natural-language-to-SQL assistant.

use sql_desk::api::{HttpConfig, HttpService, MockService, QueryService};
use sql_desk::chat::ChatSession;
use sql_desk::cli::Cli;
use sql_desk::config::Config;
use sql_desk::error::Result;
use sql_desk::schema::SchemaRegistry;
use sql_desk::{logging, repl};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Load .env before clap reads env-backed flags
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();

    if cli.log_file {
        logging::init_file_logging();
    } else {
        logging::init_stderr_logging();
    }

    if let Err(e) = run(cli).await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let service: Box<dyn QueryService> = if cli.mock {
        info!("Using the built-in mock backend");
        Box::new(MockService::new().with_schemas(["example.txt"]))
    } else {
        let service_config = resolve_service(&cli, &config);
        info!("Backend: {}", service_config.base_url);
        Box::new(HttpService::new(service_config)?)
    };

    if cli.check {
        let status = service.health().await?;
        println!("Backend status: {status}");
        return Ok(());
    }

    let mut session = ChatSession::new();
    let mut registry = SchemaRegistry::new();

    // A cold backend is not fatal; the user can retry with /schemas later
    if let Err(e) = registry.refresh(service.as_ref()).await {
        warn!("Could not fetch schema list: {e}");
        println!("Warning: could not fetch schema list: {e}");
    }

    if let Some(schema) = &cli.schema {
        registry.select(Some(schema))?;
        info!("Schema context: {schema}");
    }

    repl::run(service.as_ref(), &mut session, &mut registry).await
}

/// Resolves the backend configuration from CLI args (highest precedence)
/// and the config file.
fn resolve_service(cli: &Cli, config: &Config) -> HttpConfig {
    let base_url = cli
        .url
        .clone()
        .unwrap_or_else(|| config.service.base_url.clone());
    let timeout_secs = cli.timeout.unwrap_or(config.service.timeout_secs);

    HttpConfig::new(base_url).with_timeout(timeout_secs)
}
