mod config;
mod database;
mod entities;
mod http_server;
mod logging;
mod services;
#[cfg(test)]
mod test_utils;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context};

use crate::{
    config::Config,
    database::Database,
    http_server::app::HttpServerConfig,
    logging::{init_tracing, shutdown_tracing},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "MOVIE_CATALOG_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log filter, in `tracing` env-filter syntax
    #[arg(long, default_value = "info,sqlx=warn", global = true, env = "LOG_LEVEL")]
    log_level: String,

    /// OTLP/gRPC endpoint to export traces to
    #[arg(long, env = "OTLP_ENDPOINT", global = true)]
    otlp_endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the movie catalog API
    Serve {
        /// The port to run the server on
        #[arg(short, long, default_value = "8000", env = "MOVIE_CATALOG_HTTP_PORT")]
        port: u16,

        /// The address to bind to
        #[arg(long, default_value = "0.0.0.0", env = "MOVIE_CATALOG_HTTP_HOST")]
        host: String,

        /// Catalog database URL, overrides the config file
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>,
    },
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let tracer_provider = init_tracing(args.otlp_endpoint.as_deref(), &args.log_level)?;

    let result = run(args).await;

    shutdown_tracing(tracer_provider);
    result
}

async fn run(args: Args) -> Result<()> {
    log::debug!("Loading configuration");
    let config = match &args.config {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
    .wrap_err("Failed to load movie-catalog config")?;

    match args.command {
        Commands::Serve {
            port,
            host,
            database_url,
        } => {
            let database_url = config.database_url(database_url)?;
            let database = Database::connect(&database_url, &config.database).await?;

            log::info!("Starting HTTP server on port: {}", port);
            http_server::app::start(HttpServerConfig {
                host,
                port,
                database,
                page_size: config.api.page_size,
            })
            .await?;
        }
        Commands::Config(config_commands) => match config_commands {
            ConfigCommands::CreateDefault => {
                let path = Config::create_default()?;
                println!("{}", path.display());
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        },
    }

    Ok(())
}
