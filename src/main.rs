use anyhow::Result;
use bookshelf::application::{ServerConfig, serve};
use bookshelf::infrastructure::client::BookshelfClient;
use bookshelf::infrastructure::media::CloudinaryConfig;
use bookshelf::presentation::cli::{Cli, Commands, ServeCommand, auth, books};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before clap parses env vars)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(cmd) => run_server(cmd).await,
        Commands::Register(cmd) => {
            let client = BookshelfClient::from_base_url(&cli.api_url, cli.token)?;
            auth::register(&client, cmd).await
        }
        Commands::Login(cmd) => {
            let client = BookshelfClient::from_base_url(&cli.api_url, cli.token)?;
            auth::login(&client, cmd).await
        }
        Commands::Book { command } => {
            let client = BookshelfClient::from_base_url(&cli.api_url, cli.token)?;
            books::run(&client, command).await
        }
    }
}

async fn run_server(command: ServeCommand) -> Result<()> {
    let config = ServerConfig {
        bind_address: command.bind_address,
        database_url: command.database_url,
        jwt_secret: command.jwt_secret,
        token_ttl: command.jwt_expires_in,
        cloudinary: CloudinaryConfig {
            cloud_name: command.cloudinary_cloud_name,
            api_key: command.cloudinary_api_key,
            api_secret: command.cloudinary_api_secret,
            api_url: command.cloudinary_api_url,
        },
    };

    serve(config).await
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("RUST_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}
