pub mod auth;
pub mod books;

use std::net::SocketAddr;
use std::time::Duration;

use auth::{LoginCommand, RegisterCommand};
use books::BookCommands;
use clap::{Args, Parser, Subcommand};

use crate::infrastructure::media::CLOUDINARY_API_URL;

#[derive(Debug, Parser)]
#[command(author, version, about = "Share book recommendations", long_about = None)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "BOOKSHELF_URL",
        default_value = "http://localhost:3000"
    )]
    pub api_url: String,

    /// Bearer token from `register` or `login`
    #[arg(long, global = true, env = "BOOKSHELF_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeCommand),

    /// Create an account and print its token
    Register(RegisterCommand),

    /// Log in and print a fresh token
    Login(LoginCommand),

    /// Manage book recommendations
    Book {
        #[command(subcommand)]
        command: BookCommands,
    },
}

#[derive(Debug, Args)]
pub struct ServeCommand {
    #[arg(
        long,
        env = "BOOKSHELF_DATABASE_URL",
        default_value = "sqlite://bookshelf.db"
    )]
    pub database_url: String,

    #[arg(long, env = "BOOKSHELF_BIND_ADDRESS", default_value = "127.0.0.1:3000")]
    pub bind_address: SocketAddr,

    #[arg(long, env = "BOOKSHELF_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Token lifetime, e.g. `15d`, `12h`, `30m`, `90s`
    #[arg(
        long,
        env = "BOOKSHELF_JWT_EXPIRES_IN",
        default_value = "15d",
        value_parser = parse_token_ttl
    )]
    pub jwt_expires_in: Duration,

    #[arg(long, env = "BOOKSHELF_CLOUDINARY_CLOUD_NAME")]
    pub cloudinary_cloud_name: String,

    #[arg(long, env = "BOOKSHELF_CLOUDINARY_API_KEY")]
    pub cloudinary_api_key: String,

    #[arg(long, env = "BOOKSHELF_CLOUDINARY_API_SECRET", hide_env_values = true)]
    pub cloudinary_api_secret: String,

    #[arg(long, env = "BOOKSHELF_CLOUDINARY_API_URL", default_value = CLOUDINARY_API_URL)]
    pub cloudinary_api_url: String,
}

/// Parses `<n>[s|m|h|d]`; a bare number is seconds.
pub fn parse_token_ttl(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    let (digits, unit_secs) = match value.char_indices().last() {
        Some((idx, 's')) => (&value[..idx], 1),
        Some((idx, 'm')) => (&value[..idx], 60),
        Some((idx, 'h')) => (&value[..idx], 3_600),
        Some((idx, 'd')) => (&value[..idx], 86_400),
        Some(_) => (value, 1),
        None => return Err("token lifetime must not be empty".to_string()),
    };

    let amount: u64 = digits
        .trim()
        .parse()
        .map_err(|_| format!("invalid token lifetime: {value} (expected e.g. 15d, 12h, 30m)"))?;
    if amount == 0 {
        return Err("token lifetime must be positive".to_string());
    }

    amount
        .checked_mul(unit_secs)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("token lifetime too large: {value}"))
}

pub(crate) fn print_json<T>(value: &T) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
