use anyhow::Result;
use clap::Args;

use super::print_json;
use crate::infrastructure::client::BookshelfClient;
use crate::infrastructure::client::auth::{LoginPayload, RegisterPayload};

#[derive(Debug, Args)]
pub struct RegisterCommand {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub username: String,
    #[arg(long, env = "BOOKSHELF_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct LoginCommand {
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "BOOKSHELF_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn register(client: &BookshelfClient, cmd: RegisterCommand) -> Result<()> {
    let response = client
        .auth()
        .register(&RegisterPayload {
            email: cmd.email,
            username: cmd.username,
            password: cmd.password,
        })
        .await?;
    print_json(&response)
}

pub async fn login(client: &BookshelfClient, cmd: LoginCommand) -> Result<()> {
    let response = client
        .auth()
        .login(&LoginPayload {
            email: cmd.email,
            password: cmd.password,
        })
        .await?;
    print_json(&response)
}
