use std::path::Path;

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::{Args, Subcommand};

use super::print_json;
use crate::domain::ids::BookId;
use crate::infrastructure::client::BookshelfClient;
use crate::infrastructure::client::books::NewBookPayload;

#[derive(Debug, Subcommand)]
pub enum BookCommands {
    /// Recommend a book
    Add(AddBookCommand),
    /// List everyone's recommendations, newest first
    List(ListBooksCommand),
    /// List your own recommendations
    Mine,
    /// Delete one of your recommendations
    Delete(DeleteBookCommand),
}

pub async fn run(client: &BookshelfClient, cmd: BookCommands) -> Result<()> {
    match cmd {
        BookCommands::Add(c) => add_book(client, c).await,
        BookCommands::List(c) => list_books(client, c).await,
        BookCommands::Mine => print_json(&client.books().mine().await?),
        BookCommands::Delete(c) => print_json(&client.books().delete(c.id).await?),
    }
}

#[derive(Debug, Args)]
pub struct AddBookCommand {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub caption: String,
    /// 1 to 5
    #[arg(long)]
    pub rating: i64,
    /// Image URL, or a path to a local image file
    #[arg(long)]
    pub image: String,
}

#[derive(Debug, Args)]
pub struct ListBooksCommand {
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Debug, Args)]
pub struct DeleteBookCommand {
    #[arg(long)]
    pub id: BookId,
}

async fn add_book(client: &BookshelfClient, cmd: AddBookCommand) -> Result<()> {
    let image = image_payload(&cmd.image)?;
    let response = client
        .books()
        .create(&NewBookPayload {
            title: cmd.title,
            caption: cmd.caption,
            rating: cmd.rating,
            image,
        })
        .await?;
    print_json(&response)
}

async fn list_books(client: &BookshelfClient, cmd: ListBooksCommand) -> Result<()> {
    let response = client.books().list(cmd.page, cmd.limit).await?;
    print_json(&response)
}

/// Remote and `data:` URLs pass through; anything else is read from disk and
/// encoded as a base64 data URI.
fn image_payload(image: &str) -> Result<String> {
    let lowered = image.to_ascii_lowercase();
    if ["http://", "https://", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return Ok(image.to_string());
    }

    let path = Path::new(image);
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read image {}", path.display()))?;
    Ok(format!(
        "data:{};base64,{}",
        mime_type(path),
        STANDARD.encode(bytes)
    ))
}

fn mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
