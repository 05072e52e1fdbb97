use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use image_editor::app::App;
use image_editor::models::{Config, Conversation, ImagePayload};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "image-editor")]
#[command(about = "Edit images with natural-language instructions")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Edit an image, continuing the conversation stored in the history file.
    Edit {
        /// Editing instruction.
        prompt: String,
        /// Image to attach to this turn: a file path or a `data:` URI.
        #[arg(long, value_name = "PATH_OR_DATA_URI")]
        image: Option<String>,
        /// JSON file holding the conversation so far; updated on success.
        #[arg(long, value_name = "FILE", default_value = "conversation.json")]
        history: PathBuf,
    },
    /// Upload an image and edit it without any prior context.
    Upload {
        #[arg(value_name = "PATH")]
        file: PathBuf,
        prompt: String,
    },
    /// Forget the stored conversation.
    Reset {
        #[arg(long, value_name = "FILE", default_value = "conversation.json")]
        history: PathBuf,
    },
}

fn load_conversation(path: &Path) -> Result<Conversation> {
    if !path.exists() {
        return Ok(Conversation::new());
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read history file {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Invalid history file {}", path.display()))
}

fn save_conversation(path: &Path, conversation: &Conversation) -> Result<()> {
    let json = serde_json::to_string_pretty(conversation)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write history file {}", path.display()))
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Reset { history } => {
            let mut conversation = load_conversation(&history)?;
            conversation.reset();
            save_conversation(&history, &conversation)?;
            info!("Cleared conversation in {}", history.display());
        }
        Command::Edit {
            prompt,
            image,
            history,
        } => {
            let app = App::new(&Config::from_env()?)?;
            let mut conversation = load_conversation(&history)?;

            let image = image.map(ImagePayload::from_client_value);
            let response = app
                .continue_conversation(&mut conversation, &prompt, image)
                .await?;
            save_conversation(&history, &conversation)?;

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Upload { file, prompt } => {
            let app = App::new(&Config::from_env()?)?;
            let file_name = file
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default()
                .to_string();
            let data = std::fs::read(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let upload = app.edit_upload(&file_name, &data, &prompt).await?;
            println!("{}", serde_json::to_string_pretty(&upload)?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "image_editor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    match run(args.command).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Error processing image: {:#}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit_image(args: &[&str]) -> Option<ImagePayload> {
        let cli = CliArgs::try_parse_from(args).unwrap();
        match cli.command {
            Command::Edit { image, .. } => image.map(ImagePayload::from_client_value),
            other => panic!("expected edit command, got {:?}", other),
        }
    }

    #[test]
    fn test_edit_accepts_data_uri_image() {
        assert_eq!(
            edit_image(&["image-editor", "edit", "x", "--image", "data:image/png;base64,AAAA"]),
            Some(ImagePayload::DataUri("data:image/png;base64,AAAA".to_string()))
        );
    }

    #[test]
    fn test_edit_accepts_file_image() {
        assert_eq!(
            edit_image(&["image-editor", "edit", "x", "--image", "cat.png"]),
            Some(ImagePayload::File(PathBuf::from("cat.png")))
        );
        assert_eq!(edit_image(&["image-editor", "edit", "x"]), None);
    }
}
