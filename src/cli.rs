//! Command-line surface. Each subcommand wires real collaborators into
//! a `CaptureController` (or a bare client) and prints the outcome.

use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::camera::{Camera, FileCamera, Permission, ScreenCamera};
use crate::clipboard::{Clipboard, SystemClipboard};
use crate::config::{self, AppConfig, ConfigError, ReleaseChannel};
use crate::controller::{CaptureController, CaptureReport, LogNotifier, ScanError};
use crate::vision::{OcrClient, RecognitionError, VisionClient};

#[derive(Debug, Parser)]
#[command(name = "what-text", version, about = "Photograph text, get it back as a string")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Take a photo, upload it, and transcribe it
    #[command(group(ArgGroup::new("source").required(true).args(["image", "screen"])))]
    Scan {
        /// Use an existing image file as the photo
        #[arg(long)]
        image: Option<PathBuf>,
        /// Grab the primary screen instead of a file
        #[arg(long)]
        screen: bool,
        /// Copy the transcription to the clipboard
        #[arg(long)]
        copy: bool,
    },
    /// Transcribe an image that is already publicly reachable
    Analyze {
        url: String,
        #[arg(long)]
        copy: bool,
    },
    /// Store the Vision API key in the OS keychain
    SetKey {
        key: String,
        /// staging (default) or production
        #[arg(long)]
        channel: Option<String>,
    },
    /// Check that the configured Vision key is accepted
    Check,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("Vision key was rejected")]
    KeyRejected,
}

impl From<RecognitionError> for CliError {
    fn from(e: RecognitionError) -> Self {
        CliError::Scan(e.into())
    }
}

pub async fn execute(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Scan {
            image,
            screen,
            copy,
        } => {
            let config = AppConfig::from_env()?;
            let camera: Arc<dyn Camera> = if screen {
                Arc::new(ScreenCamera::new(config.capture_dir.clone()))
            } else {
                Arc::new(FileCamera::new(image, config.capture_dir.clone()))
            };
            scan(&config, camera, copy).await
        }
        Command::Analyze { url, copy } => {
            let config = AppConfig::from_env()?;
            let client = VisionClient::new(&config)?;
            let result = client.analyze(&url).await?;
            println!("{}", result.transcription());
            if copy {
                SystemClipboard
                    .set_text(result.transcription())
                    .map_err(ScanError::from)?;
            }
            Ok(())
        }
        Command::SetKey { key, channel } => {
            let channel: ReleaseChannel = channel.as_deref().unwrap_or_default().parse()?;
            config::save_vision_api_key(channel, key.trim())?;
            println!("Saved Vision key for {}", channel.as_str());
            Ok(())
        }
        Command::Check => {
            let config = AppConfig::from_env()?;
            let client = VisionClient::new(&config)?;
            if client.check_connection().await? {
                println!("Vision key OK ({})", config.channel.as_str());
                Ok(())
            } else {
                Err(CliError::KeyRejected)
            }
        }
    }
}

async fn scan(config: &AppConfig, camera: Arc<dyn Camera>, copy: bool) -> Result<(), CliError> {
    let store = crate::storage::FirebaseStorage::new(config).map_err(ScanError::from)?;
    let ocr = VisionClient::new(config)?;
    let controller = CaptureController::new(
        camera,
        Arc::new(store),
        Arc::new(ocr),
        Arc::new(SystemClipboard),
        Arc::new(LogNotifier),
    );

    if controller.request_camera_access().await? == Permission::Denied {
        return Err(ScanError::PermissionDenied.into());
    }

    match controller.capture_photo().await? {
        CaptureReport::Cancelled => {
            println!("Capture cancelled");
            return Ok(());
        }
        CaptureReport::Uploaded(url) => eprintln!("Uploaded to {}", url),
    }

    let result = controller.submit_for_analysis().await?;
    println!("{}", result.transcription());

    if copy {
        controller.copy_result_to_clipboard()?;
    }
    Ok(())
}
