//! What-Text: photograph a page, upload it, get the text back.
//!
//! Domains:
//!   - camera      camera capability, 4:3 edit step, file and screen cameras
//!   - storage     object store seam + Firebase Storage upload
//!   - vision      OCR seam + Cloud Vision `images:annotate`
//!   - clipboard   system clipboard
//!   - controller  capture → upload → analyze state machine
//!   - config      release channel + credentials
//!   - cli         command-line entry point

pub mod camera;
pub mod cli;
pub mod clipboard;
pub mod config;
pub mod controller;
pub mod storage;
pub mod vision;

use clap::Parser;
use std::process::ExitCode;

/// Entry point, called by the binary.
pub fn run() -> ExitCode {
    // Load .env.local → .env from the working directory.
    'env_load: for env_file in [".env.local", ".env"] {
        let path = std::path::Path::new(env_file);
        if path.exists() {
            match dotenvy::from_path(path) {
                Ok(_) => eprintln!("[STARTUP] Loaded {}", path.display()),
                Err(e) => eprintln!("[STARTUP] Failed to load {}: {}", path.display(), e),
            }
            break 'env_load;
        }
    }

    env_logger::init();

    let cli = cli::Cli::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(cli::execute(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
