//! Photo Browser demo
//!
//! Opens the browser over the images given on the command line, drives a
//! scripted session through it and prints the callbacks it produced.

mod app;

use anyhow::Result;
use browser_core::{is_supported_image, BrowserConfig};
use std::path::PathBuf;

fn main() -> Result<()> {
    // Initialize logging and panic hook first
    let _log_guard = browser_log::init()?;

    // Clean up old logs (7 days)
    if let Err(e) = browser_log::cleanup_old_logs(7) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    tracing::info!("Photo browser demo starting...");

    let config = BrowserConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load configuration: {}. Using defaults.", e);
        BrowserConfig::default()
    });

    let paths = collect_images(std::env::args().skip(1))?;
    if paths.is_empty() {
        anyhow::bail!("usage: photo_browser_demo <image files or directories>...");
    }
    tracing::info!("{} images to browse", paths.len());

    let summary = app::run(paths, config)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Expand directories one level and keep supported image files
fn collect_images(args: impl Iterator<Item = String>) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for arg in args {
        let path = PathBuf::from(arg);
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(&path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && is_supported_image(p))
                .collect();
            entries.sort();
            images.extend(entries);
        } else if is_supported_image(&path) {
            images.push(path);
        } else {
            tracing::warn!("Skipping unsupported file: {:?}", path);
        }
    }
    Ok(images)
}
