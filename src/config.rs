//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;

use crate::services::SETTINGS_FILE_NAME;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "drink-water")]
#[command(about = "Reminds you to drink water on a configurable interval")]
#[command(version)]
pub struct Config {
    /// Port to bind the control surface to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Settings file (defaults to reminder-settings.json beside the executable)
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Log popups instead of showing desktop notifications
    #[arg(long)]
    pub headless: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Resolve where the settings file lives
    pub fn settings_path(&self) -> PathBuf {
        if let Some(path) = &self.settings {
            return path.clone();
        }

        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(SETTINGS_FILE_NAME)))
            .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE_NAME))
    }
}
