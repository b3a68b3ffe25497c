use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every value has a default; malformed numbers fail at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// `OUTPUT_DIR`, if set. See [`Config::output_dir_for`] for the defaults.
    pub output_dir: Option<PathBuf>,
    /// Custom template; the embedded standard template is used when unset.
    pub template_path: Option<PathBuf>,
    /// Record rendered by `/generate-from-json` and served by `/sample-data`.
    pub sample_data_path: PathBuf,
    pub latex_engine: String,
    /// `None` disables the engine timeout.
    pub engine_timeout: Option<Duration>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let timeout_secs = std::env::var("ENGINE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".to_string())
            .parse::<u64>()
            .context("ENGINE_TIMEOUT_SECS must be a whole number of seconds")?;

        Ok(Config {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            output_dir: optional_env("OUTPUT_DIR").map(PathBuf::from),
            template_path: optional_env("TEMPLATE_PATH").map(PathBuf::from),
            sample_data_path: optional_env("SAMPLE_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("resume.json")),
            latex_engine: optional_env("LATEX_ENGINE").unwrap_or_else(|| "pdflatex".to_string()),
            engine_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// How the binary was started; decides where output goes by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Serve,
    Generate,
}

impl Config {
    /// Where generated `.tex`/`.pdf` files are published.
    ///
    /// `OUTPUT_DIR` wins. Otherwise the service uses a shared temp directory
    /// and the CLI writes next to the caller.
    pub fn output_dir_for(&self, mode: RunMode) -> PathBuf {
        match (&self.output_dir, mode) {
            (Some(dir), _) => dir.clone(),
            (None, RunMode::Serve) => std::env::temp_dir().join("resume_builder"),
            (None, RunMode::Generate) => PathBuf::from("."),
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
