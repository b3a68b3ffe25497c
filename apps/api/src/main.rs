mod config;
mod errors;
mod generation;
mod models;
mod render;
mod routes;
mod state;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, RunMode};
use crate::models::resume::ResumeRecord;
use crate::render::{generate, PdfLatex, Template, TypesetEngine};
use crate::routes::build_router;
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "resume-api")]
#[command(about = "Turn JSON resume data into a typeset PDF")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP service
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Render one resume file to PDF and exit
    Generate {
        /// Resume data file
        #[arg(default_value = "resume.json")]
        file: PathBuf,
        /// LaTeX template (defaults to TEMPLATE_PATH, then the built-in template)
        #[arg(short, long)]
        template: Option<PathBuf>,
        /// Directory for resume.tex and resume.pdf (defaults to OUTPUT_DIR, then ".")
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve { port } => {
            let config = Config {
                port: port.unwrap_or(config.port),
                ..config
            };
            serve(config).await
        }
        Commands::Generate {
            file,
            template,
            output_dir,
        } => {
            let config = Config {
                template_path: template.or(config.template_path),
                output_dir: output_dir.or(config.output_dir),
                ..config
            };
            if let Err(e) = generate_once(&config, &file).await {
                error!("{e:#}");
                eprintln!("Failed to generate resume: {e:#}");
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting resume API v{}", env!("CARGO_PKG_VERSION"));

    let template = Arc::new(load_template(config.template_path.as_deref()).await?);
    let engine: Arc<dyn TypesetEngine> = Arc::new(build_engine(&config));
    info!(
        "Typesetting engine: {} (timeout: {:?})",
        engine.name(),
        config.engine_timeout
    );

    let output_dir = config.output_dir_for(RunMode::Serve);
    tokio::fs::create_dir_all(&output_dir)
        .await
        .with_context(|| format!("Could not create {}", output_dir.display()))?;
    info!("Output directory: {}", output_dir.display());

    let state = AppState {
        config: config.clone(),
        output_dir,
        template,
        engine,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn generate_once(config: &Config, file: &Path) -> Result<()> {
    info!("Using JSON file: {}", file.display());
    let data = tokio::fs::read(file)
        .await
        .with_context(|| format!("File {} not found", file.display()))?;
    let record = ResumeRecord::from_json_slice(&data)?;
    let template = load_template(config.template_path.as_deref()).await?;
    let engine = build_engine(config);

    let generated = generate(
        &record,
        &template,
        &engine,
        &config.output_dir_for(RunMode::Generate),
        render::engine::JOB_NAME,
    )
    .await?;

    info!("Generated LaTeX file: {}", generated.tex_path.display());
    println!(
        "Success! Your resume has been generated at: {}",
        generated.pdf_path.display()
    );
    Ok(())
}

fn build_engine(config: &Config) -> PdfLatex {
    PdfLatex::new(config.latex_engine.clone(), config.engine_timeout)
}

async fn load_template(path: Option<&Path>) -> Result<Template> {
    match path {
        Some(path) => {
            let source = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Could not read template {}", path.display()))?;
            info!("Loaded template from {}", path.display());
            Ok(Template::parse(source)?)
        }
        None => Ok(Template::standard()?),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_without_environment() {
        let cli = Cli::try_parse_from(["resume-api", "serve", "--port", "9000"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { port: Some(9000) }));

        let cli = Cli::try_parse_from(["resume-api", "generate", "me.json", "-o", "out"]).unwrap();
        match cli.command {
            Commands::Generate { file, output_dir, template } => {
                assert_eq!(file, PathBuf::from("me.json"));
                assert_eq!(output_dir, Some(PathBuf::from("out")));
                assert_eq!(template, None);
            }
            Commands::Serve { .. } => panic!("expected generate"),
        }
    }

    #[test]
    fn test_help_is_a_clap_exit_not_a_config_error() {
        let err = Cli::try_parse_from(["resume-api", "--help"]).err().unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
