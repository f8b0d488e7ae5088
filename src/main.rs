//! scriptgen - generate short video scripts and topic lists with hosted LLMs.
//!
//! Scripts come from OpenAI and topic lists from Gemini by default. Results
//! are printed and saved from the command line, or shown in a small web form.

mod config;
mod doctor;
mod format;
mod generator;
mod llm;
mod prompt;
mod request;
mod web;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use config::Config;
use generator::{ScriptGenerator, TopicGenerator};
use prompt::PromptRenderer;
use request::{Niche, ScriptLength, ScriptRequest, ScriptStyle, TopicRequest, TOPIC_COUNT_RANGE};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::Command as ProcessCommand;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const RULE: &str = "==================================================";

#[derive(Parser)]
#[command(name = "scriptgen")]
#[command(author, version, about = "AI video script generator")]
#[command(long_about = "Generate engaging video scripts from simple prompts.\n\nKeys are read from OPENAI_API_KEY and GEMINI_API_KEY (a .env file in the working directory is loaded automatically).")]
struct Cli {
    /// Your video idea or topic
    ///
    /// A prompt that matches a command name needs `--` in front of it:
    /// `scriptgen -- serve`.
    #[arg(value_name = "PROMPT")]
    prompt: Option<String>,

    /// Script length
    #[arg(long, value_enum, ignore_case = true)]
    length: Option<ScriptLength>,

    /// Script style
    #[arg(long, value_enum, ignore_case = true)]
    style: Option<ScriptStyle>,

    /// Output directory for generated files
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Use a config file other than ~/.config/scriptgen/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a list of video topics for a niche
    Topics {
        /// Niche, e.g. "AI Tools", "History" or any custom label
        #[arg(short, long)]
        niche: Option<String>,

        /// Number of topics to generate
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(*TOPIC_COUNT_RANGE.start() as i64..=*TOPIC_COUNT_RANGE.end() as i64))]
        count: Option<u32>,

        /// Also write the topics to this file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Run the web form
    Serve {
        /// Address to listen on (default from config: 127.0.0.1:8501)
        #[arg(long, value_name = "ADDR")]
        addr: Option<SocketAddr>,
    },
    /// Check the environment, API keys and provider connectivity
    Doctor {
        /// Only check configuration and keys, send no requests
        #[arg(long)]
        skip_network: bool,
    },
    /// Open configuration file in $EDITOR
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let default_level = match cli.command {
        Some(Commands::Serve { .. }) => "info",
        _ => "warn",
    };
    init_logging(default_level)?;

    match cli.command {
        Some(Commands::Config) => handle_config(cli.config.as_deref()),
        Some(Commands::Serve { addr }) => {
            let config = Config::load(cli.config.as_deref())?;
            handle_serve(config, addr).await
        }
        Some(Commands::Doctor { skip_network }) => {
            let config = Config::load(cli.config.as_deref())?;
            handle_doctor(config, skip_network).await
        }
        Some(Commands::Topics {
            niche,
            count,
            output,
        }) => {
            let config = Config::load(cli.config.as_deref())?;
            if let Err(e) = handle_topics(&config, niche, count, output).await {
                println!("Error: {:#}", e);
            }
            Ok(())
        }
        None => {
            let Some(prompt) = cli.prompt else {
                Cli::command().print_help()?;
                return Ok(());
            };
            let config = Config::load(cli.config.as_deref())?;
            let length = cli.length.unwrap_or(config.defaults.length);
            let style = cli.style.unwrap_or(config.defaults.style);
            let output_dir = cli
                .output_dir
                .unwrap_or_else(|| config.defaults.output_dir.clone());
            // Failures are reported on stdout; the exit status stays zero.
            if let Err(e) = handle_script(&config, prompt, length, style, &output_dir).await {
                println!("Error: {:#}", e);
            }
            Ok(())
        }
    }
}

/// Log to stderr. `RUST_LOG` adds to the defaults and wins for any target it
/// names.
fn init_logging(default_level: &str) -> Result<()> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    let mut filter = EnvFilter::from_default_env();
    for directive in default_directives(default_level, &env) {
        filter = filter.add_directive(directive.parse()?);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Default directives for targets `env` does not already set.
fn default_directives(default_level: &str, env: &str) -> Vec<String> {
    let named: Vec<&str> = env
        .split(',')
        .map(|d| d.trim().split('=').next().unwrap_or(""))
        .collect();
    [format!("scriptgen={}", default_level), "reqwest=warn".to_string()]
        .into_iter()
        .filter(|d| !named.contains(&d.split('=').next().unwrap_or("")))
        .collect()
}

/// Generate one script, print it and save it under `output_dir`.
async fn handle_script(
    config: &Config,
    prompt: String,
    length: ScriptLength,
    style: ScriptStyle,
    output_dir: &Path,
) -> Result<()> {
    let request = ScriptRequest::new(prompt, length, style)?;

    let backend = llm::create_backend(&config.script_backend)?;
    if let Err(e) = backend.ensure_credentials() {
        println!("Error: {}", e);
        println!("Please set your API key in the .env file");
        return Ok(());
    }

    std::fs::create_dir_all(output_dir).with_context(|| {
        format!("Failed to create output directory: {}", output_dir.display())
    })?;

    println!("Initializing AI Video Script Generator...");
    let generator = ScriptGenerator::new(Arc::new(backend), PromptRenderer::new()?);

    println!("Generating script for: {}", request.prompt);
    println!("   Length: {}", request.length);
    println!("   Style: {}", request.style);

    let script = generator.generate_script(&request).await?;

    let script_path = output_dir.join(format::output_filename(&request.prompt));
    std::fs::write(&script_path, &script)
        .with_context(|| format!("Failed to write script: {}", script_path.display()))?;
    info!(path = %script_path.display(), "script saved");

    println!("Script generated and saved to: {}", script_path.display());
    println!("\n{}", RULE);
    println!("GENERATED SCRIPT:");
    println!("{}", RULE);
    println!("{}", script);
    println!("{}", RULE);
    println!("Script generation complete!");

    Ok(())
}

/// Generate a topic list, print it and optionally save it.
async fn handle_topics(
    config: &Config,
    niche: Option<String>,
    count: Option<u32>,
    output: Option<PathBuf>,
) -> Result<()> {
    let niche = match niche {
        Some(label) => label.parse::<Niche>()?,
        None => Niche::default(),
    };
    let request = TopicRequest::new(niche, count.unwrap_or(config.defaults.topic_count))?;

    let backend = llm::create_backend(&config.topic_backend)?;
    if let Err(e) = backend.ensure_credentials() {
        println!("Error: {}", e);
        println!("Please set your API key in the .env file");
        return Ok(());
    }

    println!(
        "Generating {} topics for the \"{}\" niche...",
        request.count, request.niche
    );
    let generator = TopicGenerator::new(
        Arc::new(backend),
        PromptRenderer::new()?,
        config.defaults.structured_topics,
    );
    let topics = generator.generate_topics(&request).await?;
    let text = topics.join("\n");

    println!("\n{}", text);

    if let Some(path) = output {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        std::fs::write(&path, format!("{}\n", text))
            .with_context(|| format!("Failed to write topics: {}", path.display()))?;
        println!("\nTopics saved to: {}", path.display());
    }

    Ok(())
}

/// Run the web form until interrupted.
async fn handle_serve(config: Config, addr: Option<SocketAddr>) -> Result<()> {
    let addr = addr.unwrap_or(config.server.addr);
    let script_backend = llm::create_backend(&config.script_backend)?;
    let topic_backend = llm::create_backend(&config.topic_backend)?;
    info!(
        "Scripts: {} ({}), topics: {} ({})",
        script_backend.name(),
        script_backend.model(),
        topic_backend.name(),
        topic_backend.model()
    );

    let prompts = PromptRenderer::new()?;
    let state = web::AppState::new(
        ScriptGenerator::new(Arc::new(script_backend), prompts.clone()),
        TopicGenerator::new(
            Arc::new(topic_backend),
            prompts,
            config.defaults.structured_topics,
        ),
        config.defaults.clone(),
    )?;
    web::server::run(addr, state).await
}

/// Run diagnostics and exit non-zero if any check failed.
async fn handle_doctor(config: Config, skip_network: bool) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let report = doctor::run(&config, &cwd, skip_network).await;
    report.print();
    if !report.passed() {
        std::process::exit(1);
    }
    Ok(())
}

/// Handle the config command.
fn handle_config(path: Option<&Path>) -> Result<()> {
    let config_path = Config::resolve_path(path)?;

    // Create default config if it doesn't exist
    if !config_path.exists() {
        Config::default().save(&config_path)?;
        println!("Created default config at {}", config_path.display());
    }

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let status = ProcessCommand::new(&editor)
        .arg(&config_path)
        .status()
        .context("Failed to open editor")?;

    if !status.success() {
        eprintln!("Editor exited with non-zero status");
    }

    Ok(())
}
