use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use question_pills::answer::{AnswerService, HttpAnswerClient};
use question_pills::config::Config;
use question_pills::disclosure::PresentationMode;
use question_pills::page::{AskPage, ChatInput};
use question_pills::template::library;
use question_pills::widget::TemplateWidget;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), env!("QP_VERSION_SUFFIX"));

#[derive(Parser)]
#[command(name = "qp")]
#[command(author, version = VERSION, about = "Ask templated questions by picking entity values", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the configured question templates
    Templates,

    /// Build a question from a template, optionally sending it
    Ask {
        /// Template number, as listed by `qp templates`
        #[arg(short, long, default_value = "1")]
        template: usize,

        /// Pick a value for a slot (repeatable)
        #[arg(short, long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, String)>,

        /// Send the question to the answer service
        #[arg(long)]
        submit: bool,
    },

    /// Check the config file and its templates
    Validate,

    /// Interactive ask page (TUI)
    Tui {
        /// Pill style (inline hover pills or popup click pills)
        #[arg(short, long)]
        mode: Option<PresentationMode>,
    },

    /// Write a config file with the built-in templates
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let filter = if cli.verbose {
        "question_pills=debug,qp=debug"
    } else {
        "question_pills=info,qp=info"
    };

    let file_layer = match &cli.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };
    // The TUI owns the terminal, so it only logs when given a file.
    let stderr_layer = match (&cli.command, &cli.log_file) {
        (Commands::Tui { .. }, _) | (_, Some(_)) => None,
        _ => Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(file_layer)
        .with(stderr_layer)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Templates => {
            let config = Config::load_or_default(config_path)?;
            list_templates(&config)?;
        }
        Commands::Ask {
            template,
            set,
            submit,
        } => {
            let config = Config::load_or_default(config_path)?;
            let question = build_question(&config, template, &set)?;
            println!("{}", question);
            if submit {
                submit_question(&config, &question).await?;
            }
        }
        Commands::Validate => {
            let config = Config::load_or_default(config_path)?;
            let templates = config.templates()?;
            let source = if config.templates.is_empty() {
                "built-in"
            } else {
                "configured"
            };
            println!("{} {} templates OK", templates.len(), source);
        }
        Commands::Tui { mode } => {
            let config = Config::load_or_default(config_path)?;
            let mode = mode.unwrap_or(config.widget.presentation);
            let page = AskPage::new(config.templates()?, mode, config.widget.hover_grace());
            let service: Arc<dyn AnswerService> = Arc::new(HttpAnswerClient::new(
                config.service.base_url.clone(),
                config.service.timeout(),
            )?);
            tracing::info!(?mode, base_url = %config.service.base_url, "starting ask page");
            question_pills::tui::run(page, service).await?;
        }
        Commands::Init { force } => {
            let path = match config_path {
                Some(path) => path.to_path_buf(),
                None => Config::config_path()?,
            };
            write_default_config(&path, force)?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

fn list_templates(config: &Config) -> Result<()> {
    for (idx, template) in config.templates()?.into_iter().enumerate() {
        let template = Arc::new(template);
        let input = ChatInput::default();
        let widget = TemplateWidget::mount(
            template.clone(),
            config.widget.presentation.policy(config.widget.hover_grace()),
            input.subscriber(),
        );
        println!("{}. {}", idx + 1, template.label());
        println!("   {}", input.get());
        for slot in template.slots() {
            println!("   {}: {}", slot.key(), slot.options().join(" | "));
        }
        widget.unmount();
    }
    Ok(())
}

/// Mount the template and apply each assignment as a user choice
fn build_question(config: &Config, number: usize, set: &[(String, String)]) -> Result<String> {
    let templates = config.templates()?;
    let Some(template) = number
        .checked_sub(1)
        .and_then(|idx| templates.get(idx).cloned())
    else {
        bail!(
            "no template #{} (there are {}; see `qp templates`)",
            number,
            templates.len()
        );
    };

    let input = ChatInput::default();
    let mut widget = TemplateWidget::mount(
        Arc::new(template),
        config.widget.presentation.policy(config.widget.hover_grace()),
        input.subscriber(),
    );
    for (key, value) in set {
        widget
            .choose(key, value)
            .with_context(|| format!("setting {}={}", key, value))?;
    }
    widget.unmount();
    Ok(input.get())
}

async fn submit_question(config: &Config, question: &str) -> Result<()> {
    let client = HttpAnswerClient::new(config.service.base_url.clone(), config.service.timeout())?;
    let answer = client.submit(question).await?;
    println!();
    println!("{}", answer.text);
    if !answer.charts.is_empty() {
        println!();
        println!("[{} chart(s) attached]", answer.charts.len());
    }
    Ok(())
}

fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let config = Config {
        templates: library::builtin_defs(),
        ..Config::default()
    };
    config.save_to(path)
}
