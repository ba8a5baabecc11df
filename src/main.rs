// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use newscast::app_config::{self, Config, ScriptProvider};
use newscast::app_controller::Controller;

/// CLI Wrapper for ScriptProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliScriptProvider {
    Groq,
    OpenAI,
    Anthropic,
    Ollama,
    LMStudio,
}

impl From<CliScriptProvider> for ScriptProvider {
    fn from(cli_provider: CliScriptProvider) -> Self {
        match cli_provider {
            CliScriptProvider::Groq => ScriptProvider::Groq,
            CliScriptProvider::OpenAI => ScriptProvider::OpenAI,
            CliScriptProvider::Anthropic => ScriptProvider::Anthropic,
            CliScriptProvider::Ollama => ScriptProvider::Ollama,
            CliScriptProvider::LMStudio => ScriptProvider::LMStudio,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate today's podcast episode (default command)
    Generate(GenerateArgs),

    /// Generate shell completions for newscast
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct GenerateArgs {
    /// News document to read articles from and merge the episode into
    #[arg(short, long, value_name = "PATH", default_value = "data/news.json")]
    news: PathBuf,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Script provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliScriptProvider>,

    /// Model name to use for the script
    #[arg(short, long)]
    model: Option<String>,

    /// Root data directory (episodes go to <DIR>/podcast)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Skip mixing and publish the first clip only
    #[arg(long)]
    no_mix: bool,

    /// Print the script and its segment count without synthesising audio
    #[arg(long)]
    dry_run_script: bool,
}

/// Newscast - two-host AI news podcast generator
///
/// Turns the ranked articles of a news document into a short conversation
/// between two hosts, voices it and publishes the episode.
#[derive(Parser, Debug)]
#[command(name = "newscast")]
#[command(version)]
#[command(about = "Two-host AI news podcast generator")]
#[command(long_about = "Newscast writes a two-host script about today's top news, synthesises every line \
with the configured voices and publishes data/podcast/latest.wav plus a dated archive copy.

EXAMPLES:
    newscast                                  # Use data/news.json and conf.json
    newscast --news /srv/news.json            # Use another news document
    newscast -p ollama -m llama3.2            # Use a local script model
    newscast --no-mix                         # Publish the first clip only
    newscast --dry-run-script                 # Only show the generated script
    newscast completions bash > newscast.bash # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    generate: GenerateArgs,
}

// @struct: Custom logger implementation
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI colour for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, colour) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                colour, now, emoji, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config or the command line says otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "newscast", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Generate(args)) => run_generate(args).await,
        None => run_generate(cli.generate).await,
    }
}

/// Load the configuration and apply command line overrides
fn load_config(options: &GenerateArgs) -> Result<Config> {
    if let Some(level) = &options.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config_path)?;

    if let Some(provider) = &options.provider {
        config.script.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        let provider_str = config.script.provider.to_lowercase_string();
        match config.script.available_providers.iter_mut().find(|p| p.provider_type == provider_str) {
            Some(provider_config) => provider_config.model = model.clone(),
            None => {
                let mut provider_config = app_config::ProviderConfig::new(config.script.provider.clone());
                provider_config.model = model.clone();
                config.script.available_providers.push(provider_config);
            }
        }
    }

    if let Some(data_dir) = &options.data_dir {
        config.podcast.data_dir = data_dir.clone();
    }

    if options.no_mix {
        config.podcast.mixing = false;
    }

    if let Some(level) = &options.log_level {
        config.log_level = level.clone().into();
    } else {
        log::set_max_level(config.log_level.to_level_filter());
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

async fn run_generate(options: GenerateArgs) -> Result<()> {
    let config = load_config(&options)?;
    let controller = Controller::with_config(config)?;

    if options.dry_run_script {
        let (outcome, segments) = controller.dry_run_script(&options.news).await?;
        if outcome.is_fallback() {
            warn!("Script author unavailable, showing the fallback script");
        }
        println!("{}", outcome.script());
        info!("Script parses into {} dialogue segments", segments);
        return Ok(());
    }

    controller.run(&options.news).await?;
    Ok(())
}
