use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use bazi::config::AppConfig;
use bazi::llm::{self, AnalysisKind, OpenAiProvider};
use bazi::pillar::BirthMoment;
use bazi::report::{self, RemoteAnalysis};
use bazi::scoring::Chart;
use bazi::storage::{self, FileSettingsStore, Settings, SettingsStore, API_KEY_ENV};

#[derive(Parser)]
#[command(name = "bazi")]
#[command(about = "BaZi CLI - four-pillar charts, elemental profiles and parenting reports", long_about = None)]
struct Cli {
    /// JSON config file (weights, thresholds, LLM endpoint)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Md,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the four pillars and elemental profile
    Chart {
        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Birth hour (0-23)
        #[arg(long)]
        hour: u32,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },

    /// Build the full report
    Report {
        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Birth hour (0-23)
        #[arg(long)]
        hour: u32,

        /// Output format
        #[arg(long, value_enum, default_value = "md")]
        format: OutputFormat,

        /// Seed for the monthly table option picks
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Generate the analysis (of this kind), summary and monthly guide remotely
        #[arg(long, value_enum)]
        ai: Option<AnalysisKind>,

        /// Name used in the generation prompts
        #[arg(long, default_value = "寶寶")]
        name: String,

        /// API key (overrides env and stored settings)
        #[arg(long)]
        api_key: Option<String>,

        /// Settings directory
        #[arg(long, default_value = ".bazi")]
        dir: String,
    },

    /// Print the analysis prompt without calling the remote service
    Prompt {
        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Birth hour (0-23)
        #[arg(long)]
        hour: u32,

        /// Analysis kind
        #[arg(long, value_enum, default_value = "general")]
        kind: AnalysisKind,
    },

    /// Request a structured personality reading
    Insight {
        /// Birth date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Birth hour (0-23)
        #[arg(long)]
        hour: u32,

        /// Name used in the prompt
        #[arg(long, default_value = "寶寶")]
        name: String,

        /// API key (overrides env and stored settings)
        #[arg(long)]
        api_key: Option<String>,

        /// Settings directory
        #[arg(long, default_value = ".bazi")]
        dir: String,
    },

    /// Manage stored API key and model
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Store an API key
    SetKey {
        key: String,

        #[arg(long, default_value = ".bazi")]
        dir: String,
    },

    /// Store a model name
    SetModel {
        model: String,

        #[arg(long, default_value = ".bazi")]
        dir: String,
    },

    /// Show stored settings with the key masked
    Show {
        #[arg(long, default_value = ".bazi")]
        dir: String,
    },

    /// Remove stored settings
    Clear {
        #[arg(long, default_value = ".bazi")]
        dir: String,
    },
}

fn parse_birth(date: &str, hour: u32) -> Result<BirthMoment> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", date))?;
    Ok(BirthMoment::new(date.year(), date.month(), date.day(), hour)?)
}

fn compute_chart(date: &str, hour: u32, config: &AppConfig) -> Result<Chart> {
    let birth = parse_birth(date, hour)?;
    tracing::info!(date = %birth.date, hour = birth.hour, "Computing chart");
    Ok(Chart::compute(birth, config)?)
}

/// Build a provider from the resolved key, with any stored model applied.
fn remote_provider(config: &AppConfig, explicit_key: Option<&str>, dir: &str) -> Result<OpenAiProvider> {
    let settings = FileSettingsStore::new(dir).load()?;
    let env_key = std::env::var(API_KEY_ENV).ok();
    let Some(key) = storage::resolve_api_key(explicit_key, env_key.as_deref(), &settings) else {
        bail!(
            "No API key: pass --api-key, set {} or run `bazi settings set-key`",
            API_KEY_ENV
        );
    };

    let mut llm_config = config.llm.clone();
    if let Some(model) = settings.model {
        llm_config.model = model;
    }
    Ok(OpenAiProvider::new(&key, llm_config)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn update_settings(dir: &str, apply: impl FnOnce(&mut Settings)) -> Result<()> {
    let store = FileSettingsStore::new(dir);
    let mut settings = store.load()?;
    apply(&mut settings);
    store.save(&settings)
}

fn store_api_key(dir: &str, key: &str) -> Result<()> {
    let key = key.trim();
    if !storage::is_valid_api_key(key) {
        bail!("Invalid API key: expected an sk- key longer than 20 characters");
    }
    update_settings(dir, |s| s.api_key = Some(key.to_string()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Chart { date, hour, format } => {
            let chart = compute_chart(&date, hour, &config)?;
            match format {
                OutputFormat::Json => print_json(&chart)?,
                OutputFormat::Md => print!("{}", report::render_chart_markdown(&chart)),
            }
        }
        Commands::Report {
            date,
            hour,
            format,
            seed,
            ai,
            name,
            api_key,
            dir,
        } => {
            let chart = compute_chart(&date, hour, &config)?;
            let provider = match ai {
                Some(_) => Some(remote_provider(&config, api_key.as_deref(), &dir)?),
                None => None,
            };
            let remote = provider.as_ref().zip(ai).map(|(p, kind)| RemoteAnalysis {
                provider: p,
                kind,
                name: &name,
            });

            tracing::info!(seed = seed, ai = ?ai, "Building report");
            let full = report::build_report(chart, seed, remote);
            match format {
                OutputFormat::Json => print_json(&full)?,
                OutputFormat::Md => print!("{}", report::render_markdown(&full)),
            }
        }
        Commands::Prompt { date, hour, kind } => {
            let chart = compute_chart(&date, hour, &config)?;
            println!("{}", llm::build_prompt(&chart, kind));
        }
        Commands::Insight {
            date,
            hour,
            name,
            api_key,
            dir,
        } => {
            let chart = compute_chart(&date, hour, &config)?;
            let provider = remote_provider(&config, api_key.as_deref(), &dir)?;
            let insight = llm::generate_personality_insight(&provider, &chart, &name)?;
            print_json(&insight)?;
        }
        Commands::Settings { action } => match action {
            SettingsAction::SetKey { key, dir } => {
                tracing::info!(dir = %dir, "Storing API key");
                store_api_key(&dir, &key)?;
                println!("API key saved");
            }
            SettingsAction::SetModel { model, dir } => {
                tracing::info!(dir = %dir, model = %model, "Storing model");
                update_settings(&dir, |s| s.model = Some(model))?;
                println!("Model saved");
            }
            SettingsAction::Show { dir } => {
                let settings = FileSettingsStore::new(&dir).load()?;
                println!(
                    "API key: {}",
                    settings.masked_api_key().unwrap_or_else(|| "(not set)".into())
                );
                println!(
                    "Model:   {}",
                    settings.model.as_deref().unwrap_or(&config.llm.model)
                );
            }
            SettingsAction::Clear { dir } => {
                tracing::info!(dir = %dir, "Clearing settings");
                FileSettingsStore::new(&dir).clear()?;
                println!("Settings cleared");
            }
        },
    }

    Ok(())
}
