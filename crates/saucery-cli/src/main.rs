//! saucery CLI - report story results to Sauce Labs
//!
//! Usage:
//!   saucery submit --session <id> --name <story>   Update one job's status
//!   saucery replay <log>                           Report a recorded lifecycle log
//!   saucery config show                            Print the effective configuration
//!   saucery config init [path]                     Write a default configuration file

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use saucery_core::config::DEFAULT_CONFIG_FILE;
use saucery_core::{JobUpdate, SauceConfig, SessionId};
use saucery_reporter::{
    parse_events, replay, HttpTransport, ResultSubmitter, SauceStoryReporter, SharedSession,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "saucery")]
#[command(author, version, about = "Report behavioral test stories to Sauce Labs")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (environment variables override it)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Update the status of one Sauce Labs job
    Submit {
        /// Browser session (job) id
        #[arg(long)]
        session: String,

        /// Story name the job is reported under
        #[arg(long)]
        name: String,

        /// Mark the job as failed
        #[arg(long)]
        failed: bool,

        /// Tag to attach (repeatable, replaces configured tags)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Build identifier (overrides configuration)
        #[arg(long)]
        build: Option<String>,
    },

    /// Report every story in a JSON-lines lifecycle log
    Replay {
        /// Lifecycle log file
        file: PathBuf,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration (access key masked)
    Show,

    /// Write a default configuration file
    Init {
        /// Target path (defaults to the --config path)
        path: Option<PathBuf>,
    },
}

fn load_config(path: &Path) -> Result<SauceConfig> {
    let config = SauceConfig::load_or_default(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    Ok(config.with_env_overrides())
}

async fn cmd_submit(
    mut config: SauceConfig,
    session: String,
    name: String,
    failed: bool,
    tags: Vec<String>,
    build: Option<String>,
) -> Result<()> {
    if !tags.is_empty() {
        config.tags = tags;
    }
    if build.is_some() {
        config.build_id = build;
    }
    config.validate()?;

    let transport = HttpTransport::from_config(&config)?;
    let submitter = ResultSubmitter::new(config, transport);
    let session = SessionId::from(session);

    let update = submitter
        .try_submit(&name, &session, !failed)
        .await
        .context("Updating Sauce Labs job info failed")?;

    if !update.is_accepted() {
        bail!("Sauce Labs rejected the update for job {} (HTTP {})", session, update.status);
    }

    if update.job_urls.is_empty() {
        println!("Updated job {} for '{}'", session, name);
    }
    Ok(())
}

async fn cmd_replay(config: SauceConfig, file: &Path) -> Result<()> {
    config.validate()?;

    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read lifecycle log {}", file.display()))?;
    let events = parse_events(&content)?;

    let sessions = Arc::new(SharedSession::new());
    let transport = HttpTransport::from_config(&config)?;
    let reporter = SauceStoryReporter::new(config, sessions.clone(), transport);

    let updates = replay(&reporter, &sessions, &events).await;

    // job URLs were already announced while submitting
    println!("Reported {} stories:", updates.len());
    for update in &updates {
        println!("  {}", replay_summary_line(update));
    }
    Ok(())
}

fn replay_summary_line(update: &JobUpdate) -> String {
    let status = if update.passed { "passed" } else { "failed" };
    format!(
        "{} [{}] job {} (HTTP {})",
        update.story, status, update.session_id, update.status
    )
}

fn cmd_config(action: ConfigCommands, config_path: &Path) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            let config = load_config(config_path)?;
            let rendered = toml::to_string_pretty(&config.redacted())
                .context("Failed to render configuration")?;
            println!("# {}", config_path.display());
            print!("{}", rendered);
        }
        ConfigCommands::Init { path } => {
            let target = path.unwrap_or_else(|| config_path.to_path_buf());
            if target.exists() {
                bail!("{} already exists", target.display());
            }
            SauceConfig::write_default(&target)?;
            println!("Wrote default configuration to {}", target.display());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Submit {
            session,
            name,
            failed,
            tags,
            build,
        } => {
            let config = load_config(&cli.config)?;
            info!("Submitting job status for story '{}'", name);
            cmd_submit(config, session, name, failed, tags, build).await?;
        }
        Commands::Replay { file } => {
            let config = load_config(&cli.config)?;
            cmd_replay(config, &file).await?;
        }
        Commands::Config { action } => cmd_config(action, &cli.config)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_submit() {
        let cli = Cli::parse_from([
            "saucery", "submit", "--session", "abc", "--name", "Login", "--failed", "--tag", "a",
            "--tag", "b",
        ]);
        match cli.command {
            Commands::Submit {
                session,
                name,
                failed,
                tags,
                build,
            } => {
                assert_eq!(session, "abc");
                assert_eq!(name, "Login");
                assert!(failed);
                assert_eq!(tags, vec!["a".to_string(), "b".to_string()]);
                assert!(build.is_none());
            }
            _ => panic!("expected submit"),
        }
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn test_replay_summary_omits_job_urls() {
        let update = JobUpdate {
            story: "Login".to_string(),
            session_id: SessionId::from("abc"),
            passed: false,
            status: 200,
            job_urls: vec!["http://x.com/jobs/abc".to_string()],
        };

        let line = replay_summary_line(&update);
        assert_eq!(line, "Login [failed] job abc (HTTP 200)");
        assert!(!line.contains("http://x.com/jobs/abc"));
    }

    #[tokio::test]
    async fn test_submit_requires_credentials() {
        let result = cmd_submit(
            SauceConfig::default(),
            "abc".to_string(),
            "Login".to_string(),
            false,
            Vec::new(),
            None,
        )
        .await;
        assert!(result.is_err());
    }
}
