use std::io::{IsTerminal, Write};
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use threadgate_core::{OutputFormat, ThreadgateConfig};
use threadgate_review::analyzer::Analyzer;
use threadgate_review::context::{parse_pr_reference, PullRequestRef};
use threadgate_review::github::{resolve_token, GitHubClient};
use threadgate_review::report::{Report, BLOCK_MESSAGE};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "threadgate",
    version,
    about = "Block pull requests with unaddressed high-severity review findings",
    long_about = "threadgate inspects the review threads of a pull request, keeps the ones\n\
                   started by the automated reviewer with a [severity:high] tag, and fails\n\
                   when any of them is still open on unchanged code or was resolved without\n\
                   the code changing.\n\n\
                   Examples:\n  \
                     threadgate check                      Check the PR of the current GitHub Actions run\n  \
                     threadgate check --pr owner/repo#12   Check a specific pull request\n  \
                     threadgate init                       Create a .threadgate.toml"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .threadgate.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for the report.\n\n\
                       Formats:\n  \
                         text      Status lines (default)\n  \
                         json      Machine-readable JSON with camelCase keys\n  \
                         markdown  GitHub-flavored Markdown"
    )]
    format: OutputFormat,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Check a pull request's review threads
    #[command(long_about = "Check a pull request's review threads.\n\n\
        Without --pr, the pull request is read from GITHUB_REPOSITORY and the event\n\
        payload at GITHUB_EVENT_PATH. When there is no pull request or no token the\n\
        check is skipped and exits successfully.\n\n\
        Exits with code 1 when the pull request should be blocked.")]
    Check {
        /// Pull request to check (format: owner/repo#123)
        #[arg(
            long,
            long_help = "Pull request to check.\n\nFormat: owner/repo#123\nRequires GITHUB_TOKEN or GH_TOKEN env var."
        )]
        pr: Option<String>,
        /// GitHub token (default: GITHUB_TOKEN, then GH_TOKEN)
        #[arg(long)]
        github_token: Option<String>,
        /// Override the reviewer marker text from the config
        #[arg(long)]
        marker: Option<String>,
        /// Report but always exit successfully
        #[arg(long)]
        no_fail: bool,
    },
    /// Create a default .threadgate.toml configuration file
    #[command(long_about = "Create a default .threadgate.toml configuration file.\n\n\
        Fails if .threadgate.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

const DEFAULT_CONFIG: &str = r#"# threadgate configuration

[reviewer]
# Text the automated reviewer puts in every comment it posts
# marker = "This is an auto-generated comment by OSS CodeRabbit"
# Name used in report output
# name = "CodeRabbit"

[github]
# api_url = "https://api.github.com"
# page_size = 100
"#;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<ThreadgateConfig> {
    let config = match path {
        Some(path) => ThreadgateConfig::from_file(path)?,
        None => {
            let default_path = std::path::Path::new(".threadgate.toml");
            if default_path.exists() {
                ThreadgateConfig::from_file(default_path)?
            } else {
                ThreadgateConfig::default()
            }
        }
    };
    Ok(config)
}

fn in_github_actions() -> bool {
    std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true")
}

fn append_step_summary(markdown: &str) {
    let Ok(path) = std::env::var("GITHUB_STEP_SUMMARY") else {
        return;
    };
    let result = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .and_then(|mut f| f.write_all(markdown.as_bytes()));
    if let Err(e) = result {
        tracing::warn!("failed to write job summary to {path}: {e}");
    }
}

/// Returns whether the pull request should be blocked.
async fn run_check(
    config: &ThreadgateConfig,
    format: OutputFormat,
    pr: Option<&str>,
    github_token: Option<&str>,
    marker: Option<&str>,
) -> Result<bool> {
    let pr = match pr {
        Some(pr_ref) => parse_pr_reference(pr_ref)?,
        None => match PullRequestRef::from_actions_env()? {
            Some(pr) => pr,
            None => {
                tracing::info!("not running for a pull request; nothing to check");
                return Ok(false);
            }
        },
    };

    let Some(token) = resolve_token(github_token) else {
        tracing::warn!("no GitHub token available; skipping check of {pr}");
        return Ok(false);
    };

    let client = GitHubClient::new(Some(token.as_str()), &config.github)?;
    let marker = marker.unwrap_or(config.reviewer.marker.as_str());
    if marker.trim().is_empty() {
        miette::bail!("--marker must not be empty");
    }
    let analyzer = Analyzer::new(client, marker);

    let spinner = if std::io::stderr().is_terminal() {
        let pb = indicatif::ProgressBar::new_spinner();
        pb.set_style(
            indicatif::ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
                .into_diagnostic()?,
        );
        pb.set_message(format!("Fetching review threads for {pr}..."));
        pb.enable_steady_tick(std::time::Duration::from_millis(120));
        Some(pb)
    } else {
        None
    };

    let analysis = analyzer
        .analyze_detailed(&pr.owner, &pr.repo, pr.number)
        .await
        .inspect_err(|_e| {
            if let Some(pb) = &spinner {
                pb.finish_with_message("Failed");
            }
        })?;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let report = Report::new(pr.to_string(), &analysis);
    print!(
        "{}",
        report
            .render(format, &config.reviewer.name)
            .into_diagnostic()?
    );
    if format == OutputFormat::Json {
        println!();
    }

    if in_github_actions() {
        if let Ok(markdown) = report.render(OutputFormat::Markdown, &config.reviewer.name) {
            append_step_summary(&markdown);
        }
    }

    Ok(analysis.should_block)
}

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        None => {
            Cli::command().print_help().into_diagnostic()?;
        }
        Some(Command::Check {
            ref pr,
            ref github_token,
            ref marker,
            no_fail,
        }) => {
            let config = load_config(cli.config.as_ref())?;
            tracing::debug!(marker = %config.reviewer.marker, api = %config.github.api_url, "loaded configuration");

            let should_block = run_check(
                &config,
                cli.format,
                pr.as_deref(),
                github_token.as_deref(),
                marker.as_deref(),
            )
            .await?;

            if should_block {
                // JSON output must stay a single parseable document.
                if in_github_actions() && cli.format != OutputFormat::Json {
                    println!("::error::{BLOCK_MESSAGE}");
                }
                if !no_fail {
                    std::process::exit(1);
                }
            }
        }
        Some(Command::Init) => {
            let path = std::path::Path::new(".threadgate.toml");
            if path.exists() {
                miette::bail!(".threadgate.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .threadgate.toml with default configuration");
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "threadgate", &mut std::io::stdout());
        }
    }

    Ok(())
}
