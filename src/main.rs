use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use taskboard::aggregator::Aggregator;
use taskboard::alerts::{self, Reporter};
use taskboard::config::{self, Config};
use taskboard::data::RepoConfig;
use taskboard::integrations::github::FetchSettings;
use taskboard::integrations::HttpTransport;
use taskboard::query_params::{QueryParams, ACCESS_TOKEN_PARAM};
use taskboard::{output, tui};

#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(about = "Aggregate labeled GitHub issues from several repositories")]
#[command(version)]
struct Args {
    /// Initialize configuration
    #[arg(long)]
    init: bool,

    /// Path to config file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Page URL whose query parameters configure the run (e.g. `?_T=<token>`)
    #[arg(long)]
    url: Option<String>,

    /// GitHub access token, same as `_T` in the page URL
    #[arg(long, env = "TASKBOARD_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Repository to fetch as owner/project[:label]; replaces the configured list
    #[arg(long = "repo", short, value_parser = parse_repo)]
    repos: Vec<RepoConfig>,

    /// Print tasks as text instead of starting the TUI
    #[arg(long)]
    plain: bool,

    /// Print projects and alerts as JSON
    #[arg(long, conflicts_with = "plain")]
    json: bool,
}

fn parse_repo(s: &str) -> std::result::Result<RepoConfig, String> {
    config::parse_repo_spec(s).ok_or_else(|| format!("expected owner/project[:label], got {:?}", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let interactive = !args.plain && !args.json && io::stdout().is_terminal();

    init_logging(interactive)?;

    if args.init {
        config::init_wizard().await?;
        return Ok(());
    }

    let config = load_config(&args)?;
    let repos = if args.repos.is_empty() {
        config.repos.clone()
    } else {
        args.repos.clone()
    };
    if repos.is_empty() {
        anyhow::bail!("No repositories configured. Add [[repos]] to the config or pass --repo.");
    }

    let mut params = QueryParams::parse(
        args.url
            .as_deref()
            .or(config.page_url.as_deref())
            .unwrap_or_default(),
    );
    if let Some(token) = &args.token {
        params.insert(ACCESS_TOKEN_PARAM, token.clone());
    }

    // Alerts go to the console until a view is bound.
    let reporter = Arc::new(Reporter::console());

    let transport = match HttpTransport::new(&config.http) {
        Ok(t) => Arc::new(t),
        Err(e) => {
            alerts::fail(reporter.as_ref(), &e);
            return Err(e.into());
        }
    };

    let settings = FetchSettings {
        api_url: config.api_url.clone(),
        labels: config.labels.clone(),
        params,
    };
    let aggregator = Aggregator::new(transport, settings, reporter);

    if interactive {
        return tui::run(aggregator, repos).await;
    }

    let (view, summary) = aggregator.run(&repos).await?;
    let snapshot = view.snapshot();
    let mut stdout = io::stdout().lock();
    if args.json {
        output::write_json(&mut stdout, &snapshot)?;
    } else {
        output::write_plain(&mut stdout, &snapshot)?;
    }

    if summary.succeeded == 0 {
        anyhow::bail!("All {} repositories failed to load", summary.failed);
    }
    Ok(())
}

/// Load the config file; repositories given on the command line make it optional.
fn load_config(args: &Args) -> Result<Config> {
    if args.config.is_none() && !args.repos.is_empty() {
        let path = config::default_config_path()?;
        if !path.exists() {
            return Ok(Config::default());
        }
    }
    config::load(args.config.as_deref())
}

/// The log file takes per-repository progress; stderr only warnings, so
/// it stays readable next to `--plain` output.
fn log_directive(interactive: bool) -> &'static str {
    if interactive {
        "taskboard=info"
    } else {
        "taskboard=warn"
    }
}

fn init_logging(interactive: bool) -> Result<()> {
    use tracing_subscriber::EnvFilter;

    if interactive {
        // Logging to the terminal would tear up the TUI.
        let dir = config::config_dir()?;
        std::fs::create_dir_all(&dir)?;
        let path = dir.join("taskboard.log");
        let file = std::fs::File::create(&path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;

        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive(log_directive(interactive).parse()?))
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive(log_directive(interactive).parse()?))
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}
