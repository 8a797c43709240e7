use crate::data::RepoConfig;
use crate::integrations::github::GITHUB_API_URL;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Page URL whose query string supplies out-of-band settings (`_T`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_url: Option<String>,
    #[serde(default)]
    pub labels: LabelConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub repos: Vec<RepoConfig>,
}

fn default_api_url() -> String {
    GITHUB_API_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            page_url: None,
            labels: LabelConfig::default(),
            http: HttpConfig::default(),
            repos: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelConfig {
    /// Label used when a repository does not name one.
    #[serde(default = "default_label")]
    pub default: String,
    /// Label value that turns filtering off.
    #[serde(default = "default_all_label")]
    pub all: String,
}

fn default_label() -> String {
    "hack".to_string()
}

fn default_all_label() -> String {
    "*".to_string()
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            default: default_label(),
            all: default_all_label(),
        }
    }
}

impl LabelConfig {
    /// Label to filter a repository's issues by, or `None` for all issues.
    pub fn resolve(&self, label: Option<&str>) -> Option<String> {
        let label = label.filter(|l| !l.is_empty()).unwrap_or(self.default.as_str());
        (label != self.all).then(|| label.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

pub fn config_dir() -> Result<PathBuf> {
    let dir = directories::ProjectDirs::from("", "", "taskboard")
        .context("Could not determine config directory")?
        .config_dir()
        .to_path_buf();
    Ok(dir)
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn parse(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}

pub fn load(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !path.exists() {
        anyhow::bail!(
            "Config file not found at {}. Run `taskboard --init` to create one.",
            path.display()
        );
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    parse(&content).with_context(|| format!("Failed to parse config from {}", path.display()))
}

/// Write `config` to `path`, readable only by the owner on Unix.
pub fn save(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

pub async fn init_wizard() -> Result<()> {
    use std::io;

    println!("Taskboard Configuration Wizard");
    println!("==============================\n");

    let config_path = default_config_path()?;
    if config_path.exists() {
        print!("Config already exists at {}. Overwrite? [y/N] ", config_path.display());
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let config = prompt_config(&mut io::stdin().lock(), &mut io::stdout())?;
    save(&config, &config_path)?;

    println!("\nConfig saved to {}", config_path.display());
    println!("Run `taskboard` to see your tasks.");

    Ok(())
}

/// Ask for repositories and the default label. Lines that do not parse as
/// `owner/project[:label]` are rejected and asked again.
pub fn prompt_config<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> Result<Config> {
    writeln!(out, "Enter repositories to watch, one per line as owner/project[:label].")?;
    writeln!(out, "Leave the line empty to finish.\n")?;

    let mut repos = Vec::new();
    loop {
        write!(out, "Repository: ")?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        match parse_repo_spec(line) {
            Some(repo) => repos.push(repo),
            None => writeln!(out, "Expected owner/project[:label], got {:?}", line)?,
        }
    }

    write!(out, "Default label [hack]: ")?;
    out.flush()?;
    let mut label = String::new();
    input.read_line(&mut label)?;

    let mut labels = LabelConfig::default();
    if !label.trim().is_empty() {
        labels.default = label.trim().to_string();
    }

    Ok(Config {
        labels,
        repos,
        ..Config::default()
    })
}

/// Parse `owner/project[:label]`.
pub fn parse_repo_spec(spec: &str) -> Option<RepoConfig> {
    let (repo, label) = match spec.split_once(':') {
        Some((repo, label)) => (repo, Some(label.trim())),
        None => (spec, None),
    };
    let (owner, project) = repo.trim().split_once('/')?;
    if owner.is_empty() || project.is_empty() {
        return None;
    }

    let mut config = RepoConfig::new(owner.trim(), project.trim());
    config.label = label.filter(|l| !l.is_empty()).map(str::to_string);
    Some(config)
}
