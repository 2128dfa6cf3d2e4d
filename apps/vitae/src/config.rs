use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Deserialize;

use crate::models::view::{Audience, Length};
use crate::render::OutputFormat;
use crate::theme::ThemeName;

const DEFAULT_MASTER: &str = "data/master.json";
const DEFAULT_ROLES: &str = "data/roles.json";
const DEFAULT_OUT: &str = "output";
const DEFAULT_CONCURRENCY: usize = 4;

/// Flags shared by every subcommand. Each one overrides the matching key in
/// the `--config` file.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Master content store (JSON)
    #[arg(long, global = true)]
    pub master: Option<PathBuf>,

    /// Role configuration (JSON)
    #[arg(long, global = true)]
    pub roles: Option<PathBuf>,

    /// Directory of extra color-scheme files (*.json)
    #[arg(long, global = true)]
    pub schemes_dir: Option<PathBuf>,

    /// Optional TOML file with defaults for all of these flags
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Treat validation warnings as failures
    #[arg(long, global = true)]
    pub strict: bool,

    /// Maximum emissions rendered at once
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// File name prefix; defaults to the contact name
    #[arg(long, global = true)]
    pub base_name: Option<String>,

    /// Log level for vitae when RUST_LOG is unset
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

/// Optional TOML file. Every key is optional; flags win over it.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    master: Option<PathBuf>,
    roles: Option<PathBuf>,
    schemes_dir: Option<PathBuf>,
    out: Option<PathBuf>,
    base_name: Option<String>,
    concurrency: Option<usize>,
    strict: Option<bool>,
    allow_fallback: Option<bool>,
    log_level: Option<String>,
    /// RFC 3339, quoted. Written into document metadata when set.
    creation_date: Option<String>,
    #[serde(default)]
    themes: FileThemes,
    #[serde(default)]
    emit: FileEmit,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileThemes {
    ats: Option<String>,
    human: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileEmit {
    #[serde(default)]
    roles: Vec<String>,
    #[serde(default)]
    schemes: Vec<String>,
    #[serde(default)]
    formats: Vec<String>,
    #[serde(default)]
    lengths: Vec<String>,
    #[serde(default)]
    audiences: Vec<String>,
}

/// Theme applied to each audience.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudienceThemes {
    pub ats: ThemeName,
    pub human: ThemeName,
}

impl Default for AudienceThemes {
    fn default() -> Self {
        Self {
            ats: ThemeName::Ats,
            human: ThemeName::Classic,
        }
    }
}

impl AudienceThemes {
    pub fn for_audience(&self, audience: Audience) -> ThemeName {
        match audience {
            Audience::Ats => self.ats,
            Audience::Human => self.human,
        }
    }
}

/// Run configuration, resolved once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub master_path: PathBuf,
    pub roles_path: PathBuf,
    pub schemes_dir: Option<PathBuf>,
    pub out_dir: PathBuf,
    pub base_name: Option<String>,
    pub concurrency: usize,
    pub strict: bool,
    pub allow_fallback: bool,
    pub rust_log: String,
    pub creation_date: Option<DateTime<Utc>>,
    pub themes: AudienceThemes,
    /// Empty means every role in the registry.
    pub roles: Vec<String>,
    /// Empty means every scheme in the catalogue.
    pub schemes: Vec<String>,
    pub formats: Vec<OutputFormat>,
    pub lengths: Vec<Length>,
    pub audiences: Vec<Audience>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            master_path: PathBuf::from(DEFAULT_MASTER),
            roles_path: PathBuf::from(DEFAULT_ROLES),
            schemes_dir: None,
            out_dir: PathBuf::from(DEFAULT_OUT),
            base_name: None,
            concurrency: DEFAULT_CONCURRENCY,
            strict: false,
            allow_fallback: true,
            rust_log: "info".to_string(),
            creation_date: None,
            themes: AudienceThemes::default(),
            roles: Vec::new(),
            schemes: Vec::new(),
            formats: OutputFormat::ALL.to_vec(),
            lengths: Length::ALL.to_vec(),
            audiences: Audience::ALL.to_vec(),
        }
    }
}

impl Config {
    /// Defaults, then the `--config` file if given, then flags.
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        let file = match &args.config {
            Some(path) => read_file(path)?,
            None => FileConfig::default(),
        };
        let mut config = Config::default().merge_file(file)?;

        if let Some(v) = &args.master {
            config.master_path = v.clone();
        }
        if let Some(v) = &args.roles {
            config.roles_path = v.clone();
        }
        if let Some(v) = &args.schemes_dir {
            config.schemes_dir = Some(v.clone());
        }
        if let Some(v) = &args.base_name {
            config.base_name = Some(v.clone());
        }
        if let Some(v) = args.concurrency {
            config.concurrency = v;
        }
        if let Some(v) = &args.log_level {
            config.rust_log = v.clone();
        }
        config.strict |= args.strict;

        if config.concurrency == 0 {
            bail!("concurrency must be at least 1");
        }
        Ok(config)
    }

    fn merge_file(mut self, file: FileConfig) -> Result<Self> {
        if let Some(v) = file.master {
            self.master_path = v;
        }
        if let Some(v) = file.roles {
            self.roles_path = v;
        }
        if let Some(v) = file.schemes_dir {
            self.schemes_dir = Some(v);
        }
        if let Some(v) = file.out {
            self.out_dir = v;
        }
        if let Some(v) = file.base_name {
            self.base_name = Some(v);
        }
        if let Some(v) = file.concurrency {
            self.concurrency = v;
        }
        if let Some(v) = file.strict {
            self.strict = v;
        }
        if let Some(v) = file.allow_fallback {
            self.allow_fallback = v;
        }
        if let Some(v) = file.log_level {
            self.rust_log = v;
        }
        if let Some(v) = file.creation_date {
            let date = DateTime::parse_from_rfc3339(&v)
                .with_context(|| format!("creation_date '{v}' is not an RFC 3339 timestamp"))?;
            self.creation_date = Some(date.with_timezone(&Utc));
        }

        if let Some(v) = file.themes.ats {
            self.themes.ats = v.parse::<ThemeName>().context("themes.ats")?;
        }
        if let Some(v) = file.themes.human {
            self.themes.human = v.parse::<ThemeName>().context("themes.human")?;
        }

        let emit = file.emit;
        self.roles = emit.roles;
        self.schemes = emit.schemes;
        if !emit.formats.is_empty() {
            self.formats = parse_list(&emit.formats, "emit.formats")?;
        }
        if !emit.lengths.is_empty() {
            self.lengths = parse_list(&emit.lengths, "emit.lengths")?;
        }
        if !emit.audiences.is_empty() {
            self.audiences = parse_list(&emit.audiences, "emit.audiences")?;
        }
        Ok(self)
    }
}

fn read_file(path: &Path) -> Result<FileConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read config file '{}'", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Malformed config file '{}'", path.display()))
}

/// Parses and de-duplicates, keeping first-seen order.
fn parse_list<T>(values: &[String], key: &str) -> Result<Vec<T>>
where
    T: std::str::FromStr + PartialEq,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let mut out: Vec<T> = Vec::with_capacity(values.len());
    for value in values {
        let parsed: T = value.parse().with_context(|| format!("invalid entry in {key}"))?;
        if !out.contains(&parsed) {
            out.push(parsed);
        }
    }
    Ok(out)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
