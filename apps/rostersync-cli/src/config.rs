//! Configuration: YAML file merged with CLI overrides.
//!
//! The file carries the durable setup (units, server credentials, scripts,
//! email); the CLI flags carry per-run switches. A flag given on the
//! command line always wins over the file.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use rostersync_core::{ReconcileOptions, UnitSelector};
use rostersync_directory::ScriptShell;

use crate::error::{CliError, CliResult};

const DEFAULT_CACHE_PATH: &str = "./.cache";

/// Detect and resolve differences between the staff roster and the
/// directory.
#[derive(Debug, Parser)]
#[command(name = "rostersync", version, about)]
pub struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long)]
    pub config: PathBuf,

    /// Report changes without writing anything to the directory.
    #[arg(long)]
    pub dry_run: bool,

    /// Raise diagnostic logging to debug level.
    #[arg(short, long)]
    pub verbose: bool,

    /// Serve roster data from the cache instead of the network.
    #[arg(long)]
    pub skip_source: bool,

    /// Serve the directory export from the cache instead of running the
    /// export script.
    #[arg(long)]
    pub skip_directory: bool,

    /// Email the change log after the run.
    #[arg(long)]
    pub send_email: bool,

    /// Override the cache directory.
    #[arg(long)]
    pub cache_path: Option<PathBuf>,

    /// Override the directory sync attribute name.
    #[arg(long)]
    pub attribute: Option<String>,
}

/// Raw shape of the YAML configuration file. Everything is optional here;
/// `Settings::resolve` decides what is actually required for the requested
/// run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub schools: Vec<UnitSelector>,
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub scripts: ScriptsSection,
    #[serde(default)]
    pub edit_credentials: Option<EditCredentialsSection>,
    #[serde(default)]
    pub email: EmailSection,
}

#[derive(Clone, Default, Deserialize)]
pub struct ServerSection {
    pub id: Option<String>,
    pub secret: Option<String>,
    pub url: Option<String>,
}

impl std::fmt::Debug for ServerSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerSection")
            .field("id", &self.id)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("url", &self.url)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppSection {
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub skip_source: bool,
    #[serde(default)]
    pub skip_directory: bool,
    pub cache_path: Option<PathBuf>,
    pub attribute: Option<String>,
    #[serde(default)]
    pub no_write: bool,
    #[serde(default)]
    pub output_matched: bool,
    #[serde(default)]
    pub output_ignored: bool,
    #[serde(default)]
    pub check_employee_id: bool,
    pub group: Option<String>,
    #[serde(default)]
    pub send_email: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScriptsSection {
    /// Script exporting the directory account list.
    pub user_list: Option<PathBuf>,
    /// Script setting the sync attribute on one account.
    pub edit_user: Option<PathBuf>,
    /// Shell running both scripts. Defaults to PowerShell.
    pub shell: Option<ScriptShell>,
    /// Check the shell execution policy before running scripts.
    pub verify_execution_policy: Option<bool>,
}

#[derive(Clone, Deserialize)]
pub struct EditCredentialsSection {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for EditCredentialsSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditCredentialsSection")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Clone, Default, Deserialize)]
pub struct EmailSection {
    pub to: Option<String>,
    pub from: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub pass: Option<String>,
}

impl std::fmt::Debug for EmailSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailSection")
            .field("to", &self.to)
            .field("from", &self.from)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("pass", &self.pass.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Fully merged run configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub schools: Vec<UnitSelector>,
    pub server: ServerSection,
    pub verbose: bool,
    pub skip_source: bool,
    pub skip_directory: bool,
    pub cache_path: PathBuf,
    pub sync_attribute: String,
    pub dry_run: bool,
    pub output_matched: bool,
    pub output_ignored: bool,
    pub check_employee_id: bool,
    pub ignore_group: Option<String>,
    pub send_email: bool,
    pub scripts: ScriptsSection,
    pub edit_credentials: Option<EditCredentialsSection>,
    pub email: EmailSection,
}

impl Settings {
    /// Load the YAML file and merge the CLI flags over it.
    pub fn load(cli: &Cli) -> CliResult<Self> {
        let content = std::fs::read_to_string(&cli.config).map_err(|err| {
            CliError::Config(format!(
                "could not read {}: {err}",
                cli.config.display()
            ))
        })?;
        let file: FileConfig = serde_yaml::from_str(&content)?;
        Self::resolve(file, cli)
    }

    /// Merge file and CLI, CLI taking precedence, and apply defaults.
    pub fn resolve(file: FileConfig, cli: &Cli) -> CliResult<Self> {
        let sync_attribute = cli
            .attribute
            .clone()
            .or(file.app.attribute)
            .ok_or_else(|| {
                CliError::Config("no sync attribute configured (app.attribute)".to_string())
            })?;

        let cache_path = cli
            .cache_path
            .clone()
            .or(file.app.cache_path)
            .unwrap_or_else(|| {
                tracing::warn!("no cache path configured, using {DEFAULT_CACHE_PATH}");
                PathBuf::from(DEFAULT_CACHE_PATH)
            });

        Ok(Self {
            schools: file.schools,
            server: file.server,
            verbose: cli.verbose || file.app.verbose,
            skip_source: cli.skip_source || file.app.skip_source,
            skip_directory: cli.skip_directory || file.app.skip_directory,
            cache_path,
            sync_attribute,
            dry_run: cli.dry_run || file.app.no_write,
            output_matched: file.app.output_matched,
            output_ignored: file.app.output_ignored,
            check_employee_id: file.app.check_employee_id,
            ignore_group: file.app.group,
            send_email: cli.send_email || file.app.send_email,
            scripts: file.scripts,
            edit_credentials: file.edit_credentials,
            email: file.email,
        })
    }

    /// The engine's slice of this configuration.
    #[must_use]
    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            sync_attribute: self.sync_attribute.clone(),
            dry_run: self.dry_run,
            output_matched: self.output_matched,
            output_ignored: self.output_ignored,
            check_employee_id: self.check_employee_id,
            ignore_group: self.ignore_group.clone(),
        }
    }

    /// Shell for directory scripts, defaulting to PowerShell.
    #[must_use]
    pub fn script_shell(&self) -> ScriptShell {
        self.scripts.shell.clone().unwrap_or_default()
    }

    /// Required-field helper used by the runner before network retrieval.
    pub fn server_credentials(&self) -> CliResult<(String, String, String)> {
        let id = self.require(self.server.id.as_ref(), "server.id")?;
        let secret = self.require(self.server.secret.as_ref(), "server.secret")?;
        let url = self.require(self.server.url.as_ref(), "server.url")?;
        Ok((id, secret, url))
    }

    fn require(&self, value: Option<&String>, key: &str) -> CliResult<String> {
        value
            .cloned()
            .ok_or_else(|| CliError::Config(format!("missing required config key: {key}")))
    }
}

/// Minimal CLI value for settings resolution in tests and library callers.
impl Cli {
    #[must_use]
    pub fn for_config(path: impl Into<PathBuf>) -> Self {
        Self {
            config: path.into(),
            dry_run: false,
            verbose: false,
            skip_source: false,
            skip_directory: false,
            send_email: false,
            cache_path: None,
            attribute: None,
        }
    }
}

/// Parse a config file from a path without CLI overrides.
pub fn load_file(path: &Path) -> CliResult<FileConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| CliError::Config(format!("could not read {}: {err}", path.display())))?;
    Ok(serde_yaml::from_str(&content)?)
}
