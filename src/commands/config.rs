use crate::Result;
use crate::collectors::Registry;
use crate::engine::RunSettings;
use crate::inventory::{Account, Region};
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::{IntoAppError, app_err, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;

const LOG_TARGET: &str = "    config";

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// Name of the configuration file looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "runbook.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Accounts to inventory
    #[serde(default)]
    pub accounts: Vec<Account>,

    /// Regions to scan; the first one is the home region for global collectors
    #[serde(default)]
    pub regions: Vec<Region>,

    /// Maximum number of scans running at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Wall-clock budget for one scan, in seconds
    #[serde(default = "default_task_timeout_secs")]
    pub task_timeout_secs: u64,

    /// Session name used for role assumption
    #[serde(default = "default_session_name")]
    pub session_name: String,

    /// Dispatch pause after a throttling error, in seconds
    #[serde(default = "default_throttle_pause_secs")]
    pub throttle_pause_secs: u64,

    /// Rows per table in the Markdown document, 0 for unlimited
    #[serde(default = "default_max_table_rows")]
    pub max_table_rows: usize,

    /// Collectors to run; all of them when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collectors: Option<Vec<String>>,
}

const fn default_max_concurrency() -> usize {
    5
}

const fn default_task_timeout_secs() -> u64 {
    300
}

fn default_session_name() -> String {
    "cloud-runbook".to_string()
}

const fn default_throttle_pause_secs() -> u64 {
    5
}

const fn default_max_table_rows() -> usize {
    10
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// Without an explicit path, `runbook.toml` in `base_dir` is used if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load(base_dir: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading configuration file '{path}'"))?;
            (path.clone(), text)
        } else {
            let path = base_dir.join(DEFAULT_CONFIG_FILE);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    log::debug!(target: LOG_TARGET, "no {DEFAULT_CONFIG_FILE} in '{base_dir}', using defaults");
                    return Ok(Self::default());
                }
                Err(e) => return Err(e).into_app_err_with(|| format!("reading configuration file '{path}'")),
            }
        };

        let config = Self::parse(&final_path, &text)?;
        config.validate()?;

        Ok(config)
    }

    fn parse(path: &Utf8Path, text: &str) -> Result<Self> {
        let extension = path.extension().unwrap_or_default();
        let config = match extension {
            "toml" => toml::from_str(text).into_app_err_with(|| format!("parsing configuration file '{path}'"))?,
            "yml" | "yaml" => serde_yaml::from_str(text).into_app_err_with(|| format!("parsing configuration file '{path}'"))?,
            "json" => serde_json::from_str(text).into_app_err_with(|| format!("parsing configuration file '{path}'"))?,
            _ => return Err(app_err!("unsupported configuration file extension: {extension}")),
        };

        Ok(config)
    }

    /// Save the default configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Validate configuration values
    ///
    /// Empty account and region lists are accepted here; [`Self::validate_for_scan`] rejects them.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            bail!("max_concurrency must be at least 1");
        }

        if self.task_timeout_secs == 0 {
            bail!("task_timeout_secs must be at least 1");
        }

        if self.session_name.trim().is_empty() {
            bail!("session_name must not be empty");
        }

        let mut seen_accounts = HashSet::new();
        for account in &self.accounts {
            account.validate()?;
            if !seen_accounts.insert(account.id.as_str()) {
                bail!("account {} is listed more than once", account.id);
            }
        }

        let mut seen_regions = HashSet::new();
        for region in &self.regions {
            // deserialization does not check the identifier
            let _ = Region::new(region.as_str())?;
            if !seen_regions.insert(region.as_str()) {
                bail!("region {region} is listed more than once");
            }
        }

        let _ = self.registry()?;
        Ok(())
    }

    /// Validate, and also require at least one account and one region
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or there is nothing to scan
    pub fn validate_for_scan(&self) -> Result<()> {
        self.validate()?;

        if self.accounts.is_empty() {
            bail!("no accounts configured, add [[accounts]] entries or pass --account");
        }

        if self.regions.is_empty() {
            bail!("no regions configured, set `regions` or pass --region");
        }

        Ok(())
    }

    /// The collectors to run, in registry order.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured collector name is unknown
    pub fn registry(&self) -> Result<Registry> {
        let standard = Registry::standard();
        match &self.collectors {
            Some(names) => standard.select(names),
            None => Ok(standard),
        }
    }

    #[must_use]
    pub fn settings(&self) -> RunSettings {
        RunSettings {
            max_concurrency: self.max_concurrency,
            task_timeout: Duration::from_secs(self.task_timeout_secs),
            throttle_pause: Duration::from_secs(self.throttle_pause_secs),
            session_name: self.session_name.clone(),
        }
    }

    /// Restrict the run to the given account ids.
    ///
    /// Ids already configured keep their role and alias; others are scanned with the ambient identity.
    ///
    /// # Errors
    ///
    /// Returns an error if an id is malformed
    pub fn override_accounts(&mut self, ids: &[String]) -> Result<()> {
        let accounts = ids
            .iter()
            .map(|id| match self.accounts.iter().find(|a| &a.id == id) {
                Some(account) => Ok(account.clone()),
                None => Account::new(id.clone(), None, None),
            })
            .collect::<Result<Vec<_>>>()?;

        self.accounts = accounts;
        Ok(())
    }

    /// Replace the configured regions.
    ///
    /// # Errors
    ///
    /// Returns an error if a region identifier is malformed
    pub fn override_regions(&mut self, ids: &[String]) -> Result<()> {
        self.regions = ids.iter().map(Region::new).collect::<Result<Vec<_>>>()?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default_config.toml should be valid TOML that deserializes to Config")
    }
}
