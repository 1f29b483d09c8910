use config::{Config, ConfigError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::constants::{DEFAULT_MAX_PARTIES, ENV_PREFIX, MAX_SUPPORTED_PARTIES};
use crate::solver::{solver_by_name, MaxFlowSolver};

/// How the table is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format {other:?}, expected text or json")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverConfig {
    /// Largest `N` the canonical table is built for.
    pub max_parties: u8,
    /// Max-flow solver name, `edmonds-karp` or `dinic`.
    pub solver: String,
    pub format: OutputFormat,
}

impl Default for RecoverConfig {
    fn default() -> Self {
        RecoverConfig {
            max_parties: DEFAULT_MAX_PARTIES,
            solver: "edmonds-karp".to_string(),
            format: OutputFormat::Text,
        }
    }
}

impl RecoverConfig {
    /// Loads defaults, then the TOML file at `path` if it exists, then
    /// `RECOVER_*` environment variables.
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let defaults = RecoverConfig::default();
        let settings = Config::builder()
            .set_default("max_parties", defaults.max_parties as i64)?
            .set_default("solver", defaults.solver)?
            .set_default("format", "text")?
            // Add in `./.shard-recover/conf.toml`
            .add_source(config::File::with_name(path).required(false))
            // Eg.. `RECOVER_MAX_PARTIES=5 ./target/shard-recover table`
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?;

        let my_config: RecoverConfig = settings.try_into()?;
        debug!("📝 Loaded config from {}: {:?}", path, my_config);
        Ok(my_config)
    }

    /// Writes the default configuration to `path` unless a file is already
    /// there.
    pub fn write_default(path: &str) -> Result<(), ConfigError> {
        let path = Path::new(path);
        if path.exists() {
            return Ok(());
        }
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|err| ConfigError::Foreign(Box::new(err)))?;
        }
        let toml = toml::to_string_pretty(&RecoverConfig::default())
            .map_err(|err| ConfigError::Foreign(Box::new(err)))?;
        fs::write(path, toml).map_err(|err| ConfigError::Foreign(Box::new(err)))?;
        debug!("📝 Wrote default config to {}", path.display());
        Ok(())
    }

    /// The configured solver.
    pub fn solver(&self) -> Result<Box<dyn MaxFlowSolver>, ConfigError> {
        solver_by_name(&self.solver)
            .ok_or_else(|| ConfigError::Message(format!("unknown solver {:?}", self.solver)))
    }
}

impl TryFrom<Config> for RecoverConfig {
    type Error = ConfigError;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        let max_parties = config.get_int("max_parties")?;
        if !(1..=MAX_SUPPORTED_PARTIES as i64).contains(&max_parties) {
            return Err(ConfigError::Message(format!(
                "max_parties must be in 1..={MAX_SUPPORTED_PARTIES}, got {max_parties}"
            )));
        }

        let solver = config.get_string("solver")?;
        if solver_by_name(&solver).is_none() {
            return Err(ConfigError::Message(format!("unknown solver {solver:?}")));
        }

        let format = config
            .get_string("format")?
            .parse()
            .map_err(ConfigError::Message)?;

        Ok(RecoverConfig {
            max_parties: max_parties as u8,
            solver,
            format,
        })
    }
}
