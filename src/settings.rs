use std::path::Path;
use std::str::FromStr;

use config::{Config, ConfigError, Environment, File, FileFormat, Source};
use serde::Deserialize;
use structopt::StructOpt;

use crate::persist::{FileStore, Persistence};
use crate::store::{Multiplicity, ParameterStore, DEFAULT_MULTIPLE};
use crate::value::Value;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prefix of the environment variables that override the settings file
pub const ENV_PREFIX: &str = "FACETSTORE";

/// Settings come from the command line, unless the config file they point at exists, in which
/// case that file and the environment win.
pub fn settings(options: Settings) -> crate::Result<Settings> {
    if Path::new(&options.config).exists() {
        let mut settings = Settings::new(&options.config)?;
        settings.config = options.config;
        Ok(settings)
    } else {
        Ok(options)
    }
}

/// A parameter every store starts out with
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct SeedParam {
    pub name: String,
    pub value: Value,
}

#[derive(Deserialize, Clone, Debug, StructOpt)]
#[structopt(name = "facetstore", version = env!("CARGO_PKG_VERSION"))]
pub struct Settings {
    #[serde(skip)]
    #[structopt(short, long, default_value = "config/config.toml")]
    pub config: String,
    #[serde(default = "Settings::default_level")]
    #[structopt(short, long, default_value = "info")]
    pub log_level: String,
    #[serde(default = "Settings::default_logging_config")]
    #[structopt(long, default_value = "config/logging.toml")]
    pub logging_config: String,
    #[serde(default = "Settings::default_state_path")]
    #[structopt(short, long, default_value = "data/state.txt")]
    pub state_path: String,
    #[serde(default = "Settings::default_exposed")]
    #[structopt(short, long, use_delimiter = true, default_value = "q,fq")]
    pub exposed: Vec<String>,
    #[serde(default = "Settings::default_multiple")]
    #[structopt(
        short,
        long,
        use_delimiter = true,
        default_value = "bf,bq,facet.date,facet.date.other,facet.field,facet.query,fq,pf,qf"
    )]
    pub multiple: Vec<String>,
    #[serde(default)]
    #[structopt(skip)]
    pub params: Vec<SeedParam>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config: "config/config.toml".into(),
            log_level: Settings::default_level(),
            logging_config: Settings::default_logging_config(),
            state_path: Settings::default_state_path(),
            exposed: Settings::default_exposed(),
            multiple: Settings::default_multiple(),
            params: Vec::new(),
        }
    }
}

impl FromStr for Settings {
    type Err = ConfigError;

    fn from_str(cfg: &str) -> Result<Self, ConfigError> {
        Self::from_config(File::from_str(cfg, FileFormat::Toml))
    }
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        Self::from_config(File::with_name(path))
    }

    pub fn from_config<T: Source + Send + Sync + 'static>(c: T) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(c)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("exposed")
                    .with_list_parse_key("multiple"),
            )
            .build()?
            .try_deserialize()
    }

    pub fn default_level() -> String {
        "info".to_string()
    }

    pub fn default_logging_config() -> String {
        "config/logging.toml".to_string()
    }

    pub fn default_state_path() -> String {
        "data/state.txt".to_string()
    }

    pub fn default_exposed() -> Vec<String> {
        vec!["q".to_string(), "fq".to_string()]
    }

    pub fn default_multiple() -> Vec<String> {
        DEFAULT_MULTIPLE.iter().map(|s| s.to_string()).collect()
    }

    pub fn get_multiplicity(&self) -> Multiplicity {
        Multiplicity::names(&self.multiple)
    }

    /// A store configured from these settings and persisting to `state_path`
    pub fn store(&self) -> ParameterStore<FileStore> {
        self.store_with(FileStore::new(&self.state_path))
    }

    /// A store configured from these settings, seeded with `params`, persisting elsewhere
    pub fn store_with<P: Persistence>(&self, persistence: P) -> ParameterStore<P> {
        self.params
            .iter()
            .fold(
                ParameterStore::builder()
                    .exposed(self.exposed.iter().cloned())
                    .multiple(self.get_multiplicity())
                    .persistence(persistence),
                |builder, seed| builder.param(seed.name.as_str(), seed.value.clone()),
            )
            .build()
    }
}
