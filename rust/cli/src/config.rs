use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub starting_chips: u64,
    pub default_stake: u64,
    pub seed: Option<u64>,
    pub log_dir: String,
    pub unicode: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfigSources {
    pub starting_chips: ValueSource,
    pub default_stake: ValueSource,
    pub seed: ValueSource,
    pub log_dir: ValueSource,
    pub unicode: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            starting_chips: ValueSource::Default,
            default_stake: ValueSource::Default,
            seed: ValueSource::Default,
            log_dir: ValueSource::Default,
            unicode: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            starting_chips: 1_000,
            default_stake: 10,
            seed: None,
            log_dir: "logs".into(),
            unicode: true,
        }
    }
}

#[derive(Debug)]
#[allow(dead_code)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub fn load() -> Result<Config, ConfigError> {
    load_with_sources().map(|resolved| resolved.config)
}

pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Ok(path) = std::env::var("GREENFELT_CONFIG") {
        let s = fs::read_to_string(path)?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.starting_chips {
            cfg.starting_chips = v;
            sources.starting_chips = ValueSource::File;
        }
        if let Some(v) = f.default_stake {
            cfg.default_stake = v;
            sources.default_stake = ValueSource::File;
        }
        if let Some(v) = f.seed {
            cfg.seed = Some(v);
            sources.seed = ValueSource::File;
        }
        if let Some(v) = f.log_dir {
            cfg.log_dir = v;
            sources.log_dir = ValueSource::File;
        }
        if let Some(v) = f.unicode {
            cfg.unicode = v;
            sources.unicode = ValueSource::File;
        }
    }

    if let Ok(seed) = std::env::var("GREENFELT_SEED")
        && !seed.is_empty()
    {
        cfg.seed = Some(
            seed.parse()
                .map_err(|_| ConfigError::Invalid("Invalid seed".into()))?,
        );
        sources.seed = ValueSource::Env;
    }
    if let Ok(chips) = std::env::var("GREENFELT_CHIPS")
        && !chips.is_empty()
    {
        cfg.starting_chips = chips
            .parse()
            .map_err(|_| ConfigError::Invalid("Invalid starting_chips".into()))?;
        sources.starting_chips = ValueSource::Env;
    }
    if let Ok(stake) = std::env::var("GREENFELT_STAKE")
        && !stake.is_empty()
    {
        cfg.default_stake = stake
            .parse()
            .map_err(|_| ConfigError::Invalid("Invalid default_stake".into()))?;
        sources.default_stake = ValueSource::Env;
    }
    if let Ok(dir) = std::env::var("GREENFELT_LOG_DIR")
        && !dir.is_empty()
    {
        cfg.log_dir = dir;
        sources.log_dir = ValueSource::Env;
    }
    if let Ok(uni) = std::env::var("GREENFELT_UNICODE")
        && !uni.is_empty()
    {
        cfg.unicode =
            parse_bool(&uni).ok_or_else(|| ConfigError::Invalid("Invalid unicode".into()))?;
        sources.unicode = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
struct FileConfig {
    #[serde(default)]
    starting_chips: Option<u64>,
    #[serde(default)]
    default_stake: Option<u64>,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    log_dir: Option<String>,
    #[serde(default)]
    unicode: Option<bool>,
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.starting_chips == 0 {
        return Err(ConfigError::Invalid(
            "Invalid configuration: starting_chips must be >0".into(),
        ));
    }
    if cfg.default_stake == 0 {
        return Err(ConfigError::Invalid(
            "Invalid configuration: default_stake must be >0".into(),
        ));
    }
    if cfg.log_dir.is_empty() {
        return Err(ConfigError::Invalid(
            "Invalid configuration: log_dir must not be empty".into(),
        ));
    }
    Ok(())
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
