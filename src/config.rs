use std::{collections::HashMap, env, io, path::Path};

use derive_more::{Display, From};
use serde::Deserialize;
use tokio::fs;
use tracing_subscriber::filter::LevelFilter;

pub const FILE: &str = "config.toml";

pub const DEFAULT_PORT: u16 = 3000;

pub const DEFAULT_ENVIRONMENT: &str = "development";

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub environment: String,
    pub log_level: LevelFilter,
    pub cors: Cors,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Cors {
    /// Empty means any origin is allowed.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            environment: DEFAULT_ENVIRONMENT.to_owned(),
            log_level: LevelFilter::INFO,
            cors: Cors::default(),
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct File {
    port: Option<u16>,
    environment: Option<String>,
    log_level: Option<String>,
    cors: Cors,
}

impl Config {
    /// Loads `.env` and `config.toml` from the working directory (both
    /// optional), then applies `PORT`, `NODE_ENV` and `LOG_LEVEL` on top.
    pub async fn load() -> Result<Self, Error> {
        Self::load_from(Path::new("."), |key| env::var(key).ok()).await
    }

    /// Same as [`Config::load`], reading the files from `dir` and resolving
    /// variables with `lookup`. Variables set by `lookup` win over `.env`.
    pub async fn load_from<F>(dir: &Path, lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dotenv = match dotenvy::from_path_iter(dir.join(".env")) {
            Ok(vars) => vars.collect::<Result<HashMap<_, _>, _>>()?,
            Err(e) if e.not_found() => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        let config = match fs::read_to_string(dir.join(FILE)).await {
            Ok(file) => Self::from_toml(&file)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(e) => return Err(e.into()),
        };

        config.with_env(|key| {
            lookup(key).or_else(|| dotenv.get(key).cloned())
        })
    }

    pub fn from_toml(file: &str) -> Result<Self, Error> {
        let file = toml::from_str::<File>(file)?;
        let default = Self::default();

        Ok(Self {
            port: file.port.unwrap_or(default.port),
            environment: file.environment.unwrap_or(default.environment),
            log_level: file
                .log_level
                .as_deref()
                .map(parse_log_level)
                .transpose()?
                .unwrap_or(default.log_level),
            cors: file.cors,
        })
    }

    /// Overrides fields with the variables `lookup` resolves. Empty values
    /// count as unset.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(port) = var("PORT") {
            self.port =
                port.trim().parse().map_err(|_| Error::InvalidPort(port))?;
        }
        if let Some(environment) = var("NODE_ENV") {
            self.environment = environment;
        }
        if let Some(level) = var("LOG_LEVEL") {
            self.log_level = parse_log_level(&level)?;
        }

        Ok(self)
    }
}

fn parse_log_level(level: &str) -> Result<LevelFilter, Error> {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => Ok(LevelFilter::OFF),
        "error" => Ok(LevelFilter::ERROR),
        "warn" => Ok(LevelFilter::WARN),
        "info" => Ok(LevelFilter::INFO),
        // npm-style `http` and `verbose` sit between info and debug.
        "http" | "verbose" | "debug" => Ok(LevelFilter::DEBUG),
        "trace" | "silly" => Ok(LevelFilter::TRACE),
        _ => Err(Error::InvalidLogLevel(level.to_owned())),
    }
}

#[derive(Debug, Display, From)]
pub enum Error {
    #[from]
    #[display("failed to load .env: {_0}")]
    Dotenv(dotenvy::Error),
    #[from]
    #[display("failed to read config.toml: {_0}")]
    Io(io::Error),
    #[from]
    #[display("malformed config.toml: {_0}")]
    Toml(toml::de::Error),
    #[display("invalid port `{_0}`")]
    InvalidPort(String),
    #[display("invalid log level `{_0}`")]
    InvalidLogLevel(String),
}

impl std::error::Error for Error {}
