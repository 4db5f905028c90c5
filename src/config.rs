use std::fs::read_to_string;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser};
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_DATABASE_PATH: &str = "database.db";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_ASSETS_PATH: &str = "assets";

#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// TOML file with settings. Command line flags take precedence.
    #[arg(long, env = "WEATHER_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite file holding the readings
    #[arg(short, long, env = "WEATHER_DATABASE_PATH")]
    pub database_path: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "WEATHER_HOST")]
    pub host: Option<String>,

    #[arg(short, long, env = "WEATHER_PORT")]
    pub port: Option<u16>,

    /// Enable debug logging
    #[arg(
        long,
        env = "WEATHER_DEBUG",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    pub debug: bool,

    /// Directory with static files served for unknown paths
    #[arg(short, long, env = "WEATHER_ASSETS_PATH")]
    pub assets_path: Option<PathBuf>,

    #[arg(short, long, env = "KEY_FILE_PATH")]
    pub key_file_path: Option<PathBuf>,

    #[arg(short, long, env = "CERT_FILE_PATH")]
    pub cert_file_path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
struct FileSettings {
    database_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    debug: Option<bool>,
    assets_path: Option<PathBuf>,
    key_file_path: Option<PathBuf>,
    cert_file_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TlsSettings {
    pub key_file_path: PathBuf,
    pub cert_file_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_path: PathBuf,
    pub host: IpAddr,
    pub port: u16,
    pub debug: bool,
    pub assets_path: PathBuf,
    pub tls: Option<TlsSettings>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read from {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse toml from {path:?}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Cannot parse host \"{host}\": {source}")]
    InvalidHost {
        host: String,
        source: std::net::AddrParseError,
    },
    #[error("TLS needs both a key file and a certificate file")]
    IncompleteTls,
}

impl Settings {
    pub fn load(args: Args) -> Result<Settings, ConfigError> {
        let file_settings = match &args.config {
            Some(path) => read_file_settings(path)?,
            None => FileSettings::default(),
        };
        Settings::merge(args, file_settings)
    }

    fn merge(args: Args, file: FileSettings) -> Result<Settings, ConfigError> {
        let host = args
            .host
            .or(file.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host = host
            .parse::<IpAddr>()
            .map_err(|source| ConfigError::InvalidHost { host, source })?;

        let key_file_path = args.key_file_path.or(file.key_file_path);
        let cert_file_path = args.cert_file_path.or(file.cert_file_path);
        let tls = match (key_file_path, cert_file_path) {
            (Some(key_file_path), Some(cert_file_path)) => Some(TlsSettings {
                key_file_path,
                cert_file_path,
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteTls),
        };

        Ok(Settings {
            database_path: args
                .database_path
                .or(file.database_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            host,
            port: args.port.or(file.port).unwrap_or(DEFAULT_PORT),
            debug: args.debug || file.debug.unwrap_or(false),
            assets_path: args
                .assets_path
                .or(file.assets_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_PATH)),
            tls,
        })
    }

    pub fn address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn read_file_settings(path: &Path) -> Result<FileSettings, ConfigError> {
    let contents = read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_owned(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::ParseError {
        path: path.to_owned(),
        source,
    })
}
