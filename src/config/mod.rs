//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{
    net::SocketAddr,
    num::NonZeroUsize,
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

pub use cli::{
    CliArgs, Command, CommonOverrides, RenderArgs, ServeArgs, ServeOverrides, SweepArgs,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "docweave";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3047;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_DOCS_API_BASE: &str = "https://docs.googleapis.com";
const DEFAULT_DRIVE_API_BASE: &str = "https://www.googleapis.com";
const DEFAULT_SOURCE_DIRECTORY: &str = "documents";
const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_ASSETS_DIRECTORY: &str = "assets";
const DEFAULT_ASSETS_PUBLIC_BASE: &str = "http://127.0.0.1:3047/assets";
const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub source: SourceSettings,
    pub assets: AssetSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub backend: SourceBackend,
    pub timeout: Duration,
    /// Principal documents must be shared with; quoted in error guidance.
    pub share_with: Option<String>,
}

#[derive(Debug, Clone)]
pub enum SourceBackend {
    Google {
        docs_api_base: Url,
        drive_api_base: Url,
        access_token: Option<String>,
    },
    Directory {
        path: PathBuf,
    },
}

#[derive(Debug, Clone)]
pub struct AssetSettings {
    pub backend: AssetBackend,
    pub public_base_url: Url,
}

#[derive(Debug, Clone)]
pub enum AssetBackend {
    Filesystem { directory: PathBuf },
    Memory,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub capacity: NonZeroUsize,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("DOCWEAVE").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Render(args)) => raw.apply_common_overrides(&args.overrides),
        Some(Command::Sweep(args)) => raw.apply_common_overrides(&args.overrides),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    source: RawSourceSettings,
    assets: RawAssetSettings,
    cache: RawCacheSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(capacity) = overrides.cache_capacity {
            self.cache.capacity = Some(capacity);
        }

        self.apply_common_overrides(&overrides.common);
    }

    fn apply_common_overrides(&mut self, overrides: &CommonOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(backend) = overrides.source_backend.as_ref() {
            self.source.backend = Some(backend.clone());
        }
        if let Some(directory) = overrides.source_directory.as_ref() {
            self.source.directory = Some(directory.clone());
        }
        if let Some(token) = overrides.source_access_token.as_ref() {
            self.source.access_token = Some(token.clone());
        }
        if let Some(backend) = overrides.assets_backend.as_ref() {
            self.assets.backend = Some(backend.clone());
        }
        if let Some(directory) = overrides.assets_directory.as_ref() {
            self.assets.directory = Some(directory.clone());
        }
        if let Some(base) = overrides.assets_public_base_url.as_ref() {
            self.assets.public_base_url = Some(base.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            source,
            assets,
            cache,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            source: build_source_settings(source)?,
            assets: build_asset_settings(assets)?,
            cache: build_cache_settings(cache)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr =
        parse_socket_addr(&host, port).map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_source_settings(source: RawSourceSettings) -> Result<SourceSettings, LoadError> {
    let timeout_secs = source
        .timeout_seconds
        .unwrap_or(DEFAULT_SOURCE_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "source.timeout_seconds",
            "must be greater than zero",
        ));
    }

    let backend = match non_empty(source.backend).as_deref().unwrap_or("google") {
        "google" => SourceBackend::Google {
            docs_api_base: parse_url(
                source.docs_api_base.as_deref(),
                DEFAULT_DOCS_API_BASE,
                "source.docs_api_base",
            )?,
            drive_api_base: parse_url(
                source.drive_api_base.as_deref(),
                DEFAULT_DRIVE_API_BASE,
                "source.drive_api_base",
            )?,
            access_token: non_empty(source.access_token),
        },
        "directory" => {
            let path = source
                .directory
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_DIRECTORY));
            if path.as_os_str().is_empty() {
                return Err(LoadError::invalid(
                    "source.directory",
                    "path must not be empty",
                ));
            }
            SourceBackend::Directory { path }
        }
        other => {
            return Err(LoadError::invalid(
                "source.backend",
                format!("unknown backend `{other}` (expected google or directory)"),
            ));
        }
    };

    Ok(SourceSettings {
        backend,
        timeout: Duration::from_secs(timeout_secs),
        share_with: non_empty(source.share_with),
    })
}

fn build_asset_settings(assets: RawAssetSettings) -> Result<AssetSettings, LoadError> {
    let backend = match non_empty(assets.backend).as_deref().unwrap_or("filesystem") {
        "filesystem" => {
            let directory = assets
                .directory
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIRECTORY));
            if directory.as_os_str().is_empty() {
                return Err(LoadError::invalid(
                    "assets.directory",
                    "path must not be empty",
                ));
            }
            AssetBackend::Filesystem { directory }
        }
        "memory" => AssetBackend::Memory,
        other => {
            return Err(LoadError::invalid(
                "assets.backend",
                format!("unknown backend `{other}` (expected filesystem or memory)"),
            ));
        }
    };

    let public_base_url = parse_url(
        assets.public_base_url.as_deref(),
        DEFAULT_ASSETS_PUBLIC_BASE,
        "assets.public_base_url",
    )?;

    Ok(AssetSettings {
        backend,
        public_base_url,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let capacity = NonZeroUsize::new(cache.capacity.unwrap_or(DEFAULT_CACHE_CAPACITY))
        .ok_or_else(|| LoadError::invalid("cache.capacity", "must be greater than zero"))?;
    Ok(CacheSettings { capacity })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSourceSettings {
    backend: Option<String>,
    docs_api_base: Option<String>,
    drive_api_base: Option<String>,
    access_token: Option<String>,
    directory: Option<PathBuf>,
    timeout_seconds: Option<u64>,
    share_with: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawAssetSettings {
    backend: Option<String>,
    directory: Option<PathBuf>,
    public_base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    capacity: Option<usize>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn parse_url(value: Option<&str>, default: &str, key: &'static str) -> Result<Url, LoadError> {
    let candidate = value.map(str::trim).filter(|value| !value.is_empty()).unwrap_or(default);
    let url = Url::parse(candidate)
        .map_err(|err| LoadError::invalid(key, format!("invalid URL `{candidate}`: {err}")))?;
    if url.cannot_be_a_base() {
        return Err(LoadError::invalid(key, format!("`{candidate}` cannot be a base URL")));
    }
    Ok(url)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

#[cfg(test)]
mod tests;
