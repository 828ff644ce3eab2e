//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    net::SocketAddr,
    num::{NonZeroU32, NonZeroUsize},
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

use crate::application::bootstrap::{DEFAULT_FIT_PADDING_PX, DEFAULT_HEADER_HEIGHT_PX};

mod cli;

pub use cli::{
    CatalogOverride, CliArgs, Command, PostsArgs, ServeArgs, ServeOverrides, SourceOverrides,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "polemap";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_VIEWPORT_HEIGHT_PX: u32 = 800;
const DEFAULT_SESSION_CAPACITY: usize = 1024;

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub posts: PostsSettings,
    pub source: SourceSettings,
    pub map: MapSettings,
    pub sessions: SessionSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
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

#[derive(Debug, Clone, Default)]
pub struct PostsSettings {
    /// JSON array served by `/api/posts`; the built-in sample when unset.
    pub seed_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct SourceSettings {
    /// Remote instance whose `/api/posts` feeds the page instead of the local catalog.
    pub api_url: Option<Url>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct MapSettings {
    pub header_height_px: u32,
    pub fit_padding_px: u32,
    pub viewport_height_px: NonZeroU32,
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Open map pages kept live; the least recently used page is dropped beyond this.
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

    builder = builder.add_source(Environment::with_prefix("POLEMAP").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Posts(args)) => {
            raw.apply_source_overrides(&args.source);
            raw.apply_catalog_override(&args.catalog);
        }
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    posts: RawPostsSettings,
    source: RawSourceSettings,
    map: RawMapSettings,
    sessions: RawSessionSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(height) = overrides.map_header_height_px {
            self.map.header_height_px = Some(height);
        }
        if let Some(padding) = overrides.map_fit_padding_px {
            self.map.fit_padding_px = Some(padding);
        }
        if let Some(height) = overrides.map_viewport_height_px {
            self.map.viewport_height_px = Some(height);
        }
        if let Some(capacity) = overrides.sessions_capacity {
            self.sessions.capacity = Some(capacity);
        }

        self.apply_source_overrides(&overrides.source);
        self.apply_catalog_override(&overrides.catalog);
    }

    fn apply_source_overrides(&mut self, overrides: &SourceOverrides) {
        if let Some(url) = overrides.api_url.as_ref() {
            self.source.api_url = Some(url.clone());
        }
        if let Some(seconds) = overrides.timeout_seconds {
            self.source.timeout_seconds = Some(seconds);
        }
    }

    fn apply_catalog_override(&mut self, overrides: &CatalogOverride) {
        if let Some(path) = overrides.seed_file.as_ref() {
            self.posts.seed_file = Some(path.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            posts,
            source,
            map,
            sessions,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            posts: build_posts_settings(posts)?,
            source: build_source_settings(source)?,
            map: build_map_settings(map)?,
            sessions: build_session_settings(sessions)?,
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

    let addr = parse_socket_addr(&host, port)
        .map_err(|reason| LoadError::invalid("server.addr", reason))?;

    Ok(ServerSettings { addr })
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

fn build_posts_settings(posts: RawPostsSettings) -> Result<PostsSettings, LoadError> {
    let seed_file = match posts.seed_file {
        Some(path) if path.as_os_str().is_empty() => {
            return Err(LoadError::invalid(
                "posts.seed_file",
                "path must not be empty",
            ));
        }
        other => other,
    };

    Ok(PostsSettings { seed_file })
}

fn build_source_settings(source: RawSourceSettings) -> Result<SourceSettings, LoadError> {
    let api_url = match source.api_url {
        Some(value) if !value.trim().is_empty() => Some(parse_base_url(value.trim())?),
        _ => None,
    };

    let timeout_secs = source
        .timeout_seconds
        .unwrap_or(DEFAULT_SOURCE_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "source.timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(SourceSettings {
        api_url,
        timeout: Duration::from_secs(timeout_secs),
    })
}

fn build_map_settings(map: RawMapSettings) -> Result<MapSettings, LoadError> {
    let viewport = map
        .viewport_height_px
        .unwrap_or(DEFAULT_VIEWPORT_HEIGHT_PX);
    let viewport_height_px = NonZeroU32::new(viewport)
        .ok_or_else(|| LoadError::invalid("map.viewport_height_px", "must be greater than zero"))?;

    Ok(MapSettings {
        header_height_px: map.header_height_px.unwrap_or(DEFAULT_HEADER_HEIGHT_PX),
        fit_padding_px: map.fit_padding_px.unwrap_or(DEFAULT_FIT_PADDING_PX),
        viewport_height_px,
    })
}

fn build_session_settings(sessions: RawSessionSettings) -> Result<SessionSettings, LoadError> {
    let capacity = NonZeroUsize::new(sessions.capacity.unwrap_or(DEFAULT_SESSION_CAPACITY))
        .ok_or_else(|| LoadError::invalid("sessions.capacity", "must be greater than zero"))?;
    Ok(SessionSettings { capacity })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawPostsSettings {
    seed_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSourceSettings {
    api_url: Option<String>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawMapSettings {
    header_height_px: Option<u32>,
    fit_padding_px: Option<u32>,
    viewport_height_px: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSessionSettings {
    capacity: Option<usize>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn parse_base_url(value: &str) -> Result<Url, LoadError> {
    let url = Url::parse(value)
        .map_err(|err| LoadError::invalid("source.api_url", format!("failed to parse: {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(LoadError::invalid(
            "source.api_url",
            format!("unsupported scheme `{other}`"),
        )),
    }
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
