use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

use crate::domain::types::StatusFilter;

/// Command-line arguments for the polemap binary.
#[derive(Debug, Parser)]
#[command(name = "polemap", version, about = "Utility pole map server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "POLEMAP_CONFIG_FILE",
        value_name = "PATH",
        value_hint = ValueHint::FilePath
    )]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Serve the map page and the posts API.
    Serve(Box<ServeArgs>),
    /// Fetch posts once and print the filtered list.
    Posts(PostsArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct SourceOverrides {
    /// Fetch posts from this base URL instead of the local catalog.
    #[arg(long = "source-api-url", value_name = "URL", value_hint = ValueHint::Url)]
    pub api_url: Option<String>,

    /// Override the posts fetch timeout.
    #[arg(long = "source-timeout-seconds", value_name = "SECONDS")]
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct CatalogOverride {
    /// Override the JSON seed file backing the local catalog.
    #[arg(long = "posts-seed-file", value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub seed_file: Option<PathBuf>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub source: SourceOverrides,

    #[command(flatten)]
    pub catalog: CatalogOverride,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the page header height subtracted from the viewport.
    #[arg(long = "map-header-height-px", value_name = "PIXELS")]
    pub map_header_height_px: Option<u32>,

    /// Override the padding applied when fitting the map to all posts.
    #[arg(long = "map-fit-padding-px", value_name = "PIXELS")]
    pub map_fit_padding_px: Option<u32>,

    /// Override the viewport height assumed for server-side rendering.
    #[arg(long = "map-viewport-height-px", value_name = "PIXELS")]
    pub map_viewport_height_px: Option<u32>,

    /// Override how many open map pages stay live.
    #[arg(long = "sessions-capacity", value_name = "PAGES")]
    pub sessions_capacity: Option<usize>,
}

#[derive(Debug, Args, Clone)]
pub struct PostsArgs {
    #[command(flatten)]
    pub source: SourceOverrides,

    #[command(flatten)]
    pub catalog: CatalogOverride,

    /// Case-insensitive search over post name and id.
    #[arg(long, short = 'q', value_name = "TEXT")]
    pub query: Option<String>,

    /// Status filter (all|active|maintenance|inactive).
    #[arg(
        long,
        value_name = "STATUS",
        default_value = "all",
        value_parser = parse_status_filter
    )]
    pub status: StatusFilter,

    /// Print the filtered posts as JSON instead of a table.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub json: bool,
}

fn parse_status_filter(value: &str) -> Result<StatusFilter, String> {
    StatusFilter::try_from(value).map_err(|()| {
        format!("unknown status `{value}`; expected all, active, maintenance or inactive")
    })
}
