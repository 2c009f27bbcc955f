use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the docweave binary.
#[derive(Debug, Parser)]
#[command(
    name = "docweave",
    version,
    about = "Render structured documents into self-contained HTML"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "DOCWEAVE_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP service.
    Serve(Box<ServeArgs>),
    /// Render one document and print or write the resulting HTML.
    Render(RenderArgs),
    /// Delete stored image variants no document references any more.
    Sweep(SweepArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    /// Identifier of the document to render.
    #[arg(value_name = "ID")]
    pub id: String,

    /// Ignore any cached rendering.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub fresh: bool,

    /// Write the HTML to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: CommonOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct SweepArgs {
    #[command(flatten)]
    pub overrides: CommonOverrides,
}

/// Overrides shared by every command.
#[derive(Debug, Args, Default, Clone)]
pub struct CommonOverrides {
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

    /// Override the document source backend (google|directory).
    #[arg(long = "source-backend", value_name = "BACKEND")]
    pub source_backend: Option<String>,

    /// Override the directory read by the directory source backend.
    #[arg(long = "source-directory", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub source_directory: Option<PathBuf>,

    /// Override the bearer token sent to the document API.
    #[arg(long = "source-access-token", env = "DOCWEAVE_ACCESS_TOKEN", value_name = "TOKEN")]
    pub source_access_token: Option<String>,

    /// Override the asset store backend (filesystem|memory).
    #[arg(long = "assets-backend", value_name = "BACKEND")]
    pub assets_backend: Option<String>,

    /// Override the directory used by the filesystem asset store.
    #[arg(long = "assets-directory", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub assets_directory: Option<PathBuf>,

    /// Override the public base URL of stored assets.
    #[arg(long = "assets-public-base-url", value_name = "URL")]
    pub assets_public_base_url: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub common: CommonOverrides,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the number of rendered documents kept in memory.
    #[arg(long = "cache-capacity", value_name = "COUNT")]
    pub cache_capacity: Option<usize>,
}
