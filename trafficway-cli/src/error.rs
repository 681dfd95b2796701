//! Error types emitted by the trafficway CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;
use trafficway_data::ProviderBuildError;
use trafficway_data::feed::FeedError;
use trafficway_planner::PlannerError;

/// Errors emitted by the trafficway CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name without the leading dashes.
        field: &'static str,
        /// Environment variable that can supply the value.
        env: &'static str,
    },
    /// A place name matched nothing.
    #[error("no place matches {query:?} for the {field}")]
    UnknownPlace {
        /// Flag the query came from.
        field: &'static str,
        /// Text that was looked up.
        query: String,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        /// Flag the path came from.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Flag the path came from.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected or opened.
    #[error("failed to open {field} path {path:?}: {source}")]
    OpenSource {
        /// Flag the path came from.
        field: &'static str,
        /// Offending path.
        path: Utf8PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The congestion snapshot could not be decoded.
    #[error("failed to load congestion snapshot {path:?}: {source}")]
    LoadSnapshot {
        /// Snapshot path.
        path: Utf8PathBuf,
        /// Decoding failure.
        #[source]
        source: FeedError,
    },
    /// Reading the live congestion feed failed.
    #[error(transparent)]
    Feed(FeedError),
    /// Constructing an HTTP provider failed.
    #[error("failed to build {provider} client for {base_url:?}: {source}")]
    BuildProvider {
        /// Which provider was being built.
        provider: &'static str,
        /// Configured base URL.
        base_url: String,
        /// Construction failure.
        #[source]
        source: ProviderBuildError,
    },
    /// The planner stopped on a configuration error.
    #[error(transparent)]
    Planner(#[from] PlannerError),
    /// Starting the async runtime failed.
    #[error("failed to start the async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Serialising a result failed.
    #[error("failed to serialise output: {0}")]
    Serialise(#[source] serde_json::Error),
    /// Writing a result failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
