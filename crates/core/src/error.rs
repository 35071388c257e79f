//! Error type shared by every stage of a run

use std::path::PathBuf;

/// Result alias used throughout the library
pub type Result<T, E = ManageError> = std::result::Result<T, E>;

/// Fatal failures of a run. Nothing is retried, every variant aborts.
#[derive(Debug, thiserror::Error)]
pub enum ManageError {
    #[error("Unknown command '{command}'. Known commands: {known}")]
    UnknownCommand { command: String, known: String },

    #[error("Input closed while prompting for {name}")]
    PromptClosed { name: String },

    #[error("Failed to read input for {name}: {source}")]
    Prompt {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read contract source {}: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch the solc release list: {0}")]
    ReleaseList(String),

    #[error("Failed to install solc {version}: {message}")]
    Install { version: String, message: String },

    #[error("Failed to list installed solc versions: {0}")]
    InstalledVersions(String),

    #[error("No solc versions are installed")]
    NoInstalledVersions,

    #[error("Failed to execute solc at {}: {source}", path.display())]
    CompilerSpawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("solc exited with code {code:?}:\n{stderr}")]
    CompilerFailed { code: Option<i32>, stderr: String },

    #[error("Unexpected solc output: {0}")]
    CompilerOutput(String),

    #[error("Contract '{name}' not found in compiler output (found: {available})")]
    ArtifactNotFound { name: String, available: String },

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl ManageError {
    /// Classifies the error for machine-readable reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownCommand { .. } => "configuration_error",
            Self::PromptClosed { .. } | Self::Prompt { .. } | Self::SourceUnreadable { .. } => {
                "input_error"
            }
            Self::ReleaseList(_)
            | Self::Install { .. }
            | Self::InstalledVersions(_)
            | Self::NoInstalledVersions
            | Self::CompilerSpawn { .. }
            | Self::CompilerFailed { .. }
            | Self::CompilerOutput(_) => "toolchain_error",
            Self::ArtifactNotFound { .. } => "output_shape_error",
            Self::Output(_) => "io_error",
        }
    }
}
