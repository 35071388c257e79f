//! Settings collection and Solidity compilation for the TokenWrapper contract
pub mod artifacts;
pub mod command;
mod compiler;
pub mod config;
mod error;
mod runner;
pub mod settings;
pub mod toolchain;
mod utils;

pub use artifacts::{Abi, CompiledArtifact, CompiledArtifacts};
pub use command::{normalize_args, required_settings, SettingSpec, GENERIC_NAME};
pub use compiler::{CompileRequest, Solc, SourceCompiler};
pub use config::{ManageConfig, OutputValue, Remapping, SolcVersionRequest};
pub use error::{ManageError, Result};
pub use runner::{RunReport, Runner};
pub use settings::{LinePrompt, Prompt, Setting, SettingSource, Settings};
pub use toolchain::{SvmToolchain, Toolchain};

pub use semver::Version;
