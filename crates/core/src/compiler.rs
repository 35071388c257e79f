//! Solidity compilation through the solc command line

use crate::{
    artifacts::CompiledArtifacts,
    config::{OutputValue, Remapping},
    error::{ManageError, Result},
    utils,
};
use semver::Version;
use std::{
    io::Write,
    path::Path,
    process::{Command, Stdio},
};

/// Everything needed for one compiler invocation
#[derive(Debug, Clone)]
pub struct CompileRequest<'a> {
    /// Contract source text, fed on stdin
    pub source: &'a str,
    /// solc binary to run
    pub solc: &'a Path,
    /// Version the binary is expected to be
    pub version: &'a Version,
    /// Requested outputs
    pub output_values: &'a [OutputValue],
    /// Import remappings
    pub remappings: &'a [Remapping],
}

/// Compiles contract source text into artifacts
pub trait SourceCompiler {
    fn compile_source(&self, request: &CompileRequest<'_>) -> Result<CompiledArtifacts>;
}

/// Runs the solc binary with `--combined-json`
///
/// Relative remapping targets resolve against the current directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct Solc;

impl Solc {
    pub fn new() -> Self {
        Self::default()
    }

    fn command(&self, request: &CompileRequest<'_>) -> Command {
        let combined = request
            .output_values
            .iter()
            .map(OutputValue::as_str)
            .collect::<Vec<_>>()
            .join(",");

        let mut cmd = Command::new(request.solc);
        cmd.arg("--combined-json").arg(combined);
        cmd.args(request.remappings.iter().map(Remapping::to_string));
        cmd.arg("-");

        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl SourceCompiler for Solc {
    fn compile_source(&self, request: &CompileRequest<'_>) -> Result<CompiledArtifacts> {
        let mut cmd = self.command(request);
        tracing::debug!("Running solc {}: {:?}", request.version, cmd);

        let spawn_error = |source| ManageError::CompilerSpawn {
            path: request.solc.to_path_buf(),
            source,
        };

        let mut child = cmd.spawn().map_err(spawn_error)?;
        // solc may exit before draining stdin; its exit status decides first
        let write_error = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(request.source.as_bytes()).err(),
            None => None,
        };

        let output = child.wait_with_output().map_err(spawn_error)?;
        let stderr = utils::output_text(&output.stderr);

        if !output.status.success() {
            return Err(ManageError::CompilerFailed {
                code: output.status.code(),
                stderr,
            });
        }

        if let Some(source) = write_error {
            return Err(spawn_error(source));
        }

        if !stderr.is_empty() {
            tracing::warn!("solc reported:\n{}", stderr);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let artifacts = CompiledArtifacts::from_combined_json(&stdout)?;
        tracing::debug!("solc produced {} contracts", artifacts.len());

        Ok(artifacts)
    }
}
