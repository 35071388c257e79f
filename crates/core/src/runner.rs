//! The settings-and-compile run

use crate::{
    artifacts::CompiledArtifact,
    command::{required_settings, TOKEN_CONTRACT_SOURCE},
    compiler::{CompileRequest, SourceCompiler},
    config::ManageConfig,
    error::{ManageError, Result},
    settings::{gather_settings, Prompt, Settings},
    toolchain::{select_version, Toolchain},
};
use semver::Version;
use std::{
    io::Write,
    path::{Path, PathBuf},
    time::Instant,
};

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Command that was run
    pub command: String,
    /// Settings gathered for the command
    pub settings: Settings,
    /// Version installed for this run
    pub installed_version: Version,
    /// Version used to compile
    pub solc_version: Version,
    /// Full version string solc reported for the compilation, when present
    pub compiler_version: Option<String>,
    /// Qualified name of the printed contract
    pub contract_name: String,
    /// ABI and bytecode of the printed contract
    pub artifact: CompiledArtifact,
}

/// Drives one run: settings, toolchain, compilation, output
pub struct Runner<T, C> {
    config: ManageConfig,
    toolchain: T,
    compiler: C,
}

impl<T: Toolchain, C: SourceCompiler> Runner<T, C> {
    pub fn new(config: ManageConfig, toolchain: T, compiler: C) -> Self {
        Self {
            config,
            toolchain,
            compiler,
        }
    }

    /// Runs `command` to completion, printing progress to `out`
    ///
    /// `out` receives the installed compiler version, the echoed environment
    /// settings, and finally the artifact JSON. The first failure aborts the
    /// run; anything already written stays written.
    pub fn run<E, P, W>(
        &self,
        command: &str,
        env: &E,
        prompt: &mut P,
        out: &mut W,
    ) -> Result<RunReport>
    where
        E: Fn(&str) -> Option<String>,
        P: Prompt + ?Sized,
        W: Write + ?Sized,
    {
        let start = Instant::now();
        let specs = required_settings(command)?;
        tracing::info!("Running '{}' ({} settings)", command, specs.len());

        let installed_version = self.toolchain.install(&self.config.solc_version)?;
        writeln!(out, "{}", installed_version)?;

        let settings = gather_settings(specs, env, prompt, out)?;

        let solc_version = select_version(&self.toolchain, &self.config.solc_version)?;
        tracing::info!("Using solc {}", solc_version);

        let source_path = settings
            .get(TOKEN_CONTRACT_SOURCE)
            .map(PathBuf::from)
            .ok_or_else(|| ManageError::SourceUnreadable {
                path: PathBuf::new(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("{} is not set", TOKEN_CONTRACT_SOURCE),
                ),
            })?;
        let source = read_source(&source_path)?;

        let solc = self.toolchain.binary(&solc_version);
        let artifacts = self.compiler.compile_source(&CompileRequest {
            source: &source,
            solc: &solc,
            version: &solc_version,
            output_values: &self.config.output_values,
            remappings: &self.config.remappings,
        })?;

        let artifact = artifacts.get(&self.config.contract_name)?.clone();
        writeln!(out, "{}", artifact.to_json(self.config.pretty_json)?)?;
        out.flush()?;

        tracing::info!(
            "Compiled {} in {:.2}s",
            self.config.contract_name,
            start.elapsed().as_secs_f64()
        );

        Ok(RunReport {
            command: command.to_string(),
            settings,
            installed_version,
            solc_version,
            compiler_version: artifacts.compiler_version.clone(),
            contract_name: self.config.contract_name.clone(),
            artifact,
        })
    }
}

/// Reads the contract source text
fn read_source(path: &Path) -> Result<String> {
    let source =
        std::fs::read_to_string(path).map_err(|source| ManageError::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!("Read {} bytes from {}", source.len(), path.display());
    Ok(source)
}
