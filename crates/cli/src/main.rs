//! CLI for the token-manage library
//!
//! Gathers deployment settings and compiles the TokenWrapper contract.
//! Run as `manage <command>` or through a symlink named after the command.

use clap::Parser;
use eyre::{Context, Result};
use serde::Serialize;
use std::{collections::BTreeMap, io};
use token_manage::{
    config::DEFAULT_CONTRACT_NAME, normalize_args, LinePrompt, ManageConfig, ManageError,
    Remapping, RunReport, Runner, SettingSource, Solc, SolcVersionRequest, SvmToolchain,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Compile the TokenWrapper contract and print its ABI and bytecode
#[derive(Parser, Debug)]
#[command(name = "manage")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Command to run (known: deploy)
    command: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all logging except errors
    #[arg(short, long)]
    quiet: bool,

    /// Output a single JSON summary to stdout
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    compile: CompileSettings,
}

/// Compiler settings
#[derive(Parser, Debug, Clone)]
struct CompileSettings {
    /// solc release to install and use: `latest` or an exact version
    #[arg(long, default_value = "latest")]
    solc_version: SolcVersionRequest,

    /// Qualified name of the contract to print
    #[arg(long, default_value = DEFAULT_CONTRACT_NAME)]
    contract: String,

    /// Additional import remapping, may be repeated
    #[arg(long = "remap", value_name = "PREFIX=PATH")]
    remappings: Vec<Remapping>,

    /// Pretty-print the artifact JSON
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status")]
enum Output {
    #[serde(rename = "success")]
    Success {
        command: String,
        contract_name: String,
        solc_version: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        compiler_version: Option<String>,
        abi: token_manage::Abi,
        bin: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        bytecode_size: Option<usize>,
        #[serde(skip_serializing_if = "Option::is_none")]
        bytecode_hash: Option<String>,
        function_selectors: BTreeMap<String, String>,
        settings: BTreeMap<String, SettingSource>,
    },

    #[serde(rename = "error")]
    Error { error_type: String, message: String },
}

impl From<RunReport> for Output {
    fn from(report: RunReport) -> Self {
        Output::Success {
            bytecode_size: report.artifact.bytecode_size(),
            bytecode_hash: report.artifact.bytecode_hash(),
            function_selectors: report.artifact.function_selectors(),
            settings: report
                .settings
                .iter()
                .map(|s| (s.name.clone(), s.source))
                .collect(),
            command: report.command,
            contract_name: report.contract_name,
            solc_version: report.solc_version.to_string(),
            compiler_version: report.compiler_version,
            abi: report.artifact.abi,
            bin: report.artifact.bin,
        }
    }
}

fn main() {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    // Initialize logging
    let log_level = if cli.quiet {
        LevelFilter::ERROR
    } else if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let json = cli.json;
    if let Err(e) = run(cli) {
        output_error(e, json);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = ManageConfig::builder()
        .contract_name(cli.compile.contract)
        .solc_version(cli.compile.solc_version)
        .pretty_json(cli.compile.pretty);
    for remapping in cli.compile.remappings {
        config = config.remapping(remapping);
    }

    let runner = Runner::new(config.build(), SvmToolchain::new(), Solc::new());
    let env = |name: &str| std::env::var_os(name).map(|v| v.to_string_lossy().into_owned());
    let stdin = io::stdin().lock();

    if cli.json {
        // Prompts go to stderr so stdout stays a single JSON document
        let mut prompt = LinePrompt::new(stdin, io::stderr());
        let report = runner
            .run(&cli.command, &env, &mut prompt, &mut io::sink())
            .wrap_err_with(|| format!("Command '{}' failed", cli.command))?;

        println!("{}", serde_json::to_string(&Output::from(report))?);
    } else {
        let mut prompt = LinePrompt::new(stdin, io::stdout());
        runner
            .run(&cli.command, &env, &mut prompt, &mut io::stdout())
            .wrap_err_with(|| format!("Command '{}' failed", cli.command))?;
    }

    Ok(())
}

fn error_type(error: &eyre::Report) -> &'static str {
    error
        .downcast_ref::<ManageError>()
        .map(ManageError::kind)
        .unwrap_or("unknown_error")
}

fn output_error(error: eyre::Report, json: bool) {
    if !json {
        eprintln!("Error: {:?}", error);
        return;
    }

    let output = Output::Error {
        error_type: error_type(&error).to_string(),
        message: format!("{:#}", error),
    };

    match serde_json::to_string(&output) {
        Ok(line) => eprintln!("{}", line),
        Err(_) => eprintln!("Error: {:?}", error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use token_manage::{CompiledArtifact, Setting, Settings, Version};

    fn args(list: &[&str]) -> Vec<OsString> {
        normalize_args(list.iter().map(OsString::from))
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(args(&["manage", "deploy"]));
        assert_eq!(cli.command, "deploy");
        assert!(!cli.json);
        assert_eq!(cli.compile.solc_version, SolcVersionRequest::Latest);
        assert_eq!(cli.compile.contract, "<stdin>:TokenWrapper");
        assert!(cli.compile.remappings.is_empty());

        let cli = Cli::parse_from(args(&["manage", "--verbose", "undeploy"]));
        assert_eq!(cli.command, "undeploy");
        assert!(cli.verbose);
    }

    #[test]
    fn test_symlink_invocation() {
        let cli = Cli::parse_from(args(&["/usr/local/bin/deploy", "--json", "-q"]));
        assert_eq!(cli.command, "deploy");
        assert!(cli.json);
        assert!(cli.quiet);
    }

    #[test]
    fn test_compile_settings() {
        let cli = Cli::parse_from(args(&[
            "manage",
            "deploy",
            "--solc-version",
            "0.8.19",
            "--contract",
            "<stdin>:Token",
            "--remap",
            "@uniswap=../uniswap",
            "--pretty",
        ]));

        assert_eq!(
            cli.compile.solc_version,
            SolcVersionRequest::Exact(Version::new(0, 8, 19))
        );
        assert_eq!(cli.compile.contract, "<stdin>:Token");
        assert_eq!(
            cli.compile.remappings,
            vec![Remapping::new("@uniswap", "../uniswap")]
        );
        assert!(cli.compile.pretty);
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(Cli::try_parse_from(args(&["manage"])).is_err());
        assert!(Cli::try_parse_from(args(&["manage", "deploy", "--solc-version", "0.8"])).is_err());
        assert!(Cli::try_parse_from(args(&["manage", "deploy", "--remap", "nothing"])).is_err());
    }

    #[test]
    fn test_error_type_through_context() {
        let error = eyre::Report::new(ManageError::UnknownCommand {
            command: "undeploy".to_string(),
            known: "deploy".to_string(),
        })
        .wrap_err("Command 'undeploy' failed");
        assert_eq!(error_type(&error), "configuration_error");

        assert_eq!(error_type(&eyre::eyre!("boom")), "unknown_error");
    }

    #[test]
    fn test_success_output_shape() {
        let settings: Settings = [
            ("TOKEN_CONTRACT_SOURCE", "TokenWrapper.sol", SettingSource::Environment, false),
            ("TOKEN_CONTRACT_OWNER_ADDR", "0xaa", SettingSource::Prompt, false),
            ("TOKEN_CONTRACT_OWNER_SECRET", "owner-secret", SettingSource::Environment, true),
        ]
        .into_iter()
        .map(|(name, value, source, secret)| Setting {
            name: name.to_string(),
            value: value.to_string(),
            source,
            secret,
        })
        .collect();

        let report = RunReport {
            command: "deploy".to_string(),
            settings,
            installed_version: Version::new(0, 8, 26),
            solc_version: Version::new(0, 8, 26),
            compiler_version: Some("0.8.26+commit.8a97fa7a.Linux.g++".to_string()),
            contract_name: "<stdin>:TokenWrapper".to_string(),
            artifact: CompiledArtifact {
                abi: vec![serde_json::json!({
                    "type": "function",
                    "name": "pause",
                    "inputs": []
                })],
                bin: "6080".to_string(),
            },
        };

        let json = serde_json::to_value(Output::from(report)).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["command"], "deploy");
        assert_eq!(json["solc_version"], "0.8.26");
        assert_eq!(json["compiler_version"], "0.8.26+commit.8a97fa7a.Linux.g++");
        assert_eq!(json["bin"], "6080");
        assert_eq!(json["bytecode_size"], 2);
        assert_eq!(json["function_selectors"]["pause()"], "0x8456cb59");
        assert_eq!(json["settings"]["TOKEN_CONTRACT_OWNER_ADDR"], "prompt");
        assert_eq!(json["settings"]["TOKEN_CONTRACT_OWNER_SECRET"], "environment");
        assert!(!json.to_string().contains("owner-secret"));
    }

    #[test]
    fn test_error_output_shape() {
        let output = Output::Error {
            error_type: "input_error".to_string(),
            message: "Failed to read contract source".to_string(),
        };
        let json = serde_json::to_value(output).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error_type"], "input_error");
    }
}
