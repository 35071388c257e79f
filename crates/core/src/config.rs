//! Configuration types for compiling the contract

use semver::Version;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Qualified name of the contract printed after compilation
pub const DEFAULT_CONTRACT_NAME: &str = "<stdin>:TokenWrapper";

/// Main configuration for a run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManageConfig {
    /// Qualified contract name looked up in the compiler output
    pub contract_name: String,

    /// Which solc release to install and use
    pub solc_version: SolcVersionRequest,

    /// Outputs requested from the compiler
    pub output_values: Vec<OutputValue>,

    /// Import remappings passed to the compiler
    pub remappings: Vec<Remapping>,

    /// Whether to pretty-print the artifact JSON
    pub pretty_json: bool,
}

/// Solc release selection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SolcVersionRequest {
    /// Newest published release
    Latest,
    /// A specific release
    Exact(Version),
}

/// Compiler output selection, as understood by `--combined-json`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputValue {
    Abi,
    Bin,
}

/// Import remapping in the `prefix=path` form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Remapping {
    pub prefix: String,
    pub path: String,
}

impl Default for ManageConfig {
    fn default() -> Self {
        Self {
            contract_name: DEFAULT_CONTRACT_NAME.to_string(),
            solc_version: SolcVersionRequest::Latest,
            output_values: vec![OutputValue::Abi, OutputValue::Bin],
            remappings: vec![Remapping::new("@openzeppelin", "../openzeppelin-contracts")],
            pretty_json: false,
        }
    }
}

impl ManageConfig {
    /// Create a new builder for ManageConfig
    pub fn builder() -> ManageConfigBuilder {
        ManageConfigBuilder::default()
    }
}

impl OutputValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputValue::Abi => "abi",
            OutputValue::Bin => "bin",
        }
    }
}

impl Remapping {
    pub fn new(prefix: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for Remapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.prefix, self.path)
    }
}

impl FromStr for Remapping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((prefix, path)) if !prefix.is_empty() && !path.is_empty() => {
                Ok(Remapping::new(prefix, path))
            }
            _ => Err(format!("Invalid remapping '{}', expected prefix=path", s)),
        }
    }
}

impl fmt::Display for SolcVersionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolcVersionRequest::Latest => f.write_str("latest"),
            SolcVersionRequest::Exact(version) => write!(f, "{}", version),
        }
    }
}

impl FromStr for SolcVersionRequest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("latest") {
            return Ok(SolcVersionRequest::Latest);
        }

        Version::parse(s.trim_start_matches('v'))
            .map(SolcVersionRequest::Exact)
            .map_err(|e| format!("Invalid solc version '{}': {}", s, e))
    }
}

/// Builder for creating ManageConfig with a fluent API
#[derive(Default)]
pub struct ManageConfigBuilder {
    config: ManageConfig,
}

impl ManageConfigBuilder {
    /// Set the qualified contract name to print
    pub fn contract_name(mut self, name: impl Into<String>) -> Self {
        self.config.contract_name = name.into();
        self
    }

    /// Set the solc release to use
    pub fn solc_version(mut self, request: SolcVersionRequest) -> Self {
        self.config.solc_version = request;
        self
    }

    /// Add an import remapping
    pub fn remapping(mut self, remapping: Remapping) -> Self {
        self.config.remappings.push(remapping);
        self
    }

    /// Set whether to pretty-print JSON
    pub fn pretty_json(mut self, pretty: bool) -> Self {
        self.config.pretty_json = pretty;
        self
    }

    pub fn build(self) -> ManageConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ManageConfig::default();
        assert_eq!(config.contract_name, "<stdin>:TokenWrapper");
        assert_eq!(config.solc_version, SolcVersionRequest::Latest);
        assert_eq!(config.output_values, vec![OutputValue::Abi, OutputValue::Bin]);
        assert_eq!(config.remappings.len(), 1);
        assert_eq!(
            config.remappings[0].to_string(),
            "@openzeppelin=../openzeppelin-contracts"
        );
        assert!(!config.pretty_json);
    }

    #[test]
    fn test_builder() {
        let config = ManageConfig::builder()
            .contract_name("<stdin>:Other")
            .solc_version("0.8.19".parse().unwrap())
            .pretty_json(true)
            .build();

        assert_eq!(config.contract_name, "<stdin>:Other");
        assert_eq!(
            config.solc_version,
            SolcVersionRequest::Exact(Version::new(0, 8, 19))
        );
        assert!(config.pretty_json);
    }

    #[test]
    fn test_version_request_parsing() {
        assert_eq!(
            "latest".parse::<SolcVersionRequest>().unwrap(),
            SolcVersionRequest::Latest
        );
        assert_eq!(
            "v0.8.24".parse::<SolcVersionRequest>().unwrap(),
            SolcVersionRequest::Exact(Version::new(0, 8, 24))
        );
        assert!("0.8".parse::<SolcVersionRequest>().is_err());
    }

    #[test]
    fn test_remapping_parsing() {
        let remapping: Remapping = "@oz=lib/oz".parse().unwrap();
        assert_eq!(remapping, Remapping::new("@oz", "lib/oz"));
        assert!("no-equals".parse::<Remapping>().is_err());
        assert!("=path".parse::<Remapping>().is_err());
    }
}
