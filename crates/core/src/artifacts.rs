//! Compiled contract artifacts as reported by `solc --combined-json`

use crate::{
    error::{ManageError, Result},
    utils,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha3::{Digest, Keccak256};
use std::collections::BTreeMap;

/// Solidity ABI represented as JSON values
pub type Abi = Vec<Value>;

/// ABI and bytecode of one contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledArtifact {
    pub abi: Abi,
    pub bin: String,
}

/// Every contract in one compiler run, keyed by qualified name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledArtifacts {
    contracts: BTreeMap<String, CompiledArtifact>,
    /// Full compiler version string, when reported
    pub compiler_version: Option<String>,
}

/// Raw `--combined-json` document
#[derive(Debug, Deserialize)]
struct CombinedJson {
    #[serde(default)]
    contracts: BTreeMap<String, RawContract>,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawContract {
    #[serde(default)]
    abi: Option<Value>,
    #[serde(default)]
    bin: Option<String>,
}

impl CompiledArtifacts {
    /// Parses the stdout of `solc --combined-json`
    pub fn from_combined_json(json: &str) -> Result<Self> {
        let raw: CombinedJson =
            serde_json::from_str(json).map_err(|e| ManageError::CompilerOutput(e.to_string()))?;

        let contracts = raw
            .contracts
            .into_iter()
            .map(|(name, contract)| {
                let abi = normalize_abi(&name, contract.abi)?;
                let artifact = CompiledArtifact {
                    abi,
                    bin: contract.bin.unwrap_or_default(),
                };
                Ok((name, artifact))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(Self {
            contracts,
            compiler_version: raw.version,
        })
    }

    /// Looks up a contract by qualified name, e.g. `<stdin>:TokenWrapper`
    pub fn get(&self, name: &str) -> Result<&CompiledArtifact> {
        self.contracts
            .get(name)
            .ok_or_else(|| ManageError::ArtifactNotFound {
                name: name.to_string(),
                available: if self.contracts.is_empty() {
                    "none".to_string()
                } else {
                    self.names().collect::<Vec<_>>().join(", ")
                },
            })
    }

    /// Qualified names of all compiled contracts
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.contracts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

impl FromIterator<(String, CompiledArtifact)> for CompiledArtifacts {
    fn from_iter<I: IntoIterator<Item = (String, CompiledArtifact)>>(iter: I) -> Self {
        Self {
            contracts: iter.into_iter().collect(),
            compiler_version: None,
        }
    }
}

/// Older solc releases emit the ABI as a JSON-encoded string
fn normalize_abi(name: &str, abi: Option<Value>) -> Result<Abi> {
    match abi {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(entries)) => Ok(entries),
        Some(Value::String(encoded)) => serde_json::from_str(&encoded).map_err(|e| {
            ManageError::CompilerOutput(format!("ABI of {} is not valid JSON: {}", name, e))
        }),
        Some(other) => Err(ManageError::CompilerOutput(format!(
            "ABI of {} has unexpected shape: {}",
            name, other
        ))),
    }
}

impl CompiledArtifact {
    /// Renders the artifact as printed on the console
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        json.map_err(|e| ManageError::CompilerOutput(e.to_string()))
    }

    /// Bytecode length in bytes, if `bin` is valid hex
    pub fn bytecode_size(&self) -> Option<usize> {
        hex::decode(self.bin.trim_start_matches("0x"))
            .ok()
            .map(|bytes| bytes.len())
    }

    /// SHA256 of the decoded bytecode, `0x`-prefixed
    pub fn bytecode_hash(&self) -> Option<String> {
        hex::decode(self.bin.trim_start_matches("0x"))
            .ok()
            .map(|bytes| format!("0x{}", utils::hash_bytes(&bytes)))
    }

    /// Function selectors keyed by canonical signature
    pub fn function_selectors(&self) -> BTreeMap<String, String> {
        extract_function_selectors(&self.abi)
    }
}

/// Extract function selectors from ABI
fn extract_function_selectors(abi: &Abi) -> BTreeMap<String, String> {
    let mut selectors = BTreeMap::new();

    for func in abi.iter().filter(|e| e["type"] == "function") {
        if let Some(name) = func["name"].as_str() {
            let types: Vec<String> = func["inputs"]
                .as_array()
                .map(|inputs| inputs.iter().map(canonical_type).collect())
                .unwrap_or_default();

            let signature = format!("{}({})", name, types.join(","));
            let hash = Keccak256::digest(signature.as_bytes());
            let selector = format!("0x{}", hex::encode(&hash[..4]));

            selectors.insert(signature, selector);
        }
    }

    selectors
}

/// Canonical ABI type, expanding tuples into their component types
fn canonical_type(param: &Value) -> String {
    let ty = param["type"].as_str().unwrap_or_default();
    match ty.strip_prefix("tuple") {
        Some(suffix) => {
            let components: Vec<String> = param["components"]
                .as_array()
                .map(|c| c.iter().map(canonical_type).collect())
                .unwrap_or_default();
            format!("({}){}", components.join(","), suffix)
        }
        None => ty.to_string(),
    }
}
