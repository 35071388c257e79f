//! Command resolution and the command-to-settings table

use crate::error::{ManageError, Result};
use std::{ffi::OsString, path::Path};

/// Name of the multi-command binary. Any other invocation name is a command.
pub const GENERIC_NAME: &str = "manage";

/// Path to the contract source file
pub const TOKEN_CONTRACT_SOURCE: &str = "TOKEN_CONTRACT_SOURCE";
/// Address of the contract owner
pub const TOKEN_CONTRACT_OWNER_ADDR: &str = "TOKEN_CONTRACT_OWNER_ADDR";
/// Secret key of the contract owner
pub const TOKEN_CONTRACT_OWNER_SECRET: &str = "TOKEN_CONTRACT_OWNER_SECRET";

/// A setting a command requires before it can run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingSpec {
    /// Environment variable name, also used as the prompt label
    pub name: &'static str,
    /// Secret values are never echoed back
    pub secret: bool,
}

impl SettingSpec {
    const fn plain(name: &'static str) -> Self {
        Self {
            name,
            secret: false,
        }
    }

    const fn secret(name: &'static str) -> Self {
        Self { name, secret: true }
    }
}

/// Required settings per command, in prompt order
pub const SETTING_MAP: &[(&str, &[SettingSpec])] = &[(
    "deploy",
    &[
        SettingSpec::plain(TOKEN_CONTRACT_SOURCE),
        SettingSpec::plain(TOKEN_CONTRACT_OWNER_ADDR),
        SettingSpec::secret(TOKEN_CONTRACT_OWNER_SECRET),
    ],
)];

/// Returns the settings a command requires
pub fn required_settings(command: &str) -> Result<&'static [SettingSpec]> {
    SETTING_MAP
        .iter()
        .find(|(name, _)| *name == command)
        .map(|(_, settings)| *settings)
        .ok_or_else(|| ManageError::UnknownCommand {
            command: command.to_string(),
            known: known_commands().join(", "),
        })
}

/// Lists every command in the settings table
pub fn known_commands() -> Vec<&'static str> {
    SETTING_MAP.iter().map(|(name, _)| *name).collect()
}

/// Extracts the name the process was started under
///
/// Only the file name counts, and the platform executable suffix is dropped,
/// so `/usr/local/bin/deploy` and `deploy.exe` both give `deploy`.
pub fn invocation_name(argv0: &Path) -> String {
    let name = argv0
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let suffix = std::env::consts::EXE_SUFFIX;
    match name.strip_suffix(suffix) {
        Some(stripped) if !suffix.is_empty() => stripped.to_string(),
        _ => name,
    }
}

/// Rewrites process arguments so the command is always the first positional
///
/// Under the generic name the arguments pass through unchanged. Under any
/// other name (a symlink or alias such as `deploy`) that name becomes the
/// command, placed right after a synthetic `manage` program name.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter();
    let Some(argv0) = args.next() else {
        return vec![OsString::from(GENERIC_NAME)];
    };

    let invoked = invocation_name(Path::new(&argv0));
    if invoked == GENERIC_NAME || invoked.is_empty() {
        return std::iter::once(argv0).chain(args).collect();
    }

    tracing::debug!("Invoked as '{}', using it as the command", invoked);
    [OsString::from(GENERIC_NAME), OsString::from(invoked)]
        .into_iter()
        .chain(args)
        .collect()
}
