//! Settings gathered from the environment or typed at a prompt

use crate::{
    command::SettingSpec,
    error::{ManageError, Result},
};
use serde::Serialize;
use std::io::{BufRead, Write};

/// Printed in place of secret values
pub const SECRET_MASK: &str = "********";

/// Where a setting value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingSource {
    Environment,
    Prompt,
}

/// A single resolved setting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    pub name: String,
    pub value: String,
    pub source: SettingSource,
    pub secret: bool,
}

impl Setting {
    /// Value suitable for console output
    pub fn display_value(&self) -> &str {
        if self.secret {
            SECRET_MASK
        } else {
            &self.value
        }
    }
}

/// Resolved settings for one run, in the order they were requested
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    entries: Vec<Setting>,
}

impl Settings {
    /// Looks up a value by setting name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Setting> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Setting> for Settings {
    fn from_iter<I: IntoIterator<Item = Setting>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Asks the user for a setting value
pub trait Prompt {
    fn prompt(&mut self, name: &str) -> Result<String>;
}

/// Line-based prompt over any reader/writer pair (stdin/stdout in the CLI)
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Everything written so far, prompts included
    pub fn output(&self) -> &W {
        &self.output
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn prompt(&mut self, name: &str) -> Result<String> {
        write!(self.output, "Please enter setting for {}:", name)?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|source| ManageError::Prompt {
                name: name.to_string(),
                source,
            })?;

        if read == 0 {
            return Err(ManageError::PromptClosed {
                name: name.to_string(),
            });
        }

        let trimmed = line.strip_suffix('\n').unwrap_or(&line);
        let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
        Ok(trimmed.to_string())
    }
}

/// Resolves one setting: the environment wins, otherwise the user is asked
///
/// Environment-sourced values are echoed to `out` on their own line, with
/// secrets masked. Prompted values are not echoed again.
pub fn resolve_setting<E, P, W>(
    spec: &SettingSpec,
    env: &E,
    prompt: &mut P,
    out: &mut W,
) -> Result<Setting>
where
    E: Fn(&str) -> Option<String>,
    P: Prompt + ?Sized,
    W: Write + ?Sized,
{
    let (value, source) = match env(spec.name) {
        Some(value) => (value, SettingSource::Environment),
        None => (prompt.prompt(spec.name)?, SettingSource::Prompt),
    };

    let setting = Setting {
        name: spec.name.to_string(),
        value,
        source,
        secret: spec.secret,
    };

    if source == SettingSource::Environment {
        writeln!(out, "{}", setting.display_value())?;
    }
    tracing::debug!("Resolved {} from {:?}", setting.name, setting.source);

    Ok(setting)
}

/// Resolves every setting in `specs`, in order
pub fn gather_settings<E, P, W>(
    specs: &[SettingSpec],
    env: &E,
    prompt: &mut P,
    out: &mut W,
) -> Result<Settings>
where
    E: Fn(&str) -> Option<String>,
    P: Prompt + ?Sized,
    W: Write + ?Sized,
{
    let entries: Vec<Setting> = specs
        .iter()
        .map(|spec| resolve_setting(spec, env, prompt, out))
        .collect::<Result<Vec<_>>>()?;

    Ok(entries.into_iter().collect())
}
