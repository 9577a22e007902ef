//! # Preferences Store
//!
//! Line-oriented `KEY=value` (or `KEY value`) file. Lines starting with `#`
//! and blank lines are ignored. Keys match exactly; the first occurrence wins.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

pub const DEFAULT_EDITOR: &str = "DEFAULT_EDITOR";
pub const DEFAULT_VIEWER: &str = "DEFAULT_VIEWER";
pub const MAX_BACKUP_FILES: &str = "MAX_BACKUP_FILES";
pub const KEEP_ON_HOST_UNREACHABLE: &str = "KEEP_ON_HOST_UNREACHABLE";
pub const IP_TEST: &str = "IP_TEST";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    entries: HashMap<String, String>,
}

impl Preferences {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(
                path.display().to_string(),
                format!("failed to open preferences file: {e}"),
            )
        })?;
        Ok(Self::parse(&content))
    }

    pub fn parse(content: &str) -> Self {
        let mut entries = HashMap::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = match line.find(|c: char| c == '=' || c.is_whitespace()) {
                Some(idx) => {
                    let value = line[idx..].trim_start();
                    let value = value.strip_prefix('=').unwrap_or(value);
                    (&line[..idx], value.trim())
                }
                None => (line, ""),
            };

            entries
                .entry(key.to_string())
                .or_insert_with(|| value.to_string());
        }

        Self { entries }
    }

    /// Raw value for `key`. An empty value counts as missing.
    pub fn get(&self, key: &str) -> Result<&str> {
        match self.entries.get(key).map(String::as_str) {
            Some("") => Err(Error::config(key, "key found but value is missing")),
            Some(value) => Ok(value),
            None => Err(Error::config(key, "key not found")),
        }
    }

    pub fn get_bool(&self, key: &str) -> Result<bool> {
        let value = self.get(key)?;
        parse_bool(value)
            .ok_or_else(|| Error::config(key, format!("`{value}` is not a valid boolean")))
    }

    /// Retention bound for the backup directory.
    pub fn max_backup_files(&self) -> Result<usize> {
        let value = self.entries.get(MAX_BACKUP_FILES).map(String::as_str).unwrap_or("");
        value
            .parse::<usize>()
            .map_err(|_| Error::RetentionConfig(value.to_string()))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
