use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::{fs::File, io::Read};

use crate::export::DEFAULT_OUTPUT_FILE;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Logging {
    verbosity: Option<String>,
}

impl Logging {
    pub fn verbosity(&self) -> Option<&String> {
        self.verbosity.as_ref()
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Output {
    path: Option<String>,
}

impl Output {
    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or(DEFAULT_OUTPUT_FILE)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    logging: Logging,
    #[serde(default)]
    output: Output,
}

impl std::str::FromStr for Settings {
    type Err = anyhow::Error;
    fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(anyhow::Error::from)
    }
}

impl Settings {
    /// Reads `config_file` if one is given, built-in defaults otherwise.
    pub fn new(config_file: Option<&String>) -> Result<Self> {
        let path = match config_file {
            Some(path) => Path::new(path),
            None => return Ok(Settings::default()),
        };
        let mut content = String::new();
        File::open(path)
            .and_then(|mut f| f.read_to_string(&mut content))
            .with_context(|| format!("Failed to read {}", path.display()))?;
        content
            .parse::<Settings>()
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn logging(&self) -> &Logging {
        &self.logging
    }

    pub fn output(&self) -> &Output {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::str::FromStr;

    use super::*;

    const CONFIG_FULL: &str = r#"
        [logging]
        verbosity = "debug"

        [output]
        path = "/tmp/events.csv"
    "#;

    #[test]
    fn test_settings_full() {
        let s = Settings::from_str(CONFIG_FULL).unwrap();
        assert_eq!(s.logging().verbosity().unwrap(), "debug");
        assert_eq!(s.output().path(), "/tmp/events.csv");
    }

    #[test]
    fn test_settings_empty() {
        let s = Settings::from_str("").unwrap();
        assert!(s.logging().verbosity().is_none());
        assert_eq!(s.output().path(), "ExtractedEvents.csv");
    }

    #[test]
    fn test_settings_unknown_field() {
        assert!(Settings::from_str("[output]\nformat = \"json\"\n").is_err());
        assert!(Settings::from_str("[database]\npath = \"x\"\n").is_err());
    }

    #[test]
    fn test_settings_new_without_file() {
        let s = Settings::new(None).unwrap();
        assert!(s.logging().verbosity().is_none());
        assert_eq!(s.output().path(), DEFAULT_OUTPUT_FILE);
    }

    #[test]
    fn test_settings_new_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[logging]\nverbosity = \"trace\"\n").unwrap();
        let path = file.path().to_string_lossy().to_string();
        let s = Settings::new(Some(&path)).unwrap();
        assert_eq!(s.logging().verbosity().unwrap(), "trace");
        assert_eq!(s.output().path(), DEFAULT_OUTPUT_FILE);
    }

    #[test]
    fn test_settings_new_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml").to_string_lossy().to_string();
        let err = Settings::new(Some(&path)).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read"));
    }
}
