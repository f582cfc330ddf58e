use crate::adapter::javascript::DEFAULT_EXTENSIONS;
use crate::report::ReportFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Contents of `lineage.toml`; every key is optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LineageConfig {
    pub format: Option<ReportFormat>,
    pub show_unresolved: Option<bool>,
    pub show_scopes: Option<bool>,
    /// Extra ignore patterns for directory walks
    pub exclude: Option<Vec<String>>,
    /// File extensions to analyze
    pub extensions: Option<Vec<String>>,
}

impl LineageConfig {
    /// The file `lineage init` writes: every default spelled out
    pub fn with_defaults() -> Self {
        Self {
            format: Some(ReportFormat::Text),
            show_unresolved: Some(true),
            show_scopes: Some(false),
            exclude: Some(Vec::new()),
            extensions: Some(DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()),
        }
    }

    pub fn format(&self) -> ReportFormat {
        self.format.unwrap_or_default()
    }

    pub fn show_unresolved(&self) -> bool {
        self.show_unresolved.unwrap_or(true)
    }

    pub fn show_scopes(&self) -> bool {
        self.show_scopes.unwrap_or(false)
    }

    pub fn exclude(&self) -> &[String] {
        self.exclude.as_deref().unwrap_or(&[])
    }

    pub fn extensions(&self) -> Vec<String> {
        match &self.extensions {
            Some(extensions) if !extensions.is_empty() => extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect(),
            _ => DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("lineage.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<LineageConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: LineageConfig = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &LineageConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("lineage.toml"))).unwrap().is_none());
    }

    #[test]
    fn test_write_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lineage.toml");

        write_config(&path, &LineageConfig::with_defaults(), false).unwrap();
        let loaded = load_config(Some(&path)).unwrap().unwrap();
        assert_eq!(loaded, LineageConfig::with_defaults());
        assert_eq!(loaded.extensions(), vec!["js", "mjs", "cjs", "jsx"]);
    }

    #[test]
    fn test_write_refuses_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lineage.toml");

        write_config(&path, &LineageConfig::default(), false).unwrap();
        assert!(write_config(&path, &LineageConfig::default(), false).is_err());
        assert!(write_config(&path, &LineageConfig::default(), true).is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: LineageConfig = toml::from_str("format = \"json\"\nextensions = [\".es6\"]\n").unwrap();
        assert_eq!(config.format(), ReportFormat::Json);
        assert!(config.show_unresolved());
        assert!(!config.show_scopes());
        assert!(config.exclude().is_empty());
        assert_eq!(config.extensions(), vec!["es6"]);
    }

    #[test]
    fn test_invalid_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lineage.toml");
        std::fs::write(&path, "format = \"yaml\"").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }
}
