//! Configuration management for question-pills

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::disclosure::{PresentationMode, DEFAULT_HOVER_GRACE};
use crate::template::{library, Template, TemplateDef};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub widget: WidgetConfig,
    /// Question templates; the built-in library is used when empty
    pub templates: Vec<TemplateDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Answer service base URL, without the `/chat` suffix
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 60,
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub presentation: PresentationMode,
    /// Hover pills: delay before a panel closes after the pointer leaves it
    pub hover_grace_ms: u64,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            presentation: PresentationMode::Inline,
            hover_grace_ms: DEFAULT_HOVER_GRACE.as_millis() as u64,
        }
    }
}

impl WidgetConfig {
    pub fn hover_grace(&self) -> Duration {
        Duration::from_millis(self.hover_grace_ms)
    }
}

impl Config {
    /// Load configuration from the default location, or defaults if absent
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        // Surface template problems at load time, not when the page mounts.
        config.templates()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise the default location
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::load(),
        }
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "question-pills") {
            let config_dir = proj_dirs.config_dir();
            std::fs::create_dir_all(config_dir)?;
            Ok(config_dir.join("config.toml"))
        } else {
            Ok(PathBuf::from("config.toml"))
        }
    }

    /// Save configuration to an explicit file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("writing config {}", path.display()))?;
        Ok(())
    }

    /// Validated templates: the configured ones, or the built-in library
    pub fn templates(&self) -> Result<Vec<Template>> {
        if self.templates.is_empty() {
            return library::builtin().context("built-in templates");
        }
        self.templates
            .iter()
            .enumerate()
            .map(|(idx, def)| {
                def.clone().validate().with_context(|| {
                    format!(
                        "template #{} ({})",
                        idx + 1,
                        def.title.as_deref().unwrap_or("untitled")
                    )
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.widget.presentation, PresentationMode::Inline);
        assert_eq!(config.widget.hover_grace(), Duration::from_millis(140));
        assert_eq!(config.service.timeout(), Duration::from_secs(60));
        assert_eq!(config.templates().unwrap().len(), 3);
    }

    #[test]
    fn test_load_partial_file() {
        let file = write_config(
            r#"
[widget]
presentation = "popup"
hover_grace_ms = 250

[service]
base_url = "https://answers.example.com"
"#,
        );
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.widget.presentation, PresentationMode::Popup);
        assert_eq!(config.widget.hover_grace_ms, 250);
        assert_eq!(config.service.base_url, "https://answers.example.com");
        assert_eq!(config.service.timeout_secs, 60);
    }

    #[test]
    fn test_load_templates_from_file() {
        let file = write_config(
            r#"
[[templates]]
title = "Metric drivers"
fragments = [
    "What are the top ",
    { key = "metric", options = ["Net Revenue", "Volume"], default = "Volume" },
    " drivers?",
]
"#,
        );
        let config = Config::load_from(file.path()).unwrap();
        let templates = config.templates().unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].slot("metric").unwrap().default_value(), "Volume");
    }

    #[test]
    fn test_invalid_template_fails_load() {
        let file = write_config(
            r#"
[[templates]]
title = "Broken"
fragments = [{ key = "metric", options = [] }]
"#,
        );
        let err = Config::load_from(file.path()).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("template #1 (Broken)"), "{}", message);
        assert!(message.contains("has no options"), "{}", message);
    }

    #[test]
    fn test_unknown_presentation_rejected() {
        let file = write_config("[widget]\npresentation = \"carousel\"\n");
        assert!(Config::load_from(file.path()).is_err());
    }

    #[test]
    fn test_save_to_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.widget.presentation = PresentationMode::Popup;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.widget.presentation, PresentationMode::Popup);
        assert_eq!(loaded.service.base_url, "http://127.0.0.1:8000");
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let mut config = Config::default();
        config.templates = library::builtin_defs();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.templates, config.templates);
    }
}
