/// Application configuration
///
/// Loaded from `<config_dir>/visionary-capture/config.toml`:
/// - Linux: ~/.config/visionary-capture/config.toml
/// - macOS: ~/Library/Application Support/visionary-capture/config.toml
/// - Windows: %APPDATA%\visionary-capture\config.toml
///
/// Every key is optional. Environment variables override the file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_PIXEL_RATIO: f32 = 2.5;
const DEFAULT_FILE_NAME: &str = "visionary-capture.png";
const DEFAULT_TOAST_SECS: u64 = 4;

/// Which of the two products to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    /// Capture library with AI redaction and text extraction
    #[default]
    Library,
    /// Code screenshot composer with AI code explanation
    Composer,
}

impl Product {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "library" => Some(Product::Library),
            "composer" => Some(Product::Composer),
            _ => None,
        }
    }
}

/// Model service settings
#[derive(Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
        }
    }
}

// Keep the key out of logs
impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Composer export settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Oversampling factor of the exported PNG
    pub pixel_ratio: f32,
    /// Default name of the downloaded file
    pub file_name: String,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            pixel_ratio: DEFAULT_PIXEL_RATIO,
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub timeout_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TOAST_SECS,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub product: Product,
    pub gateway: GatewayConfig,
    pub composer: ComposerConfig,
    pub notifications: NotificationConfig,
}

impl AppConfig {
    /// Get the path where the config file is looked up
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir().or_else(dirs::home_dir)?;
        path.push("visionary-capture");
        path.push("config.toml");
        Some(path)
    }

    /// Load the config file (a missing file means defaults), then apply
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config = match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: Arc::new(e),
        })?;
        Self::from_toml(&text, path)
    }

    fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: Arc::new(e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(value) = lookup("VISIONARY_PRODUCT") {
            self.product = Product::parse(&value).ok_or_else(|| ConfigError::Invalid {
                key: "VISIONARY_PRODUCT",
                reason: format!("expected `library` or `composer`, got `{}`", value),
            })?;
        }

        if let Some(key) = lookup("GEMINI_API_KEY").or_else(|| lookup("GOOGLE_API_KEY")) {
            if !key.trim().is_empty() {
                self.gateway.api_key = Some(key.trim().to_string());
            }
        }

        if let Some(model) = lookup("VISIONARY_MODEL") {
            self.gateway.model = model;
        }

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.composer.pixel_ratio > 1.0) || !self.composer.pixel_ratio.is_finite() {
            return Err(ConfigError::Invalid {
                key: "composer.pixel_ratio",
                reason: format!("must be greater than 1.0, got {}", self.composer.pixel_ratio),
            });
        }
        if self.composer.file_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "composer.file_name",
                reason: "must not be empty".to_string(),
            });
        }
        if self.gateway.model.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "gateway.model",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = AppConfig::from_toml("", Path::new("config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.product, Product::Library);
        assert_eq!(config.composer.pixel_ratio, 2.5);
        assert_eq!(config.composer.file_name, "visionary-capture.png");
    }

    #[test]
    fn test_partial_file() {
        let text = r#"
            product = "composer"

            [gateway]
            model = "gemini-1.5-pro"

            [composer]
            file_name = "code-snippet.png"
        "#;
        let config = AppConfig::from_toml(text, Path::new("config.toml")).unwrap();

        assert_eq!(config.product, Product::Composer);
        assert_eq!(config.gateway.model, "gemini-1.5-pro");
        assert_eq!(config.gateway.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.composer.file_name, "code-snippet.png");
        assert_eq!(config.composer.pixel_ratio, 2.5);
    }

    #[test]
    fn test_rejects_pixel_ratio_not_above_one() {
        let result = AppConfig::from_toml("[composer]\npixel_ratio = 1.0", Path::new("config.toml"));
        assert!(matches!(result, Err(ConfigError::Invalid { key: "composer.pixel_ratio", .. })));
    }

    #[test]
    fn test_rejects_unknown_product() {
        let result = AppConfig::from_toml("product = \"spreadsheet\"", Path::new("config.toml"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::default()
            .with_env(env(&[
                ("VISIONARY_PRODUCT", "Composer"),
                ("GOOGLE_API_KEY", "fallback"),
                ("VISIONARY_MODEL", "gemini-test"),
            ]))
            .unwrap();
        assert_eq!(config.product, Product::Composer);
        assert_eq!(config.gateway.api_key.as_deref(), Some("fallback"));
        assert_eq!(config.gateway.model, "gemini-test");

        let config = AppConfig::default()
            .with_env(env(&[("GEMINI_API_KEY", "primary"), ("GOOGLE_API_KEY", "fallback")]))
            .unwrap();
        assert_eq!(config.gateway.api_key.as_deref(), Some("primary"));
    }

    #[test]
    fn test_env_rejects_bad_product() {
        let result = AppConfig::default().with_env(env(&[("VISIONARY_PRODUCT", "both")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let gateway = GatewayConfig {
            api_key: Some("secret-key".to_string()),
            ..GatewayConfig::default()
        };
        assert!(!format!("{:?}", gateway).contains("secret-key"));
    }
}
