//! Site configuration module.
//!
//! Handles loading, validating, and merging `site.toml`. Stock defaults are
//! overridden by the user's file, which only needs the keys it changes.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! api_base = "http://localhost:8000/api"  # CMS API root
//! default_locale = "en"                   # Used when neither ?lang= nor a saved choice exists
//!
//! [http]
//! timeout_secs = 15         # Per-request timeout
//!
//! [parallax]
//! zoom_range = 0.12         # Extra hero zoom at full scroll progress
//! epsilon = 0.001           # Style writes smaller than this are skipped
//! reveal_delay_ms = 900     # Header fade-in delay on first home visit
//!
//! [lightbox]
//! swipe_threshold_px = 40.0 # Minimum horizontal travel for a swipe
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `site.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Root URL of the CMS API.
    pub api_base: String,
    /// Locale used when neither the URL nor a saved preference picks one.
    pub default_locale: String,
    pub http: HttpConfig,
    pub parallax: ParallaxConfig,
    pub lightbox: LightboxConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8000/api".to_string(),
            default_locale: "en".to_string(),
            http: HttpConfig::default(),
            parallax: ParallaxConfig::default(),
            lightbox: LightboxConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base.trim().is_empty() {
            return Err(ConfigError::Validation("api_base must not be empty".into()));
        }
        if crate::i18n::Locale::parse(&self.default_locale).is_none() {
            return Err(ConfigError::Validation(format!(
                "default_locale {:?} must match [a-z0-9-]{{2,12}}",
                self.default_locale
            )));
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "http.timeout_secs must be non-zero".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.parallax.zoom_range) {
            return Err(ConfigError::Validation(
                "parallax.zoom_range must be 0.0-1.0".into(),
            ));
        }
        if !(self.parallax.epsilon.is_finite() && self.parallax.epsilon >= 0.0) {
            return Err(ConfigError::Validation(
                "parallax.epsilon must be a finite, non-negative number".into(),
            ));
        }
        let swipe = self.lightbox.swipe_threshold_px;
        if !(swipe.is_finite() && swipe > 0.0) {
            return Err(ConfigError::Validation(
                "lightbox.swipe_threshold_px must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 15 }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Hero zoom and header reveal tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParallaxConfig {
    /// Extra zoom applied at full scroll progress (`1.0 + zoom_range`).
    pub zoom_range: f64,
    /// Style values closer than this to the last written value are not rewritten.
    pub epsilon: f64,
    /// Delay before the header fades in on the first home visit.
    pub reveal_delay_ms: u64,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            zoom_range: 0.12,
            epsilon: 0.001,
            reveal_delay_ms: 900,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightboxConfig {
    /// Minimum horizontal travel (CSS px) before a touch counts as a swipe.
    pub swipe_threshold_px: f64,
}

impl Default for LightboxConfig {
    fn default() -> Self {
        Self {
            swipe_threshold_px: 40.0,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `site.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file doesn't exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("site.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `site.toml` from `dir`, merged over stock defaults and validated.
pub fn load_config(dir: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(dir)?)
}

/// Returns a fully-commented stock `site.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Studio Site Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Root URL of the CMS API. Every endpoint (content/, pages/{slug}/, ...)
# is resolved under it.
api_base = "http://localhost:8000/api"

# Locale used when neither ?lang= nor a saved preference picks one.
# Lowercase letters, digits and hyphens, 2-12 characters.
default_locale = "en"

# ---------------------------------------------------------------------------
# HTTP
# ---------------------------------------------------------------------------
[http]
# Per-request timeout in seconds.
timeout_secs = 15

# ---------------------------------------------------------------------------
# Hero parallax and header reveal
# ---------------------------------------------------------------------------
[parallax]
# Extra zoom applied to the hero image at full scroll progress.
zoom_range = 0.12

# Style values closer than this to the last written value are skipped.
epsilon = 0.001

# Delay before the header fades in on the first home visit (milliseconds).
reveal_delay_ms = 900

# ---------------------------------------------------------------------------
# Lightbox
# ---------------------------------------------------------------------------
[lightbox]
# Minimum horizontal travel in CSS pixels before a touch counts as a swipe.
swipe_threshold_px = 40.0
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = SiteConfig::default();
        assert_eq!(config.default_locale, "en");
        assert_eq!(config.http.timeout(), Duration::from_secs(15));
        assert_eq!(config.lightbox.swipe_threshold_px, 40.0);
    }

    #[test]
    fn parse_partial_config() {
        let config: SiteConfig = toml::from_str(
            r#"
[parallax]
zoom_range = 0.2
"#,
        )
        .unwrap();
        assert_eq!(config.parallax.zoom_range, 0.2);
        // Defaults preserved
        assert_eq!(config.parallax.epsilon, 0.001);
        assert_eq!(config.default_locale, "en");
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("site.toml"),
            r#"
api_base = "https://cms.example.com/api"
default_locale = "ru"
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.api_base, "https://cms.example.com/api");
        assert_eq!(config.default_locale, "ru");
        assert_eq!(config.http.timeout_secs, 15);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("site.toml"), "api_base = [").unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("api_bsae = \"x\"");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_nested_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[lightbox]\nswipe = 3.0");
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_bad_locale() {
        let config = SiteConfig {
            default_locale: "English!".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = SiteConfig::default();
        config.http.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zoom_out_of_range() {
        let mut config = SiteConfig::default();
        config.parallax.zoom_range = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_nan_thresholds() {
        let mut config = SiteConfig::default();
        config.lightbox.swipe_threshold_px = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = SiteConfig::default();
        config.parallax.epsilon = f64::NAN;
        assert!(config.validate().is_err());

        let overlay: toml::Value = toml::from_str("[lightbox]\nswipe_threshold_px = nan").unwrap();
        assert!(matches!(
            resolve_config(stock_defaults_value(), Some(overlay)),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"].as_integer(), Some(1));
        assert_eq!(merged["b"].as_integer(), Some(3));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base = stock_defaults_value();
        let overlay: toml::Value = toml::from_str("[parallax]\nepsilon = 0.01").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["parallax"]["epsilon"].as_float(), Some(0.01));
        assert_eq!(merged["parallax"]["reveal_delay_ms"].as_integer(), Some(900));
    }

    #[test]
    fn resolve_config_rejects_invalid_values() {
        let overlay: toml::Value = toml::from_str("[http]\ntimeout_secs = 0").unwrap();
        assert!(matches!(
            resolve_config(stock_defaults_value(), Some(overlay)),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config, SiteConfig::default());
    }
}
