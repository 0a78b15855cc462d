use std::path::Path;

use crate::config::schema::{DelayRange, SimulatorConfig};
use crate::error::ConfigError;

/// Serialization format of a config document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Some(ConfigFormat::Json),
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Some(ConfigFormat::Yaml)
            }
            _ => None,
        }
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SimulatorConfig, ConfigError> {
    let path = path.as_ref();
    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content, format)
}

pub fn load_config_from_str(
    content: &str,
    format: ConfigFormat,
) -> Result<SimulatorConfig, ConfigError> {
    let config: SimulatorConfig = match format {
        ConfigFormat::Json => serde_json::from_str(content)?,
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
    };

    validate_config(&config)?;

    Ok(config)
}

pub fn validate_config(config: &SimulatorConfig) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.tick_interval_ms == 0 {
        return Err(ConfigError::Validation {
            message: "tick_interval_ms must be greater than zero".to_string(),
        });
    }

    if !(config.upload_increment_max.is_finite() && config.upload_increment_max > 0.0) {
        return Err(ConfigError::Validation {
            message: format!(
                "upload_increment_max must be a finite positive number, got {}",
                config.upload_increment_max
            ),
        });
    }

    validate_range("handoff_delay_ms", &config.handoff_delay_ms)?;
    validate_range("processing_delay_ms", &config.processing_delay_ms)?;

    if config.max_active_uploads == Some(0) {
        return Err(ConfigError::Validation {
            message: "max_active_uploads must be at least 1 when set".to_string(),
        });
    }

    if config.accepted_mime_types.is_empty() {
        return Err(ConfigError::Validation {
            message: "accepted_mime_types must not be empty".to_string(),
        });
    }
    for mime in &config.accepted_mime_types {
        let valid = mime
            .split_once('/')
            .is_some_and(|(top, sub)| (top == "audio" || top == "video") && !sub.is_empty());
        if !valid {
            return Err(ConfigError::Validation {
                message: format!("accepted MIME type '{}' is not an audio or video type", mime),
            });
        }
    }

    Ok(())
}

fn validate_range(name: &str, range: &DelayRange) -> Result<(), ConfigError> {
    if range.min > range.max {
        return Err(ConfigError::Validation {
            message: format!("{name}: min ({}) is greater than max ({})", range.min, range.max),
        });
    }
    Ok(())
}
