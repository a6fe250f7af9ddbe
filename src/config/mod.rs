// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::watermark::{LoaderConfig, OutputConfig, TextWatermarkConfig};

/// Top-level configuration file.
///
/// Every section is optional; an empty document yields the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub watermark: TextWatermarkConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        let mut substituted = String::with_capacity(yaml.len());
        let mut last = 0;
        for caps in re.captures_iter(yaml) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let value = std::env::var(name.as_str()).map_err(|_| {
                format!(
                    "Environment variable '{}' is referenced but not set",
                    name.as_str()
                )
            })?;
            substituted.push_str(&yaml[last..whole.start()]);
            substituted.push_str(&value);
            last = whole.end();
        }
        substituted.push_str(&yaml[last..]);

        // serde_yaml reads an empty document as null
        if substituted.trim().is_empty() {
            return Ok(Config::default());
        }

        serde_yaml::from_str(&substituted).map_err(|e| e.to_string())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.watermark.validate()?;
        self.output.validate()?;
        self.loader.validate()?;
        Ok(())
    }
}
