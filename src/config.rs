use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::payload::RecommendationSettings;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub consumer_unit: ConsumerUnitConfig,
    #[serde(default)]
    pub recommendation: RecommendationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConsumerUnitConfig {
    #[serde(default)]
    pub default_id: Option<u64>,
}

/// Fallbacks for the backend's recommendation settings, used when the
/// settings fetch fails or a file source is in play.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    #[serde(default = "default_minimum_energy_bills")]
    pub minimum_energy_bills: u32,
    #[serde(default = "default_ideal_energy_bills")]
    pub ideal_energy_bills: u32,
    #[serde(default = "default_minimum_percentage_difference")]
    pub minimum_percentage_difference: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub consumer_unit: Option<u64>,
    pub api_url: Option<String>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/mepa-report/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(consumer_unit) = overrides.consumer_unit {
            self.consumer_unit.default_id = Some(consumer_unit);
        }
        if let Some(api_url) = overrides.api_url {
            self.api.base_url = api_url;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    /// Local settings used when the backend's settings endpoint is
    /// unavailable.
    pub fn fallback_settings(&self) -> RecommendationSettings {
        RecommendationSettings {
            minimum_energy_bills_for_recommendation: self.recommendation.minimum_energy_bills,
            ideal_energy_bills_for_recommendation: self.recommendation.ideal_energy_bills,
            minimum_percentage_difference_for_contract_renovation: self
                .recommendation
                .minimum_percentage_difference,
        }
    }

    pub fn default_template() -> String {
        let template = r#"[api]
base_url = "http://localhost:8000"

[consumer_unit]
# default_id = 1

[recommendation]
minimum_energy_bills = 6
ideal_energy_bills = 12
minimum_percentage_difference = 5.0
"#;
        template.to_string()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            minimum_energy_bills: default_minimum_energy_bills(),
            ideal_energy_bills: default_ideal_energy_bills(),
            minimum_percentage_difference: default_minimum_percentage_difference(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_minimum_energy_bills() -> u32 {
    6
}

fn default_ideal_energy_bills() -> u32 {
    12
}

fn default_minimum_percentage_difference() -> f64 {
    5.0
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn template_parses_back_into_defaults() {
        let parsed: Config = toml::from_str(&Config::default_template()).expect("template");
        assert_eq!(parsed.api.base_url, "http://localhost:8000");
        assert_eq!(parsed.recommendation.minimum_energy_bills, 6);
        let settings = parsed.fallback_settings();
        assert_eq!(settings.ideal_energy_bills_for_recommendation, 12);
    }
}
