use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::ui::theme::ThemeName;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: ThemeName,
    /// Initial volume, 0.0 to 1.0.
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_volume() -> f32 {
    1.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: ThemeName::default(),
            volume: default_volume(),
        }
    }
}

fn get_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not find config directory")?
        .join("millibel");

    Ok(config_dir.join("config.yml"))
}

pub fn load_or_create_config() -> Result<Config> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let default_config = Config::default();
        let yaml =
            serde_yaml::to_string(&default_config).context("Failed to serialize default config")?;

        fs::write(&config_path, yaml).context("Failed to write default config file")?;

        return Ok(default_config);
    }

    let config_content = fs::read_to_string(&config_path).context("Failed to read config file")?;

    let mut config: Config =
        serde_yaml::from_str(&config_content).context("Failed to parse config file")?;
    config.volume = config.volume.clamp(0.0, 1.0);

    Ok(config)
}
