// Configuration loader with environment variable substitution

use super::types::*;
use anyhow::{bail, Context, Result};
use regex::Regex;
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file with environment variable substitution
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
        let content = std::fs::read_to_string(path.as_ref())
            .context("Failed to read config file")?;

        Self::load_str(&content)
    }

    /// Parse and validate configuration text
    pub fn load_str(content: &str) -> Result<Config> {
        let content = Self::substitute_env_vars(content);

        let config: Config = serde_yaml::from_str(&content)
            .context("Failed to parse YAML configuration")?;

        Self::validate(&config)?;

        Ok(config)
    }

    /// Substitute ${VAR} and ${VAR:-default} patterns with environment variables
    ///
    /// Examples:
    /// - ${HOME} -> /home/user
    /// - ${BUCKET:-recordings} -> recordings (if BUCKET not set)
    fn substitute_env_vars(content: &str) -> String {
        let re = Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("valid pattern");

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            let default_value = caps.get(2).map(|m| m.as_str());

            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => match default_value {
                    Some(default) => default.to_string(),
                    // Keep original if no default and var not found
                    None => format!("${{{}}}", var_name),
                },
            }
        })
        .to_string()
    }

    /// Validate configuration
    fn validate(config: &Config) -> Result<()> {
        Self::validate_at(config, "")
    }

    fn validate_at(config: &Config, at: &str) -> Result<()> {
        if let Some(value) = config.get(keys::ADAPTER) {
            if value.as_str().is_none() {
                bail!("{}adapter must be a string", at);
            }
        }

        if config.adapter() == "replicate" {
            for key in [keys::SOURCE, keys::REPLICA] {
                match config.get(key) {
                    Some(ConfigValue::Nested(nested)) => {
                        Self::validate_at(nested, &format!("{}{}.", at, key))?
                    }
                    Some(_) => bail!("{}{} must be a mapping", at, key),
                    None => bail!("replicate adapter requires {}{}", at, key),
                }
            }
        }

        Ok(())
    }
}
