#![allow(missing_docs)]

//! Pricing configuration: ruleset selection and content layout.
//!
//! Values are layered from built-in defaults, a TOML file under the user's
//! config directory (or an explicit path), then `ONEPAGE_POINTS__*`
//! environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::formulas::{Ruleset, RulesetVersion};

/// Directory under the platform config dir holding our files.
pub const CONFIG_DIR: &str = "onepage-points";
/// Configuration file name.
pub const CONFIG_FILE: &str = "config.toml";
/// Prefix of environment overrides, e.g. `ONEPAGE_POINTS__RULESET=unadjusted`.
pub const ENV_PREFIX: &str = "ONEPAGE_POINTS";

const DEFAULT_CONFIG: &str = r#"# Ruleset constants used for pricing: "opr2017" or "unadjusted".
ruleset = "opr2017"

# Directory with equipment shared by every faction.
common_dir = "Common"

# Per-constant overrides applied on top of the ruleset.
[overrides]
# adjust_attack_cost = 0.8
# adjust_defense_cost = 0.8
# defense_quadratic = 1.0
# defense_constant = 6.0
"#;

/// Optional replacements for individual ruleset constants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RulesetOverrides {
    pub adjust_attack_cost: Option<f64>,
    pub adjust_defense_cost: Option<f64>,
    pub defense_quadratic: Option<f64>,
    pub defense_constant: Option<f64>,
}

impl RulesetOverrides {
    pub fn apply(&self, mut ruleset: Ruleset) -> Ruleset {
        if let Some(value) = self.adjust_attack_cost {
            ruleset.adjust_attack_cost = value;
        }
        if let Some(value) = self.adjust_defense_cost {
            ruleset.adjust_defense_cost = value;
        }
        if let Some(value) = self.defense_quadratic {
            ruleset.defense_quadratic = value;
        }
        if let Some(value) = self.defense_constant {
            ruleset.defense_constant = value;
        }
        ruleset
    }
}

/// Settings shared by every faction build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default)]
    pub ruleset: RulesetVersion,
    #[serde(default)]
    pub overrides: RulesetOverrides,
    #[serde(default = "default_common_dir")]
    pub common_dir: PathBuf,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            ruleset: RulesetVersion::default(),
            overrides: RulesetOverrides::default(),
            common_dir: default_common_dir(),
        }
    }
}

fn default_common_dir() -> PathBuf {
    PathBuf::from("Common")
}

impl PricingConfig {
    /// Load from the default location, if any.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path().as_deref())
    }

    /// Load from `path` (missing files are ignored) plus environment overrides.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("failed to assemble pricing configuration")?;
        settings
            .try_deserialize()
            .context("failed to parse pricing configuration")
    }

    /// Constants of the selected version with overrides applied.
    pub fn ruleset(&self) -> Ruleset {
        self.overrides.apply(Ruleset::new(self.ruleset))
    }
}

/// Default configuration file path, e.g. `~/.config/onepage-points/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Write the commented default configuration if no file exists yet.
pub fn ensure_default_config() -> Result<Option<PathBuf>> {
    match config_path() {
        Some(path) => ensure_default_config_at(&path).map(|_| Some(path)),
        None => Ok(None),
    }
}

/// Write the commented default configuration at `path` unless present.
pub fn ensure_default_config_at(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_file_matches_defaults() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("nested").join(CONFIG_FILE);
        ensure_default_config_at(&path)?;
        assert!(path.is_file());

        let config = PricingConfig::load_from(Some(&path))?;
        assert_eq!(config.ruleset, RulesetVersion::Opr2017);
        assert_eq!(config.common_dir, PathBuf::from("Common"));
        assert_eq!(config.ruleset(), Ruleset::new(RulesetVersion::Opr2017));
        Ok(())
    }

    #[test]
    fn reads_version_and_overrides() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "ruleset = \"unadjusted\"\n[overrides]\nadjust_attack_cost = 0.9\n",
        )?;

        let config = PricingConfig::load_from(Some(&path))?;
        let ruleset = config.ruleset();
        assert_eq!(ruleset.version, RulesetVersion::Unadjusted);
        assert_eq!(ruleset.adjust_attack_cost, 0.9);
        assert_eq!(ruleset.adjust_defense_cost, 1.0);
        Ok(())
    }

    #[test]
    fn missing_file_falls_back_to_defaults() -> Result<()> {
        let temp = tempdir()?;
        let config = PricingConfig::load_from(Some(&temp.path().join("absent.toml")))?;
        assert_eq!(config.common_dir, PathBuf::from("Common"));
        Ok(())
    }
}
