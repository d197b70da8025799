#![allow(missing_docs)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use tracing::info;

use super::models::{EquipmentFile, UnitRecord, UpgradeFile};

/// Catalog file expected in every faction directory.
pub const EQUIPMENT_FILE: &str = "equipments.json";

/// Suffixes of the `unitsN.json` / `upgradesN.json` pairs, in build order.
const ROSTER_SUFFIXES: [&str; 6] = ["", "1", "2", "3", "4", "5"];

/// Raw content of one faction, as read from disk.
#[derive(Debug, Clone)]
pub struct FactionSource {
    pub name: String,
    pub path: PathBuf,
    /// Shared catalog registered before the faction's own equipment.
    pub common: Option<EquipmentFile>,
    pub equipment: EquipmentFile,
    pub rosters: Vec<RosterSource>,
}

/// A units file and the upgrade groups they reference.
#[derive(Debug, Clone)]
pub struct RosterSource {
    pub units_file: String,
    pub upgrades_file: String,
    pub units: Vec<UnitRecord>,
    pub upgrades: UpgradeFile,
}

/// Reads faction directories into [`FactionSource`] values.
#[derive(Debug, Clone, Default)]
pub struct FactionLoader {
    common_dir: Option<PathBuf>,
}

impl FactionLoader {
    pub fn new(common_dir: Option<PathBuf>) -> Self {
        Self { common_dir }
    }

    pub fn common_dir(&self) -> Option<&Path> {
        self.common_dir.as_deref()
    }

    pub fn load(&self, path: impl AsRef<Path>) -> Result<FactionSource> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(anyhow!("faction directory missing: {}", path.display()));
        }
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow!("failed to determine faction name for {}", path.display()))?
            .to_string();

        let common = match &self.common_dir {
            Some(dir) if dir.join(EQUIPMENT_FILE).is_file() => {
                Some(read_json::<EquipmentFile>(&dir.join(EQUIPMENT_FILE))?)
            }
            _ => None,
        };
        let equipment = read_json::<EquipmentFile>(&path.join(EQUIPMENT_FILE))?;

        let mut rosters = Vec::new();
        for suffix in ROSTER_SUFFIXES {
            let units_file = format!("units{suffix}.json");
            let upgrades_file = format!("upgrades{suffix}.json");
            let units_path = path.join(&units_file);
            let upgrades_path = path.join(&upgrades_file);
            if !units_path.is_file() || !upgrades_path.is_file() {
                continue;
            }
            rosters.push(RosterSource {
                units: read_json(&units_path)?,
                upgrades: read_json(&upgrades_path)?,
                units_file,
                upgrades_file,
            });
        }

        if rosters.is_empty() {
            return Err(anyhow!(
                "no units/upgrades file pair found in {}",
                path.display()
            ));
        }

        Ok(FactionSource {
            name,
            path: path.to_path_buf(),
            common,
            equipment,
            rosters,
        })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    info!("Processing {}", path.display());
    let contents =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}
