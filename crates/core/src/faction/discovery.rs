#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;
use walkdir::WalkDir;

use super::loader::EQUIPMENT_FILE;

/// Finds faction directories beneath a content root.
pub struct FactionDiscovery;

impl FactionDiscovery {
    /// Immediate subdirectories of `root` holding an `equipments.json`, sorted by name.
    ///
    /// `skip` names directories that only hold shared content (e.g. `Common`).
    pub fn discover(root: impl AsRef<Path>, skip: Option<&Path>) -> Result<Vec<PathBuf>> {
        let root = root.as_ref();
        let mut factions = Vec::new();
        for entry in WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry =
                entry.with_context(|| format!("failed to scan {}", root.display()))?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let path = entry.path();
            if skip.is_some_and(|skip| same_dir(skip, path)) {
                continue;
            }
            if !path.join(EQUIPMENT_FILE).is_file() {
                warn!("Skipping {}: missing {}", path.display(), EQUIPMENT_FILE);
                continue;
            }
            factions.push(path.to_path_buf());
        }
        Ok(factions)
    }
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
