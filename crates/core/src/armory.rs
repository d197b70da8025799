#![allow(missing_docs)]

//! Equipment catalog and name resolution.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use tracing::{debug, warn};

use crate::{
    equipment::Equipment,
    error::{PricingError, Result},
};

static QUANTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)x\s+(.+)$").expect("failed to compile quantity regex"));

/// Catalog of every weapon and wargear known to a faction.
///
/// Entries are immutable once registered and shared by reference with the
/// units that carry them. Plural spellings (`"Laser Rifles"`) are resolved
/// lazily and cached. Derived `Linked` variants give way to an explicitly
/// registered weapon of the same name, whatever the registration order.
#[derive(Debug, Default)]
pub struct Armory {
    entries: HashMap<String, Arc<Equipment>>,
    derived: HashSet<String>,
    plurals: RwLock<HashMap<String, Arc<Equipment>>>,
}

impl Armory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register equipment. Ranged weapons also register a `Linked` variant.
    pub fn add(&mut self, equipment: impl Into<Equipment>) -> Result<()> {
        let equipment = equipment.into();
        let name = equipment.name().to_string();
        if self.entries.contains_key(&name) {
            if !self.derived.remove(&name) {
                return Err(PricingError::DuplicateEquipment { name });
            }
            debug!("Replacing derived {} with the catalog entry", name);
            self.plurals.get_mut().clear();
        }

        let linked = match &equipment {
            Equipment::Weapon(weapon) if weapon.is_ranged() => Some(weapon.linked_variant()),
            _ => None,
        };

        self.entries.insert(name, Arc::new(equipment));

        if let Some(linked) = linked {
            if self.entries.contains_key(&linked.name) {
                warn!("Keeping existing entry for {}", linked.name);
            } else {
                self.derived.insert(linked.name.clone());
                self.entries
                    .insert(linked.name.clone(), Arc::new(Equipment::Weapon(linked)));
            }
        }
        Ok(())
    }

    /// Register several entries, stopping at the first duplicate.
    pub fn add_all<I, E>(&mut self, equipment: I) -> Result<()>
    where
        I: IntoIterator<Item = E>,
        E: Into<Equipment>,
    {
        equipment.into_iter().try_for_each(|entry| self.add(entry))
    }

    /// Resolve name tokens, expanding quantity prefixes (`"2x Laser Rifle"`).
    pub fn get<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Vec<Arc<Equipment>>> {
        let mut resolved = Vec::with_capacity(tokens.len());
        for token in tokens {
            let token = token.as_ref().trim();
            let (count, name) = split_quantity(token);
            let equipment = self.get_one(name)?;
            resolved.extend(std::iter::repeat(equipment).take(count));
        }
        Ok(resolved)
    }

    /// Resolve a single name, falling back to its singular form.
    pub fn get_one(&self, name: &str) -> Result<Arc<Equipment>> {
        if let Some(entry) = self.entries.get(name) {
            return Ok(Arc::clone(entry));
        }
        if let Some(entry) = self.plurals.read().get(name) {
            return Ok(Arc::clone(entry));
        }

        let singular = name
            .strip_suffix('s')
            .and_then(|singular| self.entries.get(singular))
            .ok_or_else(|| PricingError::UnresolvedEquipmentName {
                name: name.to_string(),
            })?;

        let mut plurals = self.plurals.write();
        let entry = plurals
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!("Materialized {} from {}", name, singular.name());
                Arc::new(singular.renamed(name))
            });
        Ok(Arc::clone(entry))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn split_quantity(token: &str) -> (usize, &str) {
    QUANTITY_RE
        .captures(token)
        .and_then(|caps| {
            let count = caps.get(1)?.as_str().parse::<usize>().ok()?;
            let name = caps.get(2)?.as_str().trim();
            Some((count, name))
        })
        .unwrap_or((1, token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        equipment::{Attacks, WarGear, Weapon},
        rules::SpecialRule,
    };

    fn laser_rifle() -> Weapon {
        Weapon::new("Laser Rifle", 24, Attacks::Fixed(1), 0.0, Vec::new())
    }

    fn armory() -> Result<Armory> {
        let mut armory = Armory::new();
        armory.add(laser_rifle())?;
        armory.add(Weapon::new("Sword", 0, Attacks::Fixed(2), 0.0, Vec::new()))?;
        armory.add(WarGear::new(
            "Shield",
            vec![SpecialRule::Defense(1)],
            Vec::new(),
            "",
        ))?;
        Ok(armory)
    }

    #[test]
    fn expands_quantities_to_shared_entries() -> Result<()> {
        let armory = armory()?;
        let resolved = armory.get(&["2x Laser Rifle"])?;
        assert_eq!(resolved.len(), 2);
        let single = armory.get_one("Laser Rifle")?;
        assert!(resolved.iter().all(|entry| Arc::ptr_eq(entry, &single)));
        Ok(())
    }

    #[test]
    fn derives_linked_variants_for_ranged_weapons_only() -> Result<()> {
        let armory = armory()?;
        let linked = armory.get_one("Linked Laser Rifle")?;
        let Equipment::Weapon(weapon) = linked.as_ref() else {
            panic!("linked variant is not a weapon");
        };
        let base = laser_rifle();
        assert_eq!(weapon.range, base.range);
        assert_eq!(weapon.attacks, base.attacks);
        assert_eq!(weapon.armor_piercing, base.armor_piercing);
        assert_eq!(weapon.rules, vec![SpecialRule::Linked]);
        assert!(!armory.contains("Linked Sword"));
        assert!(!armory.contains("Linked Shield"));
        Ok(())
    }

    #[test]
    fn rejects_duplicates() -> Result<()> {
        let mut armory = armory()?;
        let err = armory.add(laser_rifle()).unwrap_err();
        assert_eq!(
            err,
            PricingError::DuplicateEquipment {
                name: "Laser Rifle".to_string()
            }
        );
        Ok(())
    }

    #[test]
    fn explicit_linked_weapons_win_in_either_order() -> Result<()> {
        let explicit = Weapon::new(
            "Linked Laser Rifle",
            24,
            Attacks::Fixed(2),
            1.0,
            vec![SpecialRule::Linked],
        );

        let mut base_first = Armory::new();
        base_first.add(laser_rifle())?;
        base_first.add(explicit.clone())?;

        let mut linked_first = Armory::new();
        linked_first.add(explicit.clone())?;
        linked_first.add(laser_rifle())?;

        for armory in [&base_first, &linked_first] {
            let entry = armory.get_one("Linked Laser Rifle")?;
            assert_eq!(entry.as_ref(), &Equipment::Weapon(explicit.clone()));
        }

        // A second explicit entry is still a duplicate.
        let err = base_first.add(explicit).unwrap_err();
        assert_eq!(
            err,
            PricingError::DuplicateEquipment {
                name: "Linked Laser Rifle".to_string()
            }
        );
        Ok(())
    }

    #[test]
    fn resolves_plurals_once() -> Result<()> {
        let armory = armory()?;
        let first = armory.get_one("Laser Rifles")?;
        let second = armory.get_one("Laser Rifles")?;
        assert_eq!(first.name(), "Laser Rifles");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(armory.get(&["3x Swords"])?.len(), 3);
        Ok(())
    }

    #[test]
    fn reports_unknown_names() -> Result<()> {
        let armory = armory()?;
        let err = armory.get(&["Laser Rifle", "Plasma Cannon"]).unwrap_err();
        assert_eq!(
            err,
            PricingError::UnresolvedEquipmentName {
                name: "Plasma Cannon".to_string()
            }
        );
        Ok(())
    }
}
