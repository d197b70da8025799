#![allow(missing_docs)]

//! Priced records handed to renderers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{context::PricingContext, equipment::Equipment, formulas::RulesetVersion, unit::Unit};

/// Identical equipment collapsed into one line (`2x Laser Rifle`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentEntry {
    pub count: usize,
    pub name: String,
    /// Profile text such as `(24", A1, AP(1))`; empty for plain wargear.
    pub profile: String,
}

impl EquipmentEntry {
    /// Label with a quantity prefix when more than one is carried.
    pub fn label(&self) -> String {
        if self.count < 2 {
            self.name.clone()
        } else {
            format!("{}x {}", self.count, self.name)
        }
    }
}

/// Group equipment by name, keeping first-seen order.
pub fn group_equipment(equipment: &[Arc<Equipment>]) -> Vec<EquipmentEntry> {
    let mut entries: Vec<EquipmentEntry> = Vec::new();
    for item in equipment {
        match entries.iter_mut().find(|entry| entry.name == item.name()) {
            Some(entry) => entry.count += 1,
            None => entries.push(EquipmentEntry {
                count: 1,
                name: item.name().to_string(),
                profile: item.profile(),
            }),
        }
    }
    entries
}

/// A unit with its final price and cost breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricedUnit {
    pub name: String,
    pub count: u32,
    pub quality: u32,
    pub defense: u32,
    pub equipment: Vec<EquipmentEntry>,
    pub special_rules: Vec<String>,
    pub upgrades: Vec<String>,
    pub attack_cost: i64,
    pub defense_cost: i64,
    pub other_cost: i64,
    pub faction_cost: i64,
    /// Points to pay for the unit, faction surcharges included.
    pub cost: i64,
}

impl PricedUnit {
    pub fn new(ctx: &PricingContext, unit: &Unit, upgrades: Vec<String>) -> Self {
        let faction_cost = unit.faction_cost(ctx);
        Self {
            name: unit.name().to_string(),
            count: unit.count(),
            quality: unit.quality(),
            defense: unit.base_defense(),
            equipment: group_equipment(unit.equipment()),
            special_rules: unit.special_rules().iter().map(ToString::to_string).collect(),
            upgrades,
            attack_cost: unit.attack_cost(),
            defense_cost: unit.defense_cost(),
            other_cost: unit.other_cost(),
            faction_cost,
            cost: unit.cost() + faction_cost,
        }
    }

    /// Replace the rule labels, e.g. with the spelling used in content files.
    pub fn with_special_rules(mut self, rules: impl IntoIterator<Item = String>) -> Self {
        self.special_rules = rules.into_iter().collect();
        self
    }
}

/// One purchasable option of an upgrade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricedCandidate {
    pub equipment: Vec<EquipmentEntry>,
    pub cost: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricedUpgrade {
    pub text: String,
    pub candidates: Vec<PricedCandidate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricedUpgradeGroup {
    pub name: String,
    /// Units the price was amortized over.
    pub units: Vec<String>,
    pub upgrades: Vec<PricedUpgrade>,
}

/// Priced content of one `unitsN.json` / `upgradesN.json` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricedRoster {
    pub units_file: String,
    pub upgrades_file: String,
    pub units: Vec<PricedUnit>,
    pub upgrade_groups: Vec<PricedUpgradeGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricedFaction {
    pub name: String,
    pub ruleset: RulesetVersion,
    pub rosters: Vec<PricedRoster>,
    pub generated_at: DateTime<Utc>,
}

impl PricedFaction {
    pub fn units(&self) -> impl Iterator<Item = &PricedUnit> {
        self.rosters.iter().flat_map(|roster| roster.units.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::{Attacks, WarGear, Weapon};

    #[test]
    fn groups_repeated_equipment_in_order() {
        let rifle = Arc::new(Equipment::from(Weapon::new(
            "Laser Rifle",
            24,
            Attacks::Fixed(1),
            0.0,
            Vec::new(),
        )));
        let shield = Arc::new(Equipment::from(WarGear::new(
            "Shield",
            Vec::new(),
            Vec::new(),
            "",
        )));
        let entries = group_equipment(&[rifle.clone(), shield, rifle]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].label(), "2x Laser Rifle");
        assert_eq!(entries[0].profile, "(24\", A1)");
        assert_eq!(entries[1].label(), "Shield");
        assert_eq!(entries[1].profile, "");
    }
}
