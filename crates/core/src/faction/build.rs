#![allow(missing_docs)]

use chrono::Utc;
use tracing::info;

use crate::{
    armory::Armory,
    context::{FactionRules, PricingContext},
    error::{FactionError, PricingError},
    formulas::Ruleset,
    models::{
        group_equipment, PricedCandidate, PricedFaction, PricedRoster, PricedUnit, PricedUpgrade,
        PricedUpgradeGroup,
    },
    unit::Unit,
    upgrade::UpgradeGroup,
};

use super::{
    loader::{FactionSource, RosterSource, EQUIPMENT_FILE},
    models::EquipmentFile,
};

type BuildResult<T> = std::result::Result<T, FactionError>;

/// Prices every unit and upgrade of a loaded faction.
#[derive(Debug, Clone, Copy, Default)]
pub struct FactionBuilder {
    ruleset: Ruleset,
}

impl FactionBuilder {
    pub fn new(ruleset: Ruleset) -> Self {
        Self { ruleset }
    }

    pub fn build(&self, source: &FactionSource) -> BuildResult<PricedFaction> {
        info!("Building faction {} ({})", source.name, self.ruleset.version);
        let ctx = self.context(source)?;

        let rosters = source
            .rosters
            .iter()
            .map(|roster| price_roster(&ctx, &source.name, roster))
            .collect::<BuildResult<Vec<_>>>()?;

        let faction = PricedFaction {
            name: source.name.clone(),
            ruleset: self.ruleset.version,
            rosters,
            generated_at: Utc::now(),
        };
        info!(
            "Priced {} units for {}",
            faction.units().count(),
            faction.name
        );
        Ok(faction)
    }

    /// Catalog and faction rules: shared weapons, then faction weapons, then wargear.
    pub fn context(&self, source: &FactionSource) -> BuildResult<PricingContext> {
        let faction = source.name.as_str();
        let mut armory = Armory::new();

        if let Some(common) = &source.common {
            register_weapons(&mut armory, common).map_err(|(subject, err)| {
                FactionError::new(faction, format!("Common/{EQUIPMENT_FILE}"), subject, err)
            })?;
        }
        register_weapons(&mut armory, &source.equipment)
            .map_err(|(subject, err)| FactionError::new(faction, EQUIPMENT_FILE, subject, err))?;

        for (name, record) in &source.equipment.wargear {
            record
                .to_wargear(name, &armory)
                .and_then(|gear| armory.add(gear))
                .map_err(|err| {
                    FactionError::new(faction, EQUIPMENT_FILE, format!("wargear {name}"), err)
                })?;
        }

        Ok(PricingContext::new(
            self.ruleset,
            armory,
            FactionRules::new(
                source
                    .equipment
                    .faction_rules
                    .iter()
                    .map(|(name, cost)| (name.as_str(), *cost)),
            ),
        ))
    }
}

fn register_weapons(
    armory: &mut Armory,
    file: &EquipmentFile,
) -> std::result::Result<(), (String, PricingError)> {
    for (name, record) in &file.weapons {
        record
            .to_weapon(name)
            .and_then(|weapon| armory.add(weapon))
            .map_err(|err| (format!("weapon {name}"), err))?;
    }
    Ok(())
}

fn price_roster(
    ctx: &PricingContext,
    faction: &str,
    roster: &RosterSource,
) -> BuildResult<PricedRoster> {
    let units_error = |subject: &str, err: PricingError| {
        FactionError::new(faction, &roster.units_file, format!("unit {subject}"), err)
    };
    let upgrades_error = |subject: String, err: PricingError| {
        FactionError::new(faction, &roster.upgrades_file, subject, err)
    };

    let units = roster
        .units
        .iter()
        .map(|record| record.to_unit(ctx).map_err(|err| units_error(&record.name, err)))
        .collect::<BuildResult<Vec<Unit>>>()?;

    for record in &roster.units {
        if let Some(group) = record
            .upgrades
            .iter()
            .find(|group| !roster.upgrades.contains_key(*group))
        {
            return Err(units_error(
                &record.name,
                PricingError::UpgradeGroupUnitMismatch {
                    group: group.clone(),
                    unit: record.name.clone(),
                },
            ));
        }
    }

    let mut upgrade_groups = Vec::with_capacity(roster.upgrades.len());
    for (group_name, records) in roster.upgrades.iter() {
        let upgrades = records
            .iter()
            .map(|record| {
                record
                    .to_upgrade(&ctx.armory)
                    .map_err(|err| upgrades_error(format!("{group_name} / {}", record.text), err))
            })
            .collect::<BuildResult<Vec<_>>>()?;
        let group = UpgradeGroup::new(group_name, upgrades);

        // Every unit record listing the group counts, even when names repeat.
        let affected = units
            .iter()
            .zip(&roster.units)
            .filter(|(_, record)| record.upgrades.iter().any(|name| name == group_name))
            .map(|(unit, _)| unit)
            .collect::<Vec<_>>();

        let mut priced = Vec::with_capacity(group.upgrades.len());
        for upgrade in &group.upgrades {
            let costs = group
                .upgrade_cost(ctx, upgrade, &affected)
                .map_err(|err| upgrades_error(format!("{group_name} / {}", upgrade.text), err))?;
            priced.push(PricedUpgrade {
                text: upgrade.text.clone(),
                candidates: upgrade
                    .add
                    .iter()
                    .zip(costs)
                    .map(|(equipment, cost)| PricedCandidate {
                        equipment: group_equipment(equipment),
                        cost,
                    })
                    .collect(),
            });
        }

        upgrade_groups.push(PricedUpgradeGroup {
            name: group.name.clone(),
            units: affected.iter().map(|unit| unit.name().to_string()).collect(),
            upgrades: priced,
        });
    }

    let priced_units = units
        .iter()
        .zip(&roster.units)
        .map(|(unit, record)| {
            PricedUnit::new(ctx, unit, record.upgrades.clone())
                .with_special_rules(record.special.iter().map(|tag| tag.trim().to_string()))
        })
        .collect();

    Ok(PricedRoster {
        units_file: roster.units_file.clone(),
        upgrades_file: roster.upgrades_file.clone(),
        units: priced_units,
        upgrade_groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faction::models::{EquipmentFile, UnitRecord, UpgradeFile};
    use std::path::PathBuf;

    const EQUIPMENT: &str = r#"{
        "weapons": {
            "Pulse Rifle": { "range": 30, "attacks": 1, "ap": 1 },
            "Plasma Rifle": { "range": 24, "attacks": 1, "ap": 3 },
            "Gatling": { "range": 18, "attacks": 4, "ap": 1 }
        },
        "wargear": {
            "Banner": { "special": ["Blessed"] }
        },
        "factionRules": { "Blessed": 5, "Psychic(1)": 10 }
    }"#;

    fn source(units: &str, upgrades: &str) -> anyhow::Result<FactionSource> {
        source_with(EQUIPMENT, units, upgrades)
    }

    fn source_with(
        equipment: &str,
        units: &str,
        upgrades: &str,
    ) -> anyhow::Result<FactionSource> {
        let equipment: EquipmentFile = serde_json::from_str(equipment)?;
        let units: Vec<UnitRecord> = serde_json::from_str(units)?;
        let upgrades: UpgradeFile = serde_json::from_str(upgrades)?;
        Ok(FactionSource {
            name: "Tao".to_string(),
            path: PathBuf::from("Tao"),
            common: None,
            equipment,
            rosters: vec![RosterSource {
                units_file: "units.json".to_string(),
                upgrades_file: "upgrades.json".to_string(),
                units,
                upgrades,
            }],
        })
    }

    const UNITS: &str = r#"[
        { "name": "Grunts", "count": 5, "quality": 5, "defense": 4,
          "equipment": ["Pulse Rifle"], "special": ["Good Shot"], "upgrades": ["A"] },
        { "name": "Captain", "count": 1, "quality": 3, "defense": 4,
          "equipment": ["Pulse Rifle"], "special": ["Tough(3)", "Hero", "Volley Fire"], "upgrades": ["A"] }
    ]"#;

    #[test]
    fn prices_a_faction() -> anyhow::Result<()> {
        let source = source(
            UNITS,
            r#"{ "A": [ { "text": "Replace one Pulse Rifle", "remove": ["Pulse Rifle"],
                          "add": ["Plasma Rifle", "Gatling"] } ] }"#,
        )?;
        let faction = FactionBuilder::default().build(&source)?;
        let roster = &faction.rosters[0];

        let grunts = &roster.units[0];
        assert_eq!(grunts.equipment[0].label(), "Pulse Rifle");
        assert_eq!(grunts.cost, 71);
        assert_eq!(roster.units[1].cost, 67);

        let group = &roster.upgrade_groups[0];
        assert_eq!(group.units, vec!["Grunts".to_string(), "Captain".to_string()]);
        let costs = group.upgrades[0]
            .candidates
            .iter()
            .map(|candidate| candidate.cost)
            .collect::<Vec<_>>();
        assert_eq!(costs, vec![2, 16]);
        Ok(())
    }

    #[test]
    fn locates_unknown_equipment() -> anyhow::Result<()> {
        let source = source(
            UNITS,
            r#"{ "A": [ { "text": "Take a cannon", "add": ["Cannon"] } ] }"#,
        )?;
        let err = FactionBuilder::default().build(&source).unwrap_err();
        assert_eq!(err.faction, "Tao");
        assert_eq!(err.file, "upgrades.json");
        assert_eq!(err.subject, "A / Take a cannon");
        assert_eq!(
            err.source,
            PricingError::UnresolvedEquipmentName {
                name: "Cannon".to_string()
            }
        );
        Ok(())
    }

    #[test]
    fn rejects_unknown_groups_and_unused_groups() -> anyhow::Result<()> {
        let missing = source(UNITS, "{}")?;
        let err = FactionBuilder::default().build(&missing).unwrap_err();
        assert_eq!(err.file, "units.json");
        assert!(matches!(
            err.source,
            PricingError::UpgradeGroupUnitMismatch { ref group, .. } if group == "A"
        ));

        let unused = source(
            UNITS,
            r#"{ "A": [ { "text": "Banner", "all": true, "add": ["Banner"] } ],
                 "B": [ { "text": "Banner", "add": ["Banner"] } ] }"#,
        )?;
        let err = FactionBuilder::default().build(&unused).unwrap_err();
        assert_eq!(err.subject, "B / Banner");
        assert_eq!(
            err.source,
            PricingError::EmptyAmortizationSet {
                group: "B".to_string()
            }
        );
        Ok(())
    }

    #[test]
    fn reports_malformed_rules_on_the_unit() -> anyhow::Result<()> {
        let source = source(
            r#"[{ "name": "Brute", "count": 1, "quality": 4, "defense": 4, "special": ["Tough(x)"] }]"#,
            "{}",
        )?;
        let err = FactionBuilder::default().build(&source).unwrap_err();
        assert_eq!(err.subject, "unit Brute");
        assert!(matches!(err.source, PricingError::MalformedSpecialTag { .. }));
        Ok(())
    }

    #[test]
    fn prices_every_unit_record_sharing_a_name() -> anyhow::Result<()> {
        let source = source(
            r#"[
                { "name": "Grunts", "count": 5, "quality": 5, "defense": 4,
                  "equipment": ["Pulse Rifle"], "special": ["Good Shot"], "upgrades": ["A"] },
                { "name": "Grunts", "count": 1, "quality": 3, "defense": 4,
                  "equipment": ["Pulse Rifle"], "special": ["Tough(3)", "Volley Fire"], "upgrades": ["A"] }
            ]"#,
            r#"{ "A": [ { "text": "Replace one Pulse Rifle", "remove": ["Pulse Rifle"],
                          "add": ["Plasma Rifle", "Gatling"] } ] }"#,
        )?;
        let faction = FactionBuilder::default().build(&source)?;
        let group = &faction.rosters[0].upgrade_groups[0];
        assert_eq!(group.units, vec!["Grunts".to_string(), "Grunts".to_string()]);
        let costs = group.upgrades[0]
            .candidates
            .iter()
            .map(|candidate| candidate.cost)
            .collect::<Vec<_>>();
        assert_eq!(costs, vec![2, 16]);
        Ok(())
    }

    #[test]
    fn keeps_upgrade_groups_in_file_order() -> anyhow::Result<()> {
        let source = source(
            r#"[{ "name": "Grunts", "count": 5, "quality": 5, "defense": 4,
                  "equipment": ["Pulse Rifle"], "upgrades": ["Z", "A"] }]"#,
            r#"{ "Z": [ { "text": "Banner", "all": true, "add": ["Banner"] } ],
                 "A": [ { "text": "Plasma", "remove": ["Pulse Rifle"], "add": ["Plasma Rifle"] } ] }"#,
        )?;
        let faction = FactionBuilder::default().build(&source)?;
        let names = faction.rosters[0]
            .upgrade_groups
            .iter()
            .map(|group| group.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Z", "A"]);
        Ok(())
    }

    #[test]
    fn explicit_linked_weapons_load_in_any_order() -> anyhow::Result<()> {
        // "Autocannon" sorts before its linked name, "Zapper" after it.
        let equipment = r#"{
            "weapons": {
                "Autocannon": { "range": 36, "attacks": 2, "ap": 1 },
                "Linked Autocannon": { "range": 36, "attacks": 3, "ap": 1, "special": ["Linked"] },
                "Zapper": { "range": 12, "attacks": 1 },
                "Linked Zapper": { "range": 12, "attacks": 2, "special": ["Linked"] }
            }
        }"#;
        let units = r#"[{ "name": "Gunners", "count": 1, "quality": 4, "defense": 4,
                          "equipment": ["Linked Autocannon", "Linked Zapper"] }]"#;
        let source = source_with(equipment, units, "{}")?;
        let ctx = FactionBuilder::default().context(&source)?;
        for (name, attacks) in [("Linked Autocannon", 3), ("Linked Zapper", 2)] {
            let entry = ctx.armory.get_one(name)?;
            let weapon = &entry.weapons()[0];
            assert_eq!(weapon.attacks, crate::equipment::Attacks::Fixed(attacks));
        }
        FactionBuilder::default().build(&source)?;
        Ok(())
    }

    #[test]
    fn surcharges_valued_rules_and_keeps_their_spelling() -> anyhow::Result<()> {
        let source = source(
            r#"[
                { "name": "Seer", "count": 1, "quality": 4, "defense": 4, "special": ["Psychic+1"] },
                { "name": "Adept", "count": 1, "quality": 4, "defense": 4, "special": ["Psychic(2)"] }
            ]"#,
            "{}",
        )?;
        let faction = FactionBuilder::default().build(&source)?;
        let units = &faction.rosters[0].units;
        assert_eq!(units[0].special_rules, vec!["Psychic+1".to_string()]);
        assert_eq!(units[0].faction_cost, 10);
        assert_eq!(units[1].faction_cost, 0);
        Ok(())
    }
}
