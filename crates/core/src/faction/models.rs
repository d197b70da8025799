#![allow(missing_docs)]

use std::{collections::BTreeMap, fmt};

use serde::{
    de::{self, MapAccess, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};

use crate::{
    armory::Armory,
    context::PricingContext,
    equipment::{Attacks, WarGear, Weapon},
    error::Result,
    rules::SpecialRule,
    unit::Unit,
    upgrade::Upgrade,
};

/// Contents of an `equipments.json` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquipmentFile {
    #[serde(default)]
    pub weapons: BTreeMap<String, WeaponRecord>,
    #[serde(default)]
    pub wargear: BTreeMap<String, WarGearRecord>,
    #[serde(default, rename = "factionRules")]
    pub faction_rules: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponRecord {
    #[serde(default)]
    pub range: u32,
    pub attacks: AttacksRecord,
    #[serde(default)]
    pub ap: f64,
    #[serde(default)]
    pub special: Vec<String>,
}

impl WeaponRecord {
    pub fn to_weapon(&self, name: &str) -> Result<Weapon> {
        Ok(Weapon::new(
            name,
            self.range,
            self.attacks.parse()?,
            self.ap,
            SpecialRule::parse_all(&self.special)?,
        ))
    }
}

/// Attack count as written: a number or dice notation (`"D3"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttacksRecord {
    Count(u32),
    Text(String),
}

impl AttacksRecord {
    pub fn parse(&self) -> Result<Attacks> {
        match self {
            AttacksRecord::Count(count) => Ok(Attacks::Fixed(*count)),
            AttacksRecord::Text(text) => Attacks::parse(text),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WarGearRecord {
    #[serde(default)]
    pub special: Vec<String>,
    #[serde(default)]
    pub weapons: Vec<String>,
    #[serde(default)]
    pub text: String,
}

impl WarGearRecord {
    /// Build the wargear, resolving its bundled weapons through `armory`.
    pub fn to_wargear(&self, name: &str, armory: &Armory) -> Result<WarGear> {
        let weapons = armory
            .get(&self.weapons)?
            .iter()
            .flat_map(|equipment| equipment.weapons().to_vec())
            .collect();
        Ok(WarGear::new(
            name,
            SpecialRule::parse_all(&self.special)?,
            weapons,
            self.text.clone(),
        ))
    }
}

/// One unit entry of a `unitsN.json` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitRecord {
    pub name: String,
    pub count: u32,
    pub quality: u32,
    pub defense: u32,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default, alias = "specialRules")]
    pub special: Vec<String>,
    #[serde(default)]
    pub upgrades: Vec<String>,
}

impl UnitRecord {
    pub fn to_unit(&self, ctx: &PricingContext) -> Result<Unit> {
        Unit::new(
            ctx,
            self.name.clone(),
            self.count,
            self.quality,
            self.defense,
            ctx.armory.get(&self.equipment)?,
            SpecialRule::parse_all(&self.special)?,
        )
    }
}

/// One upgrade line of an `upgradesN.json` group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeRecord {
    pub text: String,
    #[serde(default)]
    pub all: bool,
    #[serde(default, rename = "pre-remove")]
    pub pre_remove: Vec<String>,
    #[serde(default, rename = "pre-add")]
    pub pre_add: Vec<String>,
    #[serde(default)]
    pub remove: Vec<String>,
    pub add: Vec<NameList>,
}

impl UpgradeRecord {
    pub fn to_upgrade(&self, armory: &Armory) -> Result<Upgrade> {
        Ok(Upgrade {
            text: self.text.clone(),
            all: self.all,
            pre_remove: armory.get(&self.pre_remove)?,
            pre_add: armory.get(&self.pre_add)?,
            remove: armory.get(&self.remove)?,
            add: self
                .add
                .iter()
                .map(|candidate| armory.get(candidate.names()))
                .collect::<Result<Vec<_>>>()?,
        })
    }
}

/// An upgrade candidate: one equipment name or several bought together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NameList {
    One(String),
    Many(Vec<String>),
}

impl NameList {
    pub fn names(&self) -> &[String] {
        match self {
            NameList::One(name) => std::slice::from_ref(name),
            NameList::Many(names) => names,
        }
    }
}

/// Upgrade groups of an `upgradesN.json` file, in file order.
#[derive(Debug, Clone, Default)]
pub struct UpgradeFile {
    groups: Vec<(String, Vec<UpgradeRecord>)>,
}

impl UpgradeFile {
    pub fn get(&self, name: &str) -> Option<&[UpgradeRecord]> {
        self.groups
            .iter()
            .find(|(group, _)| group == name)
            .map(|(_, records)| records.as_slice())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[UpgradeRecord])> {
        self.groups
            .iter()
            .map(|(name, records)| (name.as_str(), records.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl Serialize for UpgradeFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.groups.iter().map(|(name, records)| (name, records)))
    }
}

impl<'de> Deserialize<'de> for UpgradeFile {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(UpgradeFileVisitor)
    }
}

struct UpgradeFileVisitor;

impl<'de> Visitor<'de> for UpgradeFileVisitor {
    type Value = UpgradeFile;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of upgrade group names to upgrade lists")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<UpgradeFile, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut file = UpgradeFile::default();
        while let Some((name, records)) = map.next_entry::<String, Vec<UpgradeRecord>>()? {
            if file.contains_key(&name) {
                return Err(de::Error::custom(format!("duplicate upgrade group '{name}'")));
            }
            file.groups.push((name, records));
        }
        Ok(file)
    }
}
