#![allow(missing_docs)]

//! Units and their three-part point cost.
//!
//! A [`Unit`] keeps its raw profile (count, quality, defense, equipment and
//! special rules) together with a [`UnitProfile`] derived from it. Every
//! mutation re-derives the whole profile, so costs are never stale.

use std::{fmt, sync::Arc};

use tracing::debug;

use crate::{
    context::PricingContext,
    equipment::{Attacks, Equipment, Weapon},
    error::{PricingError, Result},
    formulas::{quality_defense_factor, round_points, Ruleset, BASE_SPEED},
    rules::SpecialRule,
};

/// Values derived from a unit's rules and equipment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnitProfile {
    pub speed: f64,
    pub defense: f64,
    pub toughness: f64,
    pub attack_quality: f64,
    pub defense_quality: f64,
    pub global_add: f64,
    pub global_multiplier: f64,
    pub passengers: u32,
    /// Weapons every model has without carrying them, e.g. a monster's stomp.
    pub innate: Vec<Weapon>,
    pub attack_cost: i64,
    pub defense_cost: i64,
    pub other_cost: i64,
    pub cost: i64,
}

/// A unit entry of a roster.
#[derive(Debug, Clone)]
pub struct Unit {
    name: String,
    count: u32,
    quality: u32,
    base_defense: u32,
    equipment: Vec<Arc<Equipment>>,
    special_rules: Vec<SpecialRule>,
    profile: UnitProfile,
}

impl Unit {
    pub fn new(
        ctx: &PricingContext,
        name: impl Into<String>,
        count: u32,
        quality: u32,
        defense: u32,
        equipment: Vec<Arc<Equipment>>,
        special_rules: Vec<SpecialRule>,
    ) -> Result<Self> {
        let name = name.into();
        if count == 0 {
            return Err(PricingError::InvalidUnitCount { unit: name });
        }
        let mut unit = Self {
            name,
            count,
            quality,
            base_defense: defense,
            equipment,
            special_rules,
            profile: UnitProfile::default(),
        };
        unit.update(&ctx.ruleset);
        Ok(unit)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn quality(&self) -> u32 {
        self.quality
    }

    pub fn base_defense(&self) -> u32 {
        self.base_defense
    }

    pub fn equipment(&self) -> &[Arc<Equipment>] {
        &self.equipment
    }

    pub fn special_rules(&self) -> &[SpecialRule] {
        &self.special_rules
    }

    pub fn profile(&self) -> &UnitProfile {
        &self.profile
    }

    pub fn attack_cost(&self) -> i64 {
        self.profile.attack_cost
    }

    pub fn defense_cost(&self) -> i64 {
        self.profile.defense_cost
    }

    pub fn other_cost(&self) -> i64 {
        self.profile.other_cost
    }

    /// Cost before faction surcharges.
    pub fn cost(&self) -> i64 {
        self.profile.cost
    }

    /// Own special rules followed by the rules granted by wargear.
    pub fn effective_rules(&self) -> impl Iterator<Item = &SpecialRule> {
        self.special_rules.iter().chain(
            self.equipment
                .iter()
                .flat_map(|equipment| equipment.granted_rules()),
        )
    }

    /// Faction surcharge for the rules this unit owns.
    pub fn faction_cost(&self, ctx: &PricingContext) -> i64 {
        ctx.faction_rules.surcharge(self.effective_rules())
    }

    /// Cost including faction surcharges.
    pub fn total_cost(&self, ctx: &PricingContext) -> i64 {
        self.cost() + self.faction_cost(ctx)
    }

    pub fn add_equipments(&mut self, ctx: &PricingContext, equipment: &[Arc<Equipment>]) {
        self.equipment.extend(equipment.iter().cloned());
        self.update(&ctx.ruleset);
    }

    /// Remove one carried item per entry. Leaves the unit untouched on error.
    pub fn remove_equipments(
        &mut self,
        ctx: &PricingContext,
        equipment: &[Arc<Equipment>],
    ) -> Result<()> {
        let mut remaining = self.equipment.clone();
        for item in equipment {
            let index = remaining
                .iter()
                .position(|carried| same_equipment(carried.name(), item.name()))
                .ok_or_else(|| PricingError::EquipmentNotOnUnit {
                    unit: self.name.clone(),
                    name: item.name().to_string(),
                })?;
            remaining.remove(index);
        }
        self.equipment = remaining;
        self.update(&ctx.ruleset);
        Ok(())
    }

    pub fn set_count(&mut self, ctx: &PricingContext, count: u32) -> Result<()> {
        if count == 0 {
            return Err(PricingError::InvalidUnitCount {
                unit: self.name.clone(),
            });
        }
        self.count = count;
        self.update(&ctx.ruleset);
        Ok(())
    }

    /// Copy of this unit with `removed` taken off, then `added` equipped.
    pub fn with_equipment(
        &self,
        ctx: &PricingContext,
        added: &[Arc<Equipment>],
        removed: &[Arc<Equipment>],
    ) -> Result<Unit> {
        let mut unit = self.clone();
        unit.remove_equipments(ctx, removed)?;
        unit.add_equipments(ctx, added);
        Ok(unit)
    }

    /// Copy of this unit with another model count.
    pub fn with_count(&self, ctx: &PricingContext, count: u32) -> Result<Unit> {
        let mut unit = self.clone();
        unit.set_count(ctx, count)?;
        Ok(unit)
    }

    fn update(&mut self, ruleset: &Ruleset) {
        let mut profile = self.derive_context();
        let count = f64::from(self.count);

        let attack: i64 = self
            .equipment
            .iter()
            .map(|equipment| equipment.cost(profile.speed, profile.attack_quality, ruleset))
            .chain(
                profile
                    .innate
                    .iter()
                    .map(|weapon| weapon.cost(profile.speed, profile.attack_quality, ruleset)),
            )
            .map(|cost| cost * i64::from(self.count))
            .sum();
        profile.attack_cost = attack;

        let mut defense = quality_defense_factor(profile.defense_quality)
            * ruleset.defense_cost(profile.defense)
            * profile.toughness;
        // Hardened targets that move fast are critical to control objectives.
        defense *= (profile.speed + 24.0) / 36.0;
        defense *= ruleset.adjust_defense_cost * count;
        profile.defense_cost = round_points(defense);

        let attack = profile.attack_cost as f64;
        let defense = profile.defense_cost as f64;
        profile.other_cost = round_points(
            profile.global_add
                + f64::from(profile.passengers) * (defense / 150.0) * (profile.speed / 12.0)
                + (attack + defense) * profile.global_multiplier,
        );

        profile.cost = profile.attack_cost + profile.defense_cost + profile.other_cost;
        debug!(
            "{}: attack {} defense {} other {} => {}",
            self.name, profile.attack_cost, profile.defense_cost, profile.other_cost, profile.cost
        );
        self.profile = profile;
    }

    fn derive_context(&self) -> UnitProfile {
        let rules = self.effective_rules().collect::<Vec<_>>();
        let has = |rule: SpecialRule| rules.contains(&&rule);

        let mut innate = Vec::new();
        let mut fear = has(SpecialRule::Fear);
        if has(SpecialRule::Vehicle) || has(SpecialRule::Monster) {
            innate.push(Weapon::new(
                "Monster Stomp",
                0,
                Attacks::Fixed(0),
                0.0,
                vec![SpecialRule::Impact(3)],
            ));
            fear = true;
        }
        if has(SpecialRule::Titan) {
            innate.push(Weapon::new(
                "Titan Stomp",
                0,
                Attacks::Fixed(6),
                2.0,
                vec![SpecialRule::Autohit],
            ));
            fear = true;
        }

        let mut speed = BASE_SPEED;
        if has(SpecialRule::VeryFast) {
            speed = 24.0;
        }
        if has(SpecialRule::Fast) {
            speed = 18.0;
        }
        if has(SpecialRule::Slow) {
            speed = 8.0;
        }
        if has(SpecialRule::Strider) {
            speed *= 1.2;
        }
        if has(SpecialRule::Flying) {
            speed *= 1.3;
        }
        if has(SpecialRule::Flyer) {
            speed = 24.0;
        }

        let mut defense = f64::from(self.base_defense);
        // Stealth only works against shooting, so it is worth half a point.
        if has(SpecialRule::Stealth) {
            defense += 0.5;
        }

        let quality = f64::from(self.quality);
        let attack_quality = if has(SpecialRule::GoodShot) { 4.0 } else { quality };
        let defense_quality = if has(SpecialRule::Fearless) {
            quality - 1.0
        } else {
            quality
        };

        let mut global_multiplier = 0.0;
        // Ambush and Scout do not stack, only one can be used.
        if has(SpecialRule::Ambush) {
            global_multiplier += if has(SpecialRule::Scout) { 0.20 } else { 0.10 };
        } else if has(SpecialRule::Scout) {
            global_multiplier += 0.15;
        }

        let mut global_add = 0.0;
        let flat_bonuses = [
            (has(SpecialRule::Beacon), 10.0),
            (has(SpecialRule::Inhibitor), 10.0),
            (has(SpecialRule::Inspiring), 30.0),
            (has(SpecialRule::VolleyFire), 30.0),
            (fear, 5.0),
        ];
        for (present, bonus) in flat_bonuses {
            if present {
                global_add += bonus;
            }
        }

        let mut toughness = 1u32;
        let mut passengers = 0u32;
        let mut psychic = 0u32;
        for rule in &rules {
            match rule {
                SpecialRule::Tough(value) => toughness = toughness.max(*value),
                SpecialRule::Transport(value) => passengers = passengers.max(*value),
                SpecialRule::Psychic(value) => psychic = psychic.max(*value),
                SpecialRule::Defense(value) => defense += f64::from(*value),
                _ => {}
            }
        }
        global_add += f64::from(psychic) * 7.0;

        let mut toughness = f64::from(toughness);
        if has(SpecialRule::Regeneration) {
            toughness *= 4.0 / 3.0;
        }

        UnitProfile {
            speed,
            defense,
            toughness,
            attack_quality,
            defense_quality,
            global_add,
            global_multiplier,
            passengers,
            innate,
            ..UnitProfile::default()
        }
    }
}

/// Names match exactly or as the plural spelling the armory resolves.
fn same_equipment(carried: &str, removed: &str) -> bool {
    carried == removed
        || carried.strip_suffix('s') == Some(removed)
        || removed.strip_suffix('s') == Some(carried)
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} [{}] {} pts", self.name, self.count, self.profile.cost)?;
        for equipment in &self.equipment {
            writeln!(f, "\t{equipment}")?;
        }
        let rules = self
            .special_rules
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        writeln!(f, "\t{}", rules.join(", "))?;
        write!(
            f,
            "\tdefense {} pts, attack {} pts, other {} pts",
            self.profile.defense_cost, self.profile.attack_cost, self.profile.other_cost
        )
    }
}
