#![allow(missing_docs)]

//! Weapons and wargear, and the contextual weapon cost formula.

use std::fmt;

use crate::{
    error::{PricingError, Result},
    formulas::{ap_cost, quality_attack_factor, range_cost, round_points, Ruleset, RENDING_AP},
    rules::SpecialRule,
};

/// Attack count, either literal or a single die (`D3` averages to 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attacks {
    Fixed(u32),
    Dice(u32),
}

impl Attacks {
    /// Parse `"3"` or `"D6"`.
    pub fn parse(raw: &str) -> Result<Self> {
        let text = raw.trim();
        let malformed = || PricingError::MalformedAttacks {
            value: raw.to_string(),
        };
        match text.strip_prefix(['D', 'd']) {
            Some(sides) => sides
                .parse::<u32>()
                .ok()
                .filter(|sides| *sides > 0)
                .map(Attacks::Dice)
                .ok_or_else(malformed),
            None => text.parse::<u32>().map(Attacks::Fixed).map_err(|_| malformed()),
        }
    }

    /// Expected number of attacks.
    pub fn value(self) -> f64 {
        match self {
            Attacks::Fixed(count) => f64::from(count),
            Attacks::Dice(sides) => (f64::from(sides) + 1.0) / 2.0,
        }
    }
}

impl fmt::Display for Attacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attacks::Fixed(count) => write!(f, "{count}"),
            Attacks::Dice(sides) => write!(f, "D{sides}"),
        }
    }
}

/// A weapon profile. Its cost depends on who carries it.
#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    pub name: String,
    /// Range in inches, 0 for melee.
    pub range: u32,
    pub attacks: Attacks,
    pub armor_piercing: f64,
    pub rules: Vec<SpecialRule>,
}

impl Weapon {
    pub fn new(
        name: impl Into<String>,
        range: u32,
        attacks: Attacks,
        armor_piercing: f64,
        rules: Vec<SpecialRule>,
    ) -> Self {
        Self {
            name: name.into(),
            range,
            attacks,
            armor_piercing,
            rules,
        }
    }

    pub fn is_ranged(&self) -> bool {
        self.range > 0
    }

    pub fn has_rule(&self, rule: &SpecialRule) -> bool {
        self.rules.contains(rule)
    }

    /// Same profile with the `Linked` rule, named `Linked <name>`.
    pub fn linked_variant(&self) -> Weapon {
        let mut rules = self.rules.clone();
        if !rules.contains(&SpecialRule::Linked) {
            rules.push(SpecialRule::Linked);
        }
        Weapon {
            name: format!("Linked {}", self.name),
            rules,
            ..self.clone()
        }
    }

    /// Point cost when carried by a model moving `speed` inches and hitting on `quality`+.
    pub fn cost(&self, speed: f64, quality: f64, ruleset: &Ruleset) -> i64 {
        let base_ap = self.armor_piercing;
        let mut ap = base_ap;
        let mut quality = quality;
        let mut range = f64::from(self.range);
        let mut sfactor = 1.0;
        let mut simpact = 0.0;
        let mut rending = 0.0;

        if self.has_rule(&SpecialRule::Gravity) {
            ap = 3.0;
        }
        if self.has_rule(&SpecialRule::Vibration) {
            ap = 4.0;
        }
        if self.has_rule(&SpecialRule::Sniper) {
            ap += 0.5;
        }

        if self.has_rule(&SpecialRule::Autohit) {
            quality = 1.0;
        } else {
            if self.has_rule(&SpecialRule::Sniper) {
                quality = 2.0;
            }
            if self.has_rule(&SpecialRule::Linked) {
                quality -= 1.0;
            }
            if self.has_rule(&SpecialRule::Flux) {
                quality -= 2.0;
            }
        }

        for rule in &self.rules {
            match rule {
                SpecialRule::Deadly => sfactor *= 2.5,
                // Rending is 1/6 of having AP(8).
                SpecialRule::Rending => {
                    rending = (1.0 / 6.0) * (ap_cost(RENDING_AP) - ap_cost(base_ap));
                }
                SpecialRule::Blast(hits) => sfactor *= f64::from(*hits),
                SpecialRule::Impact(hits) => simpact = f64::from(*hits),
                SpecialRule::Limited => sfactor /= 2.0,
                SpecialRule::Secondary => sfactor /= 4.0,
                SpecialRule::Indirect => range *= 1.4,
                SpecialRule::AntiAir => sfactor *= 1.10,
                _ => {}
            }
        }

        let threat = range_cost(range, speed);
        let mut cost = sfactor
            * self.attacks.value()
            * threat
            * (ap_cost(ap) * quality_attack_factor(quality) + rending);
        // Impact hits land automatically, but only on the charge.
        cost += 0.5 * simpact * sfactor * ap_cost(ap) * threat;

        round_points(cost * ruleset.adjust_attack_cost)
    }

    /// Profile text without the name, e.g. `(24", A3, AP(1), Rending)`.
    pub fn profile(&self) -> String {
        let mut parts = Vec::new();
        if self.is_ranged() {
            parts.push(format!("{}\"", self.range));
        }
        parts.push(format!("A{}", self.attacks));
        if self.armor_piercing != 0.0 {
            parts.push(format!("AP({})", self.armor_piercing));
        }
        parts.extend(self.rules.iter().map(ToString::to_string));
        format!("({})", parts.join(", "))
    }
}

impl fmt::Display for Weapon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.profile())
    }
}

/// Non-weapon equipment: grants rules to its bearer and may bundle weapons.
#[derive(Debug, Clone, PartialEq)]
pub struct WarGear {
    pub name: String,
    pub rules: Vec<SpecialRule>,
    pub weapons: Vec<Weapon>,
    pub text: String,
}

impl WarGear {
    pub fn new(
        name: impl Into<String>,
        rules: Vec<SpecialRule>,
        weapons: Vec<Weapon>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            rules,
            weapons,
            text: text.into(),
        }
    }

    pub fn cost(&self, speed: f64, quality: f64, ruleset: &Ruleset) -> i64 {
        self.weapons
            .iter()
            .map(|weapon| weapon.cost(speed, quality, ruleset))
            .sum()
    }

    pub fn profile(&self) -> String {
        let parts = self
            .rules
            .iter()
            .map(ToString::to_string)
            .chain(self.weapons.iter().map(ToString::to_string))
            .collect::<Vec<_>>();
        if parts.is_empty() {
            String::new()
        } else {
            format!("({})", parts.join(", "))
        }
    }
}

impl fmt::Display for WarGear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let profile = self.profile();
        if profile.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{} {}", self.name, profile)
        }
    }
}

/// Catalog entry carried by units.
#[derive(Debug, Clone, PartialEq)]
pub enum Equipment {
    Weapon(Weapon),
    WarGear(WarGear),
}

impl Equipment {
    pub fn name(&self) -> &str {
        match self {
            Equipment::Weapon(weapon) => &weapon.name,
            Equipment::WarGear(gear) => &gear.name,
        }
    }

    /// Rules this equipment grants to the unit carrying it.
    ///
    /// Weapon rules only affect the weapon itself.
    pub fn granted_rules(&self) -> &[SpecialRule] {
        match self {
            Equipment::Weapon(_) => &[],
            Equipment::WarGear(gear) => &gear.rules,
        }
    }

    /// Weapons this equipment adds to the bearer's profile.
    pub fn weapons(&self) -> &[Weapon] {
        match self {
            Equipment::Weapon(weapon) => std::slice::from_ref(weapon),
            Equipment::WarGear(gear) => &gear.weapons,
        }
    }

    pub fn cost(&self, speed: f64, quality: f64, ruleset: &Ruleset) -> i64 {
        match self {
            Equipment::Weapon(weapon) => weapon.cost(speed, quality, ruleset),
            Equipment::WarGear(gear) => gear.cost(speed, quality, ruleset),
        }
    }

    /// Shallow copy under another name, used for plural lookups.
    pub fn renamed(&self, name: impl Into<String>) -> Equipment {
        let name = name.into();
        match self {
            Equipment::Weapon(weapon) => Equipment::Weapon(Weapon {
                name,
                ..weapon.clone()
            }),
            Equipment::WarGear(gear) => Equipment::WarGear(WarGear {
                name,
                ..gear.clone()
            }),
        }
    }

    pub fn profile(&self) -> String {
        match self {
            Equipment::Weapon(weapon) => weapon.profile(),
            Equipment::WarGear(gear) => gear.profile(),
        }
    }
}

impl fmt::Display for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Equipment::Weapon(weapon) => weapon.fmt(f),
            Equipment::WarGear(gear) => gear.fmt(f),
        }
    }
}

impl From<Weapon> for Equipment {
    fn from(weapon: Weapon) -> Self {
        Equipment::Weapon(weapon)
    }
}

impl From<WarGear> for Equipment {
    fn from(gear: WarGear) -> Self {
        Equipment::WarGear(gear)
    }
}
