#![allow(missing_docs)]

//! Special rules decoded from free-form tag strings.
//!
//! Content files spell rules as text (`"Tough(3)"`, `"Psychic+1"`,
//! `"very fast"`). They are decoded once at load time; the engine only ever
//! matches on [`SpecialRule`] variants.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{PricingError, Result};

/// A decoded special rule carried by a unit, a wargear or a weapon.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SpecialRule {
    // Weapon rules.
    Deadly,
    Linked,
    Rending,
    Flux,
    Blast(u32),
    Impact(u32),
    Autohit,
    Limited,
    Secondary,
    Sniper,
    Indirect,
    Vibration,
    Gravity,
    AntiAir,

    // Unit rules.
    Vehicle,
    Monster,
    Titan,
    VeryFast,
    Fast,
    Slow,
    Stealth,
    GoodShot,
    Fearless,
    Ambush,
    Scout,
    Beacon,
    Fear,
    Strider,
    Flying,
    Flyer,
    Regeneration,
    Inspiring,
    VolleyFire,
    Inhibitor,
    Tough(u32),
    Transport(u32),
    Psychic(u32),
    Defense(u32),

    /// A rule with no pricing effect of its own (e.g. `Hero`).
    ///
    /// Still relevant for faction surcharges and for display.
    Other(String),
}

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z' -]*?)\s*(?:\(\s*([^)]*?)\s*\)|\+\s*(\S*))?$")
        .expect("failed to compile special rule regex")
});

impl SpecialRule {
    /// Decode a tag as written in content files. Matching is case-insensitive.
    pub fn parse(raw: &str) -> Result<Self> {
        let text = raw.trim();
        let malformed = |reason: &str| PricingError::MalformedSpecialTag {
            tag: raw.to_string(),
            reason: reason.to_string(),
        };

        if text.is_empty() {
            return Err(malformed("empty rule"));
        }
        let Some(caps) = TAG_RE.captures(text) else {
            return Ok(SpecialRule::Other(text.to_string()));
        };
        let name = caps
            .get(1)
            .map(|m| m.as_str().trim().to_lowercase())
            .unwrap_or_default();
        let argument = caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str());

        let number = || -> Result<u32> {
            let value = argument.ok_or_else(|| malformed("missing numeric value"))?;
            value
                .parse::<u32>()
                .map_err(|_| malformed("value is not a whole number"))
        };

        let rule = match name.as_str() {
            "blast" => SpecialRule::Blast(number()?),
            "impact" => SpecialRule::Impact(number()?),
            "tough" => SpecialRule::Tough(number()?),
            "transport" => SpecialRule::Transport(number()?),
            "psychic" => SpecialRule::Psychic(number()?),
            "defense" => SpecialRule::Defense(number()?),
            _ if argument.is_some() => SpecialRule::Other(text.to_string()),
            "deadly" => SpecialRule::Deadly,
            "linked" => SpecialRule::Linked,
            "rending" => SpecialRule::Rending,
            "flux" => SpecialRule::Flux,
            "autohit" => SpecialRule::Autohit,
            "limited" => SpecialRule::Limited,
            "secondary" => SpecialRule::Secondary,
            "sniper" => SpecialRule::Sniper,
            "indirect" => SpecialRule::Indirect,
            "vibration" => SpecialRule::Vibration,
            "gravity" => SpecialRule::Gravity,
            "anti-air" => SpecialRule::AntiAir,
            "vehicle" => SpecialRule::Vehicle,
            "monster" => SpecialRule::Monster,
            "titan" => SpecialRule::Titan,
            "very fast" => SpecialRule::VeryFast,
            "fast" => SpecialRule::Fast,
            "slow" => SpecialRule::Slow,
            "stealth" => SpecialRule::Stealth,
            "good shot" => SpecialRule::GoodShot,
            "fearless" => SpecialRule::Fearless,
            "ambush" => SpecialRule::Ambush,
            "scout" => SpecialRule::Scout,
            "beacon" => SpecialRule::Beacon,
            "fear" => SpecialRule::Fear,
            "strider" => SpecialRule::Strider,
            "flying" => SpecialRule::Flying,
            "flyer" => SpecialRule::Flyer,
            "regeneration" => SpecialRule::Regeneration,
            "inspiring" => SpecialRule::Inspiring,
            "volley fire" => SpecialRule::VolleyFire,
            "inhibitor" => SpecialRule::Inhibitor,
            _ => SpecialRule::Other(text.to_string()),
        };
        Ok(rule)
    }

    /// Decode a list of tags, failing on the first malformed one.
    pub fn parse_all<S: AsRef<str>>(raw: &[S]) -> Result<Vec<Self>> {
        raw.iter().map(|tag| Self::parse(tag.as_ref())).collect()
    }

    /// Name used when matching faction rules, without any numeric value.
    pub fn key(&self) -> String {
        self.to_string()
            .split(['(', '+'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase()
    }
}

impl fmt::Display for SpecialRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SpecialRule::Blast(n) => return write!(f, "Blast({n})"),
            SpecialRule::Impact(n) => return write!(f, "Impact({n})"),
            SpecialRule::Tough(n) => return write!(f, "Tough({n})"),
            SpecialRule::Transport(n) => return write!(f, "Transport({n})"),
            SpecialRule::Psychic(n) => return write!(f, "Psychic({n})"),
            SpecialRule::Defense(n) => return write!(f, "Defense+{n}"),
            SpecialRule::Other(text) => return f.write_str(text),
            SpecialRule::Deadly => "Deadly",
            SpecialRule::Linked => "Linked",
            SpecialRule::Rending => "Rending",
            SpecialRule::Flux => "Flux",
            SpecialRule::Autohit => "Autohit",
            SpecialRule::Limited => "Limited",
            SpecialRule::Secondary => "Secondary",
            SpecialRule::Sniper => "Sniper",
            SpecialRule::Indirect => "Indirect",
            SpecialRule::Vibration => "Vibration",
            SpecialRule::Gravity => "Gravity",
            SpecialRule::AntiAir => "Anti-Air",
            SpecialRule::Vehicle => "Vehicle",
            SpecialRule::Monster => "Monster",
            SpecialRule::Titan => "Titan",
            SpecialRule::VeryFast => "Very Fast",
            SpecialRule::Fast => "Fast",
            SpecialRule::Slow => "Slow",
            SpecialRule::Stealth => "Stealth",
            SpecialRule::GoodShot => "Good Shot",
            SpecialRule::Fearless => "Fearless",
            SpecialRule::Ambush => "Ambush",
            SpecialRule::Scout => "Scout",
            SpecialRule::Beacon => "Beacon",
            SpecialRule::Fear => "Fear",
            SpecialRule::Strider => "Strider",
            SpecialRule::Flying => "Flying",
            SpecialRule::Flyer => "Flyer",
            SpecialRule::Regeneration => "Regeneration",
            SpecialRule::Inspiring => "Inspiring",
            SpecialRule::VolleyFire => "Volley Fire",
            SpecialRule::Inhibitor => "Inhibitor",
        };
        f.write_str(label)
    }
}
