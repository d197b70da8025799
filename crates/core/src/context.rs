#![allow(missing_docs)]

//! Everything a costing call needs besides the unit itself.

use std::collections::{BTreeMap, HashMap};

use crate::{armory::Armory, formulas::Ruleset, rules::SpecialRule};

/// Flat point surcharges for owning a named rule, scoped to one faction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactionRules {
    surcharges: BTreeMap<String, i64>,
}

impl FactionRules {
    /// Keys are spelled like content tags: `"Blessed"`, `"Tough"` for any
    /// value, or `"Psychic(1)"` / `"Psychic+1"` for one value only.
    pub fn new<I, S>(surcharges: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: AsRef<str>,
    {
        Self {
            surcharges: surcharges
                .into_iter()
                .map(|(name, cost)| (normalize_key(name.as_ref()), cost))
                .collect(),
        }
    }

    /// Sum of surcharges for every distinct rule in `rules`.
    ///
    /// A rule matches its exact entry (`psychic(1)`) before the entry for
    /// the bare rule name (`psychic`).
    pub fn surcharge<'a>(&self, rules: impl IntoIterator<Item = &'a SpecialRule>) -> i64 {
        if self.surcharges.is_empty() {
            return 0;
        }
        let matched = rules
            .into_iter()
            .filter_map(|rule| {
                let exact = rule.to_string().to_lowercase();
                self.surcharges
                    .get_key_value(&exact)
                    .or_else(|| self.surcharges.get_key_value(&rule.key()))
            })
            .collect::<HashMap<_, _>>();
        matched.values().copied().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.surcharges.is_empty()
    }
}

fn normalize_key(name: &str) -> String {
    match SpecialRule::parse(name) {
        Ok(rule) => rule.to_string().to_lowercase(),
        Err(_) => name.trim().to_lowercase(),
    }
}

/// Catalog, faction rules and ruleset threaded through every costing call.
#[derive(Debug, Default)]
pub struct PricingContext {
    pub ruleset: Ruleset,
    pub armory: Armory,
    pub faction_rules: FactionRules,
}

impl PricingContext {
    pub fn new(ruleset: Ruleset, armory: Armory, faction_rules: FactionRules) -> Self {
        Self {
            ruleset,
            armory,
            faction_rules,
        }
    }
}
