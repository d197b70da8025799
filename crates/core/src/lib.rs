#![warn(clippy::all, missing_docs)]

//! Point-cost engine for tabletop wargame rosters.
//!
//! This crate hosts the cost formulas, the equipment catalog, unit and
//! upgrade pricing, and the loaders that turn faction content files into
//! priced records for renderers.

pub mod armory;
pub mod config;
pub mod context;
pub mod equipment;
pub mod error;
pub mod faction;
pub mod formulas;
pub mod models;
pub mod rules;
pub mod unit;
pub mod upgrade;

pub use armory::Armory;
pub use config::PricingConfig;
pub use context::{FactionRules, PricingContext};
pub use equipment::{Attacks, Equipment, WarGear, Weapon};
pub use error::{FactionError, PricingError};
pub use faction::{FactionBuilder, FactionDiscovery, FactionLoader};
pub use formulas::{Ruleset, RulesetVersion};
pub use models::{PricedFaction, PricedUnit, PricedUpgrade};
pub use rules::SpecialRule;
pub use unit::{Unit, UnitProfile};
pub use upgrade::{Upgrade, UpgradeGroup};
