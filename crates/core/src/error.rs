#![allow(missing_docs)]

//! Error types raised while pricing a faction.

use thiserror::Error;

/// Content-authoring defects detected by the pricing engine.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("unknown equipment '{name}'")]
    UnresolvedEquipmentName { name: String },

    #[error("malformed special rule '{tag}': {reason}")]
    MalformedSpecialTag { tag: String, reason: String },

    #[error("malformed attack value '{value}'")]
    MalformedAttacks { value: String },

    #[error("upgrade group '{group}' is referenced by unit '{unit}' but not defined for it")]
    UpgradeGroupUnitMismatch { group: String, unit: String },

    #[error("upgrade group '{group}' has no unit to amortize its cost over")]
    EmptyAmortizationSet { group: String },

    #[error("equipment '{name}' is already registered")]
    DuplicateEquipment { name: String },

    #[error("unit '{unit}' does not carry '{name}'")]
    EquipmentNotOnUnit { unit: String, name: String },

    #[error("unit '{unit}' must have at least one model")]
    InvalidUnitCount { unit: String },
}

pub type Result<T> = std::result::Result<T, PricingError>;

/// A [`PricingError`] located inside a faction's content files.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("faction {faction}, {file}, {subject}: {source}")]
pub struct FactionError {
    pub faction: String,
    pub file: String,
    pub subject: String,
    #[source]
    pub source: PricingError,
}

impl FactionError {
    pub fn new(
        faction: impl Into<String>,
        file: impl Into<String>,
        subject: impl Into<String>,
        source: PricingError,
    ) -> Self {
        Self {
            faction: faction.into(),
            file: file.into(),
            subject: subject.into(),
            source,
        }
    }
}
