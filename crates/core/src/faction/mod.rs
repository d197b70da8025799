//! Faction content loading and batch pricing.

/// Turning loaded content into priced records.
pub mod build;
/// Locating faction directories under a content root.
pub mod discovery;
/// Reading faction directories from disk.
pub mod loader;
/// Raw content records.
pub mod models;

pub use build::FactionBuilder;
pub use discovery::FactionDiscovery;
pub use loader::{FactionLoader, FactionSource, RosterSource};
pub use models::{
    AttacksRecord, EquipmentFile, NameList, UnitRecord, UpgradeFile, UpgradeRecord, WarGearRecord,
    WeaponRecord,
};
