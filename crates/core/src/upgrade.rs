#![allow(missing_docs)]

//! Marginal cost of equipment swaps, amortized over every eligible unit.

use std::sync::Arc;

use tracing::debug;

use crate::{
    context::PricingContext,
    equipment::Equipment,
    error::{PricingError, Result},
    formulas::round_points,
    unit::Unit,
};

/// One line of an upgrade group: what is swapped, and the candidates offered.
#[derive(Debug, Clone)]
pub struct Upgrade {
    pub text: String,
    /// Applies to every model of the unit instead of a single one.
    pub all: bool,
    pub pre_remove: Vec<Arc<Equipment>>,
    pub pre_add: Vec<Arc<Equipment>>,
    pub remove: Vec<Arc<Equipment>>,
    pub add: Vec<Vec<Arc<Equipment>>>,
}

impl Upgrade {
    /// Point delta of each `add` candidate on `unit`, aligned with `add`.
    ///
    /// `unit` is never modified; all simulation happens on copies.
    pub fn cost_for_unit(&self, ctx: &PricingContext, unit: &Unit) -> Result<Vec<i64>> {
        let base = if self.all {
            unit.clone()
        } else {
            unit.with_count(ctx, 1)?
        };
        let base = base.with_equipment(ctx, &self.pre_add, &self.pre_remove)?;
        let prev_cost = base.total_cost(ctx);

        let stripped = base.with_equipment(ctx, &[], &self.remove)?;
        self.add
            .iter()
            .map(|candidate| {
                let upgraded = stripped.with_equipment(ctx, candidate, &[])?;
                Ok(upgraded.total_cost(ctx) - prev_cost)
            })
            .collect()
    }
}

/// Upgrades offered together.
#[derive(Debug, Clone)]
pub struct UpgradeGroup {
    pub name: String,
    pub upgrades: Vec<Upgrade>,
}

impl UpgradeGroup {
    pub fn new(name: impl Into<String>, upgrades: Vec<Upgrade>) -> Self {
        Self {
            name: name.into(),
            upgrades,
        }
    }

    /// Amortized price of every candidate, one list per upgrade.
    ///
    /// Each unit in `affected` prices the upgrade on its own copy; the
    /// shared price is the rounded mean across units. Units sharing a name
    /// are still priced separately.
    pub fn costs(&self, ctx: &PricingContext, affected: &[&Unit]) -> Result<Vec<Vec<i64>>> {
        self.upgrades
            .iter()
            .map(|upgrade| self.upgrade_cost(ctx, upgrade, affected))
            .collect()
    }

    /// Amortized price of each candidate of one upgrade over `affected`.
    pub fn upgrade_cost(
        &self,
        ctx: &PricingContext,
        upgrade: &Upgrade,
        affected: &[&Unit],
    ) -> Result<Vec<i64>> {
        let per_unit = affected
            .iter()
            .map(|unit| upgrade.cost_for_unit(ctx, unit))
            .collect::<Result<Vec<_>>>()?;
        let mean = mean_costs(&self.name, &per_unit)?;
        debug!("{} / {}: {:?} => {:?}", self.name, upgrade.text, per_unit, mean);
        Ok(mean)
    }
}

/// Elementwise rounded mean, e.g. `[[11, 13], [7, 10]]` becomes `[9, 12]`.
pub fn mean_costs(group: &str, costs: &[Vec<i64>]) -> Result<Vec<i64>> {
    let first = costs.first().ok_or_else(|| PricingError::EmptyAmortizationSet {
        group: group.to_string(),
    })?;
    let count = costs.len() as f64;
    let mut sums = vec![0.0; first.len()];
    for unit_costs in costs {
        for (sum, cost) in sums.iter_mut().zip(unit_costs) {
            *sum += *cost as f64 / count;
        }
    }
    Ok(sums.into_iter().map(round_points).collect())
}
