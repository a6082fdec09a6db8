//! Read-only reference pricing, produced by an external import step.
//!
//! The engine never writes these tables; it only looks prices and rents up.

use super::holding::ImprovementLevel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rent owed on a residential asset, by number of houses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RentTable {
    pub no_houses: i64,
    pub one_house: i64,
    pub two_houses: i64,
    pub three_houses: i64,
    pub four_houses: i64,
}

impl RentTable {
    pub fn at(&self, level: ImprovementLevel) -> i64 {
        match level.value() {
            0 => self.no_houses,
            1 => self.one_house,
            2 => self.two_houses,
            3 => self.three_houses,
            _ => self.four_houses,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidentialAsset {
    #[serde(rename = "land_price", default)]
    pub acquisition_price: i64,
    #[serde(rename = "house_price", default)]
    pub improvement_price: i64,
    #[serde(default)]
    pub rent: RentTable,
}

impl ResidentialAsset {
    /// Price of a fresh acquisition with `houses` built at once, or `None`
    /// if the catalog figures overflow.
    pub fn acquisition_cost(&self, houses: u8) -> Option<i64> {
        self.improvement_cost(houses)?
            .checked_add(self.acquisition_price)
    }

    /// Price of adding `houses` to an existing holding.
    pub fn improvement_cost(&self, houses: u8) -> Option<i64> {
        self.improvement_price.checked_mul(i64::from(houses))
    }
}

/// How a class asset's revenue scales with the number owned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RevenueKind {
    /// Dice multiplier (utilities).
    Multiplier,
    /// Fixed fare (transport).
    Ticket,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassAsset {
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<BTreeMap<String, i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket: Option<BTreeMap<String, i64>>,
}

impl ClassAsset {
    /// Revenue entry for an owner holding `owned` assets of this class.
    ///
    /// Tables are keyed `"<n> owned"`.
    pub fn revenue(&self, owned: usize) -> Option<(RevenueKind, i64)> {
        let key = format!("{owned} owned");
        if let Some(value) = self.multiplier.as_ref().and_then(|t| t.get(&key)) {
            return Some((RevenueKind::Multiplier, *value));
        }
        self.ticket
            .as_ref()
            .and_then(|t| t.get(&key))
            .map(|value| (RevenueKind::Ticket, *value))
    }
}

/// Area → asset → residential pricing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AreaCatalog(BTreeMap<String, BTreeMap<String, ResidentialAsset>>);

impl AreaCatalog {
    pub fn get(&self, area: &str, asset: &str) -> Option<&ResidentialAsset> {
        self.0.get(area).and_then(|assets| assets.get(asset))
    }

    pub fn areas(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    pub fn assets(&self, area: &str) -> Option<Vec<String>> {
        self.0.get(area).map(|assets| assets.keys().cloned().collect())
    }
}

/// Class → asset → class pricing (utilities, transport).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassCatalog(BTreeMap<String, BTreeMap<String, ClassAsset>>);

impl ClassCatalog {
    pub fn get(&self, class: &str, asset: &str) -> Option<&ClassAsset> {
        self.0.get(class).and_then(|assets| assets.get(asset))
    }

    pub fn classes(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    pub fn assets(&self, class: &str) -> Option<Vec<String>> {
        self.0.get(class).map(|assets| assets.keys().cloned().collect())
    }
}
