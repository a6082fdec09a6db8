use crate::error::{EngineError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Number of houses on a residential asset, always within `0..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ImprovementLevel(u8);

impl ImprovementLevel {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(4);

    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MAX.0).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Adds `delta` levels on top of the current one, capping at [`Self::MAX`].
    ///
    /// Excess levels are dropped; the returned [`Improvement`] reports how
    /// many were actually added and whether anything was cut off.
    pub fn raise(self, delta: u64) -> Improvement {
        let requested = u64::from(self.0).saturating_add(delta);
        let capped = requested > u64::from(Self::MAX.0);
        let level = if capped {
            Self::MAX
        } else {
            // requested <= 4 here
            Self(requested as u8)
        };
        Improvement {
            level,
            added: level.0 - self.0,
            capped,
            acquired: false,
        }
    }
}

/// Result of assigning or improving a residential asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Improvement {
    /// Level after the operation.
    pub level: ImprovementLevel,
    /// Levels actually added, after capping.
    pub added: u8,
    /// Whether part of the requested delta was dropped.
    pub capped: bool,
    /// Whether the holding was created by this operation.
    pub acquired: bool,
}

/// A single ownership record.
///
/// Persisted as `{"houses": n}` for residential assets and `{}` for class
/// assets (utilities, transport), which carry no improvement levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HoldingRecord", into = "HoldingRecord")]
pub enum Holding {
    Residential { level: ImprovementLevel },
    Class,
}

impl Holding {
    pub fn level(&self) -> Option<ImprovementLevel> {
        match self {
            Self::Residential { level } => Some(*level),
            Self::Class => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct HoldingRecord {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_houses"
    )]
    houses: Option<u8>,
}

/// `houses` may be absent, but if present it must be a number: an explicit
/// `null` is not a class holding.
fn present_houses<'de, D>(deserializer: D) -> std::result::Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    u8::deserialize(deserializer).map(Some)
}

impl TryFrom<HoldingRecord> for Holding {
    type Error = String;

    fn try_from(record: HoldingRecord) -> std::result::Result<Self, Self::Error> {
        match record.houses {
            None => Ok(Self::Class),
            Some(houses) => ImprovementLevel::new(houses)
                .map(|level| Self::Residential { level })
                .ok_or_else(|| format!("houses must be between 0 and 4, found {houses}")),
        }
    }
}

impl From<Holding> for HoldingRecord {
    fn from(holding: Holding) -> Self {
        Self {
            houses: holding.level().map(ImprovementLevel::value),
        }
    }
}

/// Assets held by one player in one area or class.
pub type AssetHoldings = BTreeMap<String, Holding>;
/// Everything one player holds, keyed by area or class name.
pub type PlayerHoldings = BTreeMap<String, AssetHoldings>;

/// Where an asset currently sits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetOwner {
    pub player: String,
    pub group: String,
    pub holding: Holding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassAcquisition {
    Acquired,
    AlreadyHeld,
}

/// The ownership registry: player → area/class → asset → holding.
///
/// An asset name is globally exclusive: at most one player holds a record
/// for it, whatever area or class it was filed under.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnershipBook {
    players: BTreeMap<String, PlayerHoldings>,
}

impl OwnershipBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Holdings of `player`, empty if the player is unknown.
    pub fn get(&self, player: &str) -> PlayerHoldings {
        self.players.get(player).cloned().unwrap_or_default()
    }

    pub fn contains_player(&self, player: &str) -> bool {
        self.players.contains_key(player)
    }

    pub fn players(&self) -> impl Iterator<Item = &str> {
        self.players.keys().map(String::as_str)
    }

    /// Scans every player's holdings for `asset`.
    pub fn find_owner(&self, asset: &str) -> Option<AssetOwner> {
        self.players.iter().find_map(|(player, groups)| {
            groups.iter().find_map(|(group, assets)| {
                assets.get(asset).map(|holding| AssetOwner {
                    player: player.clone(),
                    group: group.clone(),
                    holding: *holding,
                })
            })
        })
    }

    /// Creates an empty holding set for `player`. Returns whether it was new.
    pub fn ensure_player(&mut self, player: &str) -> bool {
        if self.players.contains_key(player) {
            return false;
        }
        self.players.insert(player.to_string(), PlayerHoldings::new());
        true
    }

    /// Assigns `asset` to `player` under `area`, or raises its level if the
    /// player already holds it there.
    pub fn assign_or_improve(
        &mut self,
        player: &str,
        area: &str,
        asset: &str,
        delta: u64,
    ) -> Result<Improvement> {
        let current = match self.claim(player, area, asset)? {
            None => None,
            Some(Holding::Residential { level }) => Some(level),
            Some(Holding::Class) => return Err(conflict(asset, player, area)),
        };

        let improvement = match current {
            Some(level) => level.raise(delta),
            None => Improvement {
                acquired: true,
                ..ImprovementLevel::ZERO.raise(delta)
            },
        };

        self.slot(player, area).insert(
            asset.to_string(),
            Holding::Residential {
                level: improvement.level,
            },
        );
        Ok(improvement)
    }

    /// Records presence of a class asset for `player`.
    pub fn assign_class_asset(
        &mut self,
        player: &str,
        class: &str,
        asset: &str,
    ) -> Result<ClassAcquisition> {
        match self.claim(player, class, asset)? {
            Some(Holding::Class) => Ok(ClassAcquisition::AlreadyHeld),
            Some(Holding::Residential { .. }) => Err(conflict(asset, player, class)),
            None => {
                self.slot(player, class)
                    .insert(asset.to_string(), Holding::Class);
                Ok(ClassAcquisition::Acquired)
            }
        }
    }

    /// Number of assets `player` holds in `group`.
    pub fn owned_in_group(&self, player: &str, group: &str) -> usize {
        self.players
            .get(player)
            .and_then(|groups| groups.get(group))
            .map_or(0, BTreeMap::len)
    }

    pub fn reset(&mut self) {
        self.players.clear();
    }

    /// Checks exclusivity and returns the caller's existing holding, if any.
    ///
    /// The same player holding the asset under a different group is also a
    /// conflict: one asset name maps to exactly one record.
    fn claim(&self, player: &str, group: &str, asset: &str) -> Result<Option<Holding>> {
        match self.find_owner(asset) {
            None => Ok(None),
            Some(owner) if owner.player == player && owner.group == group => {
                Ok(Some(owner.holding))
            }
            Some(owner) => Err(conflict(asset, &owner.player, &owner.group)),
        }
    }

    fn slot(&mut self, player: &str, group: &str) -> &mut AssetHoldings {
        self.players
            .entry(player.to_string())
            .or_default()
            .entry(group.to_string())
            .or_default()
    }
}

fn conflict(asset: &str, owner: &str, group: &str) -> EngineError {
    EngineError::OwnershipConflict {
        asset: asset.to_string(),
        owner: owner.to_string(),
        group: group.to_string(),
    }
}
