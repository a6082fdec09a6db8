//! Typed results of coordinator operations, and the flattened [`Outcome`]
//! front ends render.
//!
//! Capping is a warning, never an error: the assignment still happened.
//! Ownership conflicts and other rejections surface as `Status::Error`.

use crate::error::EngineError;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Warning,
    Error,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

/// Structured result handed to front ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub status: Status,
    pub message: String,
    pub details: serde_json::Value,
}

impl Outcome {
    fn new(status: Status, message: String, details: &impl Serialize) -> Self {
        Self {
            status,
            message,
            details: serde_json::to_value(details).unwrap_or(serde_json::Value::Null),
        }
    }

    pub fn from_error(error: &EngineError) -> Self {
        Self {
            status: Status::Error,
            message: error.to_string(),
            details: serde_json::Value::Null,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status.label(), self.message)
    }
}

fn payment_note(player: &str, charged: i64) -> String {
    if charged > 0 {
        format!(" Player '{player}' paid ${charged} to Treasurer.")
    } else {
        String::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResidentialAssignment {
    pub player: String,
    pub area: String,
    pub asset: String,
    /// Houses the caller asked for.
    pub requested: u64,
    /// Level after the assignment.
    pub level: u8,
    /// Houses actually added after capping; this is what was charged for.
    pub houses_added: u8,
    pub capped: bool,
    pub acquired: bool,
    pub charged: i64,
}

impl From<&ResidentialAssignment> for Outcome {
    fn from(a: &ResidentialAssignment) -> Self {
        let previous = a.level - a.houses_added;
        let (status, text) = match (a.acquired, a.capped) {
            (true, false) => (
                Status::Success,
                format!(
                    "Asset '{}' ({}) assigned to player '{}' with {} houses.",
                    a.asset, a.area, a.player, a.level
                ),
            ),
            (true, true) => (
                Status::Warning,
                format!(
                    "Assigning {} houses to asset '{}' ({}) exceeds maximum of 4. Capping at 4.",
                    a.requested, a.asset, a.area
                ),
            ),
            (false, false) => (
                Status::Success,
                format!(
                    "Adding {} houses to asset '{}' ({}) for player '{}': {} + {} = {} houses.",
                    a.requested, a.asset, a.area, a.player, previous, a.requested, a.level
                ),
            ),
            (false, true) => (
                Status::Warning,
                format!(
                    "Adding {} houses to asset '{}' ({}) for player '{}' would result in {} houses, but maximum is 4. Capping at 4.",
                    a.requested,
                    a.asset,
                    a.area,
                    a.player,
                    u64::from(previous).saturating_add(a.requested)
                ),
            ),
        };
        Self::new(status, text + &payment_note(&a.player, a.charged), a)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassPurchase {
    pub player: String,
    pub class: String,
    pub asset: String,
    pub acquired: bool,
    pub charged: i64,
}

impl From<&ClassPurchase> for Outcome {
    fn from(p: &ClassPurchase) -> Self {
        if !p.acquired {
            return Self::new(
                Status::Warning,
                format!(
                    "Player '{}' already owns '{}' ({}). Nothing charged.",
                    p.player, p.asset, p.class
                ),
                p,
            );
        }
        Self::new(
            Status::Success,
            format!("Asset '{}' ({}) assigned to player '{}'.", p.asset, p.class, p.player)
                + &payment_note(&p.player, p.charged),
            p,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RentTransfer {
    pub from: String,
    pub to: String,
    pub amount: i64,
    pub from_balance: i64,
    pub to_balance: i64,
}

impl From<&RentTransfer> for Outcome {
    fn from(t: &RentTransfer) -> Self {
        Self::new(
            Status::Success,
            format!("Player '{}' has paid ${} to player '{}'.", t.from, t.amount, t.to),
            t,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TreasuryAction {
    Pay,
    Collect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreasurySettlement {
    pub player: String,
    pub action: TreasuryAction,
    pub amount: i64,
    pub balance: i64,
}

impl From<&TreasurySettlement> for Outcome {
    fn from(s: &TreasurySettlement) -> Self {
        let text = match s.action {
            TreasuryAction::Pay => format!("Player '{}' paid ${} to Treasurer.", s.player, s.amount),
            TreasuryAction::Collect => {
                format!("Player '{}' collected ${} from Treasurer.", s.player, s.amount)
            }
        };
        Self::new(Status::Success, text, s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStart {
    pub players: Vec<String>,
    pub starting_balance: i64,
}

impl From<&GameStart> for Outcome {
    fn from(g: &GameStart) -> Self {
        Self::new(
            Status::Success,
            format!(
                "Game started with {} players, each with ${}.",
                g.players.len(),
                g.starting_balance
            ),
            g,
        )
    }
}

/// What a rent figure is based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RentBasis {
    /// Residential rent at the current number of houses.
    Houses { level: u8 },
    /// Dice multiplier for the number of utilities owned.
    Multiplier { owned: usize },
    /// Fixed fare for the number of transport assets owned.
    Ticket { owned: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RentQuote {
    pub owner: String,
    pub group: String,
    pub asset: String,
    pub basis: RentBasis,
    pub amount: i64,
}
