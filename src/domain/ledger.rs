use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counterparty label for payments to and from the bank.
pub const TREASURER: &str = "Treasurer";
/// Counterparty label for balances seeded by `start_game`.
pub const GAME_START: &str = "Game Start";
/// Credit every player receives when their account is first materialized.
pub const OPENING_CREDIT: i64 = 1500;

/// One signed, labelled movement of money.
///
/// Positive amounts are credits, negative ones debits. Entries are never
/// edited once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(rename = "payment amount")]
    pub amount: i64,
    #[serde(rename = "payment source")]
    pub counterparty: String,
}

impl LedgerEntry {
    pub fn new(amount: i64, counterparty: impl Into<String>) -> Self {
        Self {
            amount,
            counterparty: counterparty.into(),
        }
    }
}

/// Append-only per-player transaction history.
///
/// A balance is never stored; it is always the sum of a player's entries
/// and may go negative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountBook {
    accounts: BTreeMap<String, Vec<LedgerEntry>>,
}

impl AccountBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_player(&self, player: &str) -> bool {
        self.accounts.contains_key(player)
    }

    pub fn players(&self) -> impl Iterator<Item = &str> {
        self.accounts.keys().map(String::as_str)
    }

    /// Opens an account with a single seed entry unless it already has entries.
    ///
    /// Returns whether the account was opened by this call.
    pub fn open(&mut self, player: &str, amount: i64, counterparty: &str) -> bool {
        let entries = self.accounts.entry(player.to_string()).or_default();
        if !entries.is_empty() {
            return false;
        }
        entries.push(LedgerEntry::new(amount, counterparty));
        true
    }

    /// Credits a new player with the opening balance from the Treasurer.
    pub fn ensure_player(&mut self, player: &str) -> bool {
        self.open(player, OPENING_CREDIT, TREASURER)
    }

    /// Appends one entry. Debits are never blocked by the current balance,
    /// but an entry that would take the balance out of `i64` range is.
    pub fn append(&mut self, player: &str, amount: i64, counterparty: &str) -> Result<()> {
        if amount == 0 {
            return Err(EngineError::InvalidArgument(
                "payment amount must be non-zero".to_string(),
            ));
        }
        self.check_headroom(player, amount)?;
        self.accounts
            .entry(player.to_string())
            .or_default()
            .push(LedgerEntry::new(amount, counterparty));
        Ok(())
    }

    /// Moves `amount` from one player to another, opening either account
    /// if needed. A zero amount only opens the accounts.
    pub fn transfer(&mut self, from: &str, to: &str, amount: i64) -> Result<()> {
        if amount < 0 {
            return Err(EngineError::InvalidArgument(
                "transfer amount must be a non-negative integer".to_string(),
            ));
        }
        self.ensure_player(from);
        self.ensure_player(to);
        if amount == 0 {
            return Ok(());
        }
        // Both sides are checked before either entry lands.
        self.check_headroom(from, -amount)?;
        if from != to {
            self.check_headroom(to, amount)?;
        }
        self.append(from, -amount, to)?;
        self.append(to, amount, from)
    }

    /// Sum of the player's entries; 0 for an unknown player.
    ///
    /// Saturates instead of overflowing, so a document edited by hand past
    /// the `i64` range still reads.
    pub fn balance(&self, player: &str) -> i64 {
        self.entries(player)
            .iter()
            .fold(0i64, |total, entry| total.saturating_add(entry.amount))
    }

    pub fn entries(&self, player: &str) -> &[LedgerEntry] {
        self.accounts.get(player).map_or(&[], Vec::as_slice)
    }

    pub fn reset(&mut self) {
        self.accounts.clear();
    }

    fn check_headroom(&self, player: &str, amount: i64) -> Result<()> {
        match self.balance(player).checked_add(amount) {
            Some(_) => Ok(()),
            None => Err(EngineError::InvalidArgument(format!(
                "payment of {amount} would overflow the balance of player '{player}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_player_has_zero_balance() {
        let book = AccountBook::new();
        assert_eq!(book.balance("Ann"), 0);
        assert!(book.entries("Ann").is_empty());
    }

    #[test]
    fn test_ensure_player_opening_credit() {
        let mut book = AccountBook::new();
        assert!(book.ensure_player("Ann"));
        assert!(!book.ensure_player("Ann"));
        assert_eq!(book.balance("Ann"), 1500);
        assert_eq!(book.entries("Ann"), &[LedgerEntry::new(1500, "Treasurer")]);
    }

    #[test]
    fn test_append_allows_overdraft() {
        let mut book = AccountBook::new();
        book.ensure_player("Ann");
        book.append("Ann", -2000, TREASURER).unwrap();
        assert_eq!(book.balance("Ann"), -500);
    }

    #[test]
    fn test_append_rejects_zero() {
        let mut book = AccountBook::new();
        assert!(matches!(
            book.append("Ann", 0, TREASURER),
            Err(EngineError::InvalidArgument(_))
        ));
        assert!(!book.contains_player("Ann"));
    }

    #[test]
    fn test_transfer_round_trip() {
        let mut book = AccountBook::new();
        book.transfer("Ann", "Bob", 100).unwrap();
        assert_eq!(book.balance("Ann"), 1400);
        assert_eq!(book.balance("Bob"), 1600);

        book.transfer("Bob", "Ann", 100).unwrap();
        assert_eq!(book.balance("Ann"), 1500);
        assert_eq!(book.balance("Bob"), 1500);

        assert_eq!(
            book.entries("Ann")[1..],
            [LedgerEntry::new(-100, "Bob"), LedgerEntry::new(100, "Bob")]
        );
    }

    #[test]
    fn test_zero_transfer_only_opens_accounts() {
        let mut book = AccountBook::new();
        book.transfer("Ann", "Bob", 0).unwrap();
        assert_eq!(book.entries("Ann").len(), 1);
        assert_eq!(book.entries("Bob").len(), 1);
    }

    #[test]
    fn test_negative_transfer_rejected() {
        let mut book = AccountBook::new();
        assert!(book.transfer("Ann", "Bob", -5).is_err());
        assert!(!book.contains_player("Ann"));
    }

    #[test]
    fn test_append_rejects_balance_overflow() {
        let mut book = AccountBook::new();
        book.ensure_player("Ann");
        let before = book.clone();

        assert!(matches!(
            book.append("Ann", i64::MAX, TREASURER),
            Err(EngineError::InvalidArgument(_))
        ));
        assert_eq!(book, before);

        book.append("Ann", i64::MIN + 1, TREASURER).unwrap();
        assert_eq!(book.balance("Ann"), i64::MIN + 1501);
    }

    #[test]
    fn test_transfer_overflow_appends_nothing() {
        let mut book = AccountBook::new();
        book.transfer("Ann", "Bob", 0).unwrap();
        let before = book.clone();

        assert!(matches!(
            book.transfer("Ann", "Bob", i64::MAX),
            Err(EngineError::InvalidArgument(_))
        ));
        assert_eq!(book, before);
        assert_eq!(book.balance("Bob"), 1500);
    }

    #[test]
    fn test_balance_saturates_on_loaded_overflow() {
        let book: AccountBook = serde_json::from_str(&format!(
            r#"{{"Ann": [
                {{"payment amount": 1500, "payment source": "Treasurer"}},
                {{"payment amount": {}, "payment source": "Bob"}}
            ]}}"#,
            i64::MAX
        ))
        .unwrap();
        assert_eq!(book.balance("Ann"), i64::MAX);
    }

    #[test]
    fn test_json_shape() {
        let mut book = AccountBook::new();
        book.ensure_player("Ann");
        book.append("Ann", -200, TREASURER).unwrap();

        let value = serde_json::to_value(&book).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "Ann": [
                    { "payment amount": 1500, "payment source": "Treasurer" },
                    { "payment amount": -200, "payment source": "Treasurer" }
                ]
            })
        );
    }

    #[test]
    fn test_reset() {
        let mut book = AccountBook::new();
        book.ensure_player("Ann");
        book.reset();
        assert_eq!(book.balance("Ann"), 0);
    }
}
