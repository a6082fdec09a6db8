use super::outcome::{
    ClassPurchase, GameStart, RentBasis, RentQuote, RentTransfer, ResidentialAssignment,
    TreasuryAction, TreasurySettlement,
};
use crate::domain::catalog::{AreaCatalog, ClassCatalog, RevenueKind};
use crate::domain::holding::{ClassAcquisition, Holding, OwnershipBook, PlayerHoldings};
use crate::domain::ledger::{AccountBook, GAME_START, LedgerEntry, TREASURER};
use crate::domain::player::{non_negative, required_name};
use crate::domain::ports::{LedgerStoreBox, OwnershipStoreBox, StoreLock};
use crate::error::{EngineError, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{error, info, warn};

pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// The engine's public surface.
///
/// `TransactionCoordinator` executes each economic operation as one unit
/// over the ownership registry and the account ledger. Every mutation
/// locks the ownership store and then the ledger, loads both, computes the
/// new state in memory and only then writes, ownership first. A rejected
/// operation writes nothing.
///
/// Catalogs are optional capabilities: without an area catalog, residential
/// assignments are neither validated nor charged; without a class catalog,
/// class assets cost nothing. Without a ledger, only ownership is tracked
/// and money-moving operations fail with `LedgerNotConfigured`.
pub struct TransactionCoordinator {
    ownership: OwnershipStoreBox,
    ledger: Option<LedgerStoreBox>,
    areas: Option<AreaCatalog>,
    classes: Option<ClassCatalog>,
    lock_timeout: Duration,
}

/// Locks held for one read-modify-write cycle, in acquisition order.
struct Session {
    _ownership: StoreLock,
    _ledger: Option<StoreLock>,
}

/// Full contents of both stores, plus the area catalog when present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub asset_database: Option<AreaCatalog>,
    pub player_database: OwnershipBook,
    pub player_accounts: Option<AccountBook>,
}

impl TransactionCoordinator {
    /// Creates a coordinator tracking ownership only.
    pub fn new(ownership: OwnershipStoreBox) -> Self {
        Self {
            ownership,
            ledger: None,
            areas: None,
            classes: None,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_ledger(mut self, ledger: LedgerStoreBox) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn with_area_catalog(mut self, catalog: Option<AreaCatalog>) -> Self {
        self.areas = catalog;
        self
    }

    pub fn with_class_catalog(mut self, catalog: Option<ClassCatalog>) -> Self {
        self.classes = catalog;
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Assigns a residential asset to a player, or adds houses to it.
    pub async fn assign_residential_asset(
        &self,
        player: &str,
        area: &str,
        asset: &str,
        houses: i64,
    ) -> Result<ResidentialAssignment> {
        let requested = non_negative("Houses", houses)?;
        let player = required_name("Player", player)?;
        let area = required_name("Area", area)?;
        let asset = required_name("Asset", asset)?;

        let record = match &self.areas {
            Some(catalog) => match catalog.get(&area, &asset) {
                Some(record) => Some(record),
                None => {
                    warn!(%player, %area, %asset, "assignment denied: asset not in catalog");
                    return Err(EngineError::UnknownAsset { area, asset });
                }
            },
            None => None,
        };

        let _session = self.begin().await?;
        let mut ownership = self.ownership.load().await?;
        let mut accounts = self.load_ledger().await?;

        let improvement = ownership
            .assign_or_improve(&player, &area, &asset, requested)
            .inspect_err(|e| warn!(%player, %asset, error = %e, "assignment denied"))?;
        if improvement.capped {
            warn!(%player, %asset, requested, "houses capped at {}", improvement.level.value());
        }

        let mut charged = 0;
        let mut ledger_changed = false;
        if let Some(accounts) = accounts.as_mut() {
            if accounts.ensure_player(&player) {
                info!(%player, "opened account with starting balance");
                ledger_changed = true;
            }
            let cost = match record {
                Some(record) if improvement.acquired => {
                    record.acquisition_cost(improvement.level.value())
                }
                Some(record) => record.improvement_cost(improvement.added),
                None => Some(0),
            }
            .ok_or_else(|| {
                EngineError::InvalidArgument(format!(
                    "Cost of asset '{asset}' ({area}) exceeds the supported range"
                ))
            })?;
            if cost > 0 {
                accounts.append(&player, -cost, TREASURER)?;
                charged = cost;
                ledger_changed = true;
            }
        }

        self.commit(&ownership, accounts.as_ref().filter(|_| ledger_changed))
            .await?;

        info!(
            %player,
            %area,
            %asset,
            level = improvement.level.value(),
            added = improvement.added,
            charged,
            "residential asset assigned"
        );
        Ok(ResidentialAssignment {
            player,
            area,
            asset,
            requested,
            level: improvement.level.value(),
            houses_added: improvement.added,
            capped: improvement.capped,
            acquired: improvement.acquired,
            charged,
        })
    }

    /// Purchases a utility or transport asset from the Treasurer.
    pub async fn assign_class_asset(
        &self,
        player: &str,
        class: &str,
        asset: &str,
    ) -> Result<ClassPurchase> {
        let player = required_name("Player", player)?;
        let class = required_name("Class", class)?;
        let asset = required_name("Asset", asset)?;

        let _session = self.begin().await?;
        let mut ownership = self.ownership.load().await?;
        let mut accounts = self.load_ledger().await?;

        let acquisition = ownership
            .assign_class_asset(&player, &class, &asset)
            .inspect_err(|e| warn!(%player, %asset, error = %e, "purchase denied"))?;
        if acquisition == ClassAcquisition::AlreadyHeld {
            return Ok(ClassPurchase {
                player,
                class,
                asset,
                acquired: false,
                charged: 0,
            });
        }

        let price = self
            .classes
            .as_ref()
            .and_then(|catalog| catalog.get(&class, &asset))
            .and_then(|record| record.price)
            .unwrap_or_else(|| {
                warn!(%class, %asset, "no catalog price, charging nothing");
                0
            });

        let mut charged = 0;
        let mut ledger_changed = false;
        if let Some(accounts) = accounts.as_mut() {
            ledger_changed = accounts.ensure_player(&player);
            if price > 0 {
                accounts.append(&player, -price, TREASURER)?;
                charged = price;
                ledger_changed = true;
            }
        }

        self.commit(&ownership, accounts.as_ref().filter(|_| ledger_changed))
            .await?;

        info!(%player, %class, %asset, charged, "class asset purchased");
        Ok(ClassPurchase {
            player,
            class,
            asset,
            acquired: true,
            charged,
        })
    }

    /// Moves rent between two players.
    ///
    /// Both players are materialized in the ownership registry as well, so
    /// the ledger never knows a player the registry does not.
    pub async fn transfer_rent(&self, from: &str, to: &str, amount: i64) -> Result<RentTransfer> {
        non_negative("Rent amount", amount)?;
        let from = required_name("Paying player", from)?;
        let to = required_name("Receiving player", to)?;
        self.ledger_store()?;

        let _session = self.begin().await?;
        let mut ownership = self.ownership.load().await?;
        let mut accounts = self.load_ledger().await?.unwrap_or_default();

        ownership.ensure_player(&from);
        ownership.ensure_player(&to);
        accounts.transfer(&from, &to, amount)?;

        self.commit(&ownership, Some(&accounts)).await?;

        info!(%from, %to, amount, "rent transferred");
        Ok(RentTransfer {
            from_balance: accounts.balance(&from),
            to_balance: accounts.balance(&to),
            from,
            to,
            amount,
        })
    }

    /// Pays money to, or collects it from, the Treasurer.
    pub async fn settle_with_treasury(
        &self,
        player: &str,
        action: TreasuryAction,
        amount: i64,
    ) -> Result<TreasurySettlement> {
        if amount <= 0 {
            return Err(EngineError::InvalidArgument(
                "Amount must be a positive integer".to_string(),
            ));
        }
        let player = required_name("Player", player)?;
        self.ledger_store()?;

        let _session = self.begin().await?;
        let mut ownership = self.ownership.load().await?;
        let mut accounts = self.load_ledger().await?.unwrap_or_default();

        ownership.ensure_player(&player);
        accounts.ensure_player(&player);
        let signed = match action {
            TreasuryAction::Pay => -amount,
            TreasuryAction::Collect => amount,
        };
        accounts.append(&player, signed, TREASURER)?;

        self.commit(&ownership, Some(&accounts)).await?;

        info!(%player, amount = signed, "treasury settlement recorded");
        Ok(TreasurySettlement {
            balance: accounts.balance(&player),
            player,
            action,
            amount,
        })
    }

    /// Wipes both stores and seeds each player with `starting_balance`.
    pub async fn start_game<S: AsRef<str>>(
        &self,
        players: &[S],
        starting_balance: i64,
    ) -> Result<GameStart> {
        if starting_balance <= 0 {
            return Err(EngineError::InvalidArgument(
                "Starting balance must be a positive integer".to_string(),
            ));
        }
        let mut names: Vec<String> = Vec::with_capacity(players.len());
        for player in players {
            let name = required_name("Player", player.as_ref())?;
            if !names.contains(&name) {
                names.push(name);
            }
        }
        if names.is_empty() {
            return Err(EngineError::InvalidArgument(
                "At least one player is required".to_string(),
            ));
        }
        self.ledger_store()?;

        let _session = self.begin().await?;
        let mut ownership = OwnershipBook::new();
        let mut accounts = AccountBook::new();
        for name in &names {
            ownership.ensure_player(name);
            accounts.open(name, starting_balance, GAME_START);
        }

        self.commit(&ownership, Some(&accounts)).await?;

        info!(players = names.len(), starting_balance, "game started");
        Ok(GameStart {
            players: names,
            starting_balance,
        })
    }

    /// Wipes both stores.
    pub async fn reset_game(&self) -> Result<()> {
        let _session = self.begin().await?;
        let accounts = self.ledger.as_ref().map(|_| AccountBook::new());
        self.commit(&OwnershipBook::new(), accounts.as_ref()).await?;
        info!("game reset, all player data cleared");
        Ok(())
    }

    pub async fn holdings(&self, player: &str) -> Result<PlayerHoldings> {
        Ok(self.ownership.load().await?.get(player.trim()))
    }

    pub async fn balance(&self, player: &str) -> Result<i64> {
        Ok(self.ledger_store()?.load().await?.balance(player.trim()))
    }

    pub async fn statement(&self, player: &str) -> Result<Vec<LedgerEntry>> {
        Ok(self
            .ledger_store()?
            .load()
            .await?
            .entries(player.trim())
            .to_vec())
    }

    /// Every player known to either store, sorted.
    pub async fn players(&self) -> Result<Vec<String>> {
        let mut names: BTreeSet<String> =
            self.ownership.load().await?.players().map(str::to_string).collect();
        if let Some(accounts) = self.load_ledger().await? {
            names.extend(accounts.players().map(str::to_string));
        }
        Ok(names.into_iter().collect())
    }

    pub async fn snapshot(&self) -> Result<GameSnapshot> {
        Ok(GameSnapshot {
            asset_database: self.areas.clone(),
            player_database: self.ownership.load().await?,
            player_accounts: self.load_ledger().await?,
        })
    }

    /// Area names from the catalog; empty without one.
    pub fn areas(&self) -> Vec<String> {
        self.areas.as_ref().map(AreaCatalog::areas).unwrap_or_default()
    }

    pub fn assets(&self, area: &str) -> Option<Vec<String>> {
        self.areas.as_ref()?.assets(area.trim())
    }

    pub fn classes(&self) -> Vec<String> {
        self.classes
            .as_ref()
            .map(ClassCatalog::classes)
            .unwrap_or_default()
    }

    pub fn class_assets(&self, class: &str) -> Option<Vec<String>> {
        self.classes.as_ref()?.assets(class.trim())
    }

    /// Rent due to the owner of `asset`, or `None` if nobody owns it.
    ///
    /// Residential rent follows the owner's house count; class assets look
    /// up the owner's count of assets in the same class.
    pub async fn quote_rent(&self, asset: &str) -> Result<Option<RentQuote>> {
        let asset = required_name("Asset", asset)?;
        let ownership = self.ownership.load().await?;
        let Some(owner) = ownership.find_owner(&asset) else {
            return Ok(None);
        };
        let missing = || EngineError::UnknownAsset {
            area: owner.group.clone(),
            asset: asset.clone(),
        };

        let (basis, amount) = match owner.holding {
            Holding::Residential { level } => {
                let record = self
                    .areas
                    .as_ref()
                    .and_then(|catalog| catalog.get(&owner.group, &asset))
                    .ok_or_else(missing)?;
                (
                    RentBasis::Houses {
                        level: level.value(),
                    },
                    record.rent.at(level),
                )
            }
            Holding::Class => {
                let owned = ownership.owned_in_group(&owner.player, &owner.group);
                let (kind, amount) = self
                    .classes
                    .as_ref()
                    .and_then(|catalog| catalog.get(&owner.group, &asset))
                    .and_then(|record| record.revenue(owned))
                    .ok_or_else(missing)?;
                let basis = match kind {
                    RevenueKind::Multiplier => RentBasis::Multiplier { owned },
                    RevenueKind::Ticket => RentBasis::Ticket { owned },
                };
                (basis, amount)
            }
        };

        Ok(Some(RentQuote {
            owner: owner.player,
            group: owner.group,
            asset,
            basis,
            amount,
        }))
    }

    fn ledger_store(&self) -> Result<&LedgerStoreBox> {
        self.ledger.as_ref().ok_or(EngineError::LedgerNotConfigured)
    }

    async fn load_ledger(&self) -> Result<Option<AccountBook>> {
        match &self.ledger {
            Some(store) => Ok(Some(store.load().await?)),
            None => Ok(None),
        }
    }

    /// Locks ownership, then the ledger. Always in this order.
    async fn begin(&self) -> Result<Session> {
        let ownership = self.ownership.lock(self.lock_timeout).await?;
        let ledger = match &self.ledger {
            Some(store) => Some(store.lock(self.lock_timeout).await?),
            None => None,
        };
        Ok(Session {
            _ownership: ownership,
            _ledger: ledger,
        })
    }

    /// Writes ownership, then the ledger if it changed.
    ///
    /// A ledger failure after the ownership write leaves the stores out of
    /// step; that is reported as `PartialCommit` and logged with
    /// `partial_commit = true` so it can be reconciled by hand.
    async fn commit(&self, ownership: &OwnershipBook, accounts: Option<&AccountBook>) -> Result<()> {
        self.ownership.save(ownership).await?;

        let (Some(store), Some(accounts)) = (&self.ledger, accounts) else {
            return Ok(());
        };
        if let Err(source) = store.save(accounts).await {
            error!(
                partial_commit = true,
                ownership = %self.ownership.location(),
                ledger = %store.location(),
                error = %source,
                "ownership saved but ledger write failed; stores disagree"
            );
            return Err(EngineError::PartialCommit {
                store: store.location(),
                source: Box::new(source),
            });
        }
        Ok(())
    }
}
