use estate_ledger::domain::holding::{Holding, ImprovementLevel, OwnershipBook};
use estate_ledger::error::EngineError;
use proptest::prelude::*;

const PLAYERS: [&str; 3] = ["Ann", "Bob", "Cat"];
const GROUPS: [&str; 3] = ["Brown", "Dark Blue", "Utilities"];
const ASSETS: [&str; 4] = ["Boardwalk", "Park Place", "Old Kent Road", "Water Works"];

#[derive(Debug, Clone)]
enum Op {
    Residential {
        player: usize,
        group: usize,
        asset: usize,
        delta: u64,
    },
    Class {
        player: usize,
        group: usize,
        asset: usize,
    },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..3usize, 0..3usize, 0..4usize, 0..8u64).prop_map(|(player, group, asset, delta)| {
            Op::Residential {
                player,
                group,
                asset,
                delta,
            }
        }),
        (0..3usize, 0..3usize, 0..4usize)
            .prop_map(|(player, group, asset)| Op::Class { player, group, asset }),
    ]
}

fn apply(book: &mut OwnershipBook, op: &Op) -> Result<(), EngineError> {
    match *op {
        Op::Residential {
            player,
            group,
            asset,
            delta,
        } => book
            .assign_or_improve(PLAYERS[player], GROUPS[group], ASSETS[asset], delta)
            .map(|_| ()),
        Op::Class {
            player,
            group,
            asset,
        } => book
            .assign_class_asset(PLAYERS[player], GROUPS[group], ASSETS[asset])
            .map(|_| ()),
    }
}

/// Every (player, group, asset, holding) record in the book.
fn records(book: &OwnershipBook) -> Vec<(String, String, String, Holding)> {
    let mut out = Vec::new();
    for player in book.players() {
        for (group, assets) in book.get(player) {
            for (asset, holding) in assets {
                out.push((player.to_string(), group.clone(), asset, holding));
            }
        }
    }
    out
}

proptest! {
    #[test]
    fn asset_names_stay_exclusive(ops in prop::collection::vec(op(), 0..40)) {
        let mut book = OwnershipBook::new();
        for op in &ops {
            let _ = apply(&mut book, op);
        }

        let all = records(&book);
        for asset in ASSETS {
            let holders = all.iter().filter(|(_, _, a, _)| a == asset).count();
            prop_assert!(holders <= 1, "{asset} held {holders} times");
        }
        for (_, _, _, holding) in &all {
            if let Some(level) = holding.level() {
                prop_assert!(level <= ImprovementLevel::MAX);
            }
        }
    }

    #[test]
    fn rejected_operations_change_nothing(
        setup in prop::collection::vec(op(), 0..20),
        probe in op(),
    ) {
        let mut book = OwnershipBook::new();
        for op in &setup {
            let _ = apply(&mut book, op);
        }

        let before = book.clone();
        if let Err(e) = apply(&mut book, &probe) {
            prop_assert!(matches!(e, EngineError::OwnershipConflict { .. }), "expected OwnershipConflict");
            prop_assert_eq!(book, before);
        }
    }

    #[test]
    fn raise_caps_and_reports_added(start in 0..=4u8, delta in 0..1000u64) {
        let level = ImprovementLevel::new(start).unwrap();
        let improvement = level.raise(delta);

        let expected = (u64::from(start) + delta).min(4);
        prop_assert_eq!(u64::from(improvement.level.value()), expected);
        prop_assert_eq!(u64::from(improvement.added), expected - u64::from(start));
        prop_assert_eq!(improvement.capped, u64::from(start) + delta > 4);
        prop_assert!(!improvement.acquired);
    }

    #[test]
    fn first_assignment_is_an_acquisition(delta in 0..10u64) {
        let mut book = OwnershipBook::new();
        let improvement = book
            .assign_or_improve("Ann", "Dark Blue", "Boardwalk", delta)
            .unwrap();

        prop_assert!(improvement.acquired);
        prop_assert_eq!(u64::from(improvement.level.value()), delta.min(4));
        prop_assert_eq!(book.owned_in_group("Ann", "Dark Blue"), 1);
    }

    #[test]
    fn documents_reload_identically(ops in prop::collection::vec(op(), 0..30)) {
        let mut book = OwnershipBook::new();
        for op in &ops {
            let _ = apply(&mut book, op);
        }

        let text = serde_json::to_string(&book).unwrap();
        let reloaded: OwnershipBook = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(reloaded, book);
    }
}
