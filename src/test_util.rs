// Test utilities shared by unit tests and the integration tests in "tests".

use crate::board_edit::BoardSnapshot;
use crate::item::{Item, ItemCounts};
use crate::request::PlayerAction;
use crate::side::Side;
use crate::snapshot::{GameSnapshot, LastAction, TurnId};


// A quiet local turn: nothing locked, nothing happened yet, three shells left.
pub fn sample_snapshot(turn_id: i64) -> GameSnapshot {
    GameSnapshot {
        turn_id: TurnId::new(turn_id),
        turn: Side::Local,
        lock: false,
        active_items: ItemCounts::from_entries([(Item::Handcuffs, 0.0), (Item::Saw, 0.0)]),
        known_shell: None,
        last_action: LastAction::none(),
        shotgun_info: (2, 3),
        max_charges: 4,
        charges: (4, 4),
        shotgun: vec![true, false, true],
        player_items: ItemCounts::from_entries([(Item::Beer, 1), (Item::Saw, 1)]),
        op_items: ItemCounts::from_entries([(Item::Cigarettes, 2)]),
        moves: vec![
            PlayerAction::ShootOpponent,
            PlayerAction::ShootSelf,
            PlayerAction::UseItem(Item::Beer),
            PlayerAction::UseItem(Item::Saw),
        ],
    }
}

// Snapshot taken right after the opponent fired, while the server waits for the client.
pub fn opponent_fired_snapshot(turn_id: i64, action: PlayerAction) -> GameSnapshot {
    GameSnapshot {
        lock: true,
        last_action: LastAction::new(1, action.wire_name()).with_result(true),
        ..sample_snapshot(turn_id)
    }
}

pub fn sample_board() -> BoardSnapshot {
    BoardSnapshot {
        max_charges: 4,
        current_turn: Side::Local,
        charges: (3, 2),
        items: (
            ItemCounts::from_entries([(Item::Beer, 2), (Item::Handcuffs, 1)]),
            ItemCounts::from_entries([(Item::Saw, 1)]),
        ),
        active_items: ItemCounts::from_entries([(Item::Handcuffs, 0.5)]),
        skip_next: true,
        chamber_public: None,
    }
}
