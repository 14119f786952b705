//! Legal moves of the active player, each with a selection weight.
//!
//! Move names are derived from letter identity and position so the same state always
//! yields the same names; the search tree keys its children by them.

use crate::action::Action;
use crate::config::GameConfig;
use crate::reducer::{Rules, TransitionError};
use crate::state::{GameState, Phase};
use std::collections::BTreeMap;

/// Name of the move that ends the active player's turn.
pub const END_TURN: &str = "end-turn";
/// Name of the move that re-rolls the pool.
pub const REFRESH_POOL: &str = "refresh-pool";

const BUY_WEIGHT: f64 = 80.0;
const REARRANGE_WEIGHT: f64 = 70.0;
const THAW_WEIGHT: f64 = 60.0;
const REFRESH_WEIGHT: f64 = 50.0;
const FREEZE_WEIGHT: f64 = 40.0;
const SELL_WEIGHT: f64 = 20.0;
const END_TURN_WEIGHT: f64 = 5.0;

/// A named, weighted action.
#[derive(Debug, Clone, PartialEq)]
pub struct Move {
    pub name: String,
    /// Relative likelihood of being sampled. May be negative for sell moves.
    pub weight: f64,
    pub action: Action,
}

impl Move {
    pub fn new(name: impl Into<String>, weight: f64, action: Action) -> Self {
        Self {
            name: name.into(),
            weight,
            action,
        }
    }

    pub fn end_turn() -> Self {
        Move::new(END_TURN, END_TURN_WEIGHT, Action::EndTurn)
    }

    pub fn is_end_turn(&self) -> bool {
        self.name == END_TURN
    }

    pub fn apply(&self, rules: &Rules, state: &GameState) -> Result<GameState, TransitionError> {
        rules.apply(state, &self.action)
    }
}

/// Enumerates every legal move for the active player.
///
/// Finished games and the Battle phase offer nothing.
pub fn generate_moves(config: &GameConfig, state: &GameState) -> BTreeMap<String, Move> {
    let mut moves = BTreeMap::new();
    if state.game_over || state.phase == Phase::Battle {
        return moves;
    }

    let (rack, pool, gold) = (&state.rack, &state.pool, state.gold);
    let mut add = |m: Move| {
        moves.insert(m.name.clone(), m);
    };

    if gold >= config.letter_buy_cost && rack.len() < config.rack_capacity {
        for (i, letter) in pool.iter().enumerate() {
            add(Move::new(
                format!("buy-letter-{}-{}-at-{i}", letter.name, letter.id),
                BUY_WEIGHT + letter.value as f64,
                Action::BuyLetter {
                    letter_id: letter.id,
                    index: None,
                },
            ));
        }
    }

    for (i, from) in rack.iter().enumerate() {
        for (j, to) in rack.iter().enumerate() {
            if from.id == to.id {
                continue;
            }
            add(Move::new(
                format!(
                    "move-letter-{}-{}-at-{i}-to-{}-{}-at-{j}",
                    from.name, from.id, to.name, to.id
                ),
                REARRANGE_WEIGHT,
                Action::MoveLetterInRack {
                    letter_id: from.id,
                    over_id: to.id,
                },
            ));
        }
    }

    if gold >= config.pool_refresh_cost {
        add(Move::new(REFRESH_POOL, REFRESH_WEIGHT, Action::RefreshPool));
    }

    for (i, letter) in pool.iter().enumerate() {
        let (verb, base) = if letter.frozen {
            ("thaw", THAW_WEIGHT)
        } else {
            ("freeze", FREEZE_WEIGHT)
        };
        add(Move::new(
            format!("{verb}-letter-{}-{}-at-{i}", letter.name, letter.id),
            base + letter.value as f64,
            Action::ToggleFreeze {
                letter_id: letter.id,
            },
        ));
    }

    for (i, letter) in rack.iter().enumerate() {
        add(Move::new(
            format!("sell-letter-{}-{}-at-{i}", letter.name, letter.id),
            SELL_WEIGHT - letter.value as f64,
            Action::SellLetter {
                letter_id: letter.id,
            },
        ));
    }

    add(Move::end_turn());
    moves
}
