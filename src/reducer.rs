//! The game state machine.
//!
//! [`Rules::apply`] is the single source of truth for every legal transition. It never
//! touches its input: each call clones the snapshot, advances every player's seed, applies
//! the action to the clone and returns it. A transition that cannot happen (not enough
//! gold, full rack, unknown letter or player) returns the input unchanged instead.

use crate::action::{Action, DropTarget};
use crate::config::GameConfig;
use crate::dictionary::Dictionary;
use crate::letter::{Letter, LetterId, LetterOrigin};
use crate::player::PlayerId;
use crate::state::{GameState, Phase};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq)]
pub enum TransitionError {
    #[error("invalid transition {action} in {phase:?} phase")]
    InvalidTransition { action: &'static str, phase: Phase },
}

/// Game configuration plus the word predicate: everything a transition needs besides the state.
#[derive(Clone)]
pub struct Rules {
    pub config: GameConfig,
    pub dictionary: Arc<dyn Dictionary + Send + Sync>,
}

impl fmt::Debug for Rules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rules")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Rules {
    pub fn new(config: GameConfig, dictionary: impl Dictionary + Send + Sync + 'static) -> Self {
        Self {
            config,
            dictionary: Arc::new(dictionary),
        }
    }

    pub fn round_score(&self, state: &GameState, id: PlayerId) -> Option<u32> {
        state
            .player(id)
            .map(|p| p.round_score(self.dictionary.as_ref()))
    }

    /// Applies one action and returns the next snapshot.
    ///
    /// Errors only on transitions that are invalid in the current phase, which means the
    /// caller's transition table is broken.
    pub fn apply(&self, state: &GameState, action: &Action) -> Result<GameState, TransitionError> {
        let mut draft = state.clone();
        if !action.replaces_state() {
            draft.advance_seeds();
        }

        let next = match action {
            Action::Set(whole) => Some((**whole).clone()),
            Action::RestartGame(whole) => Some(GameState {
                game_count: state.game_count + 1,
                ..(**whole).clone()
            }),
            Action::EndTurn => self.end_turn(draft),
            Action::IncrementRound => Some(self.increment_round(draft)?),
            Action::BuyLetter { letter_id, index } => self.buy_letter(draft, *letter_id, *index),
            Action::SellLetter { letter_id } => self.sell_letter(draft, *letter_id),
            Action::ToggleFreeze { letter_id } => toggle_freeze(draft, *letter_id),
            Action::SpendGold { amount } => spend_gold(draft, *amount),
            Action::SelectLetter { letter_id } => {
                let letter = draft.find_letter(*letter_id).cloned();
                letter.map(|l| {
                    draft.selected_letter = Some(l);
                    draft
                })
            }
            Action::DeselectLetter => {
                draft.selected_letter = None;
                Some(draft)
            }
            Action::SetDraggingLetter { letter_id: None } => {
                draft.dragging_letter = None;
                Some(draft)
            }
            Action::SetDraggingLetter {
                letter_id: Some(letter_id),
            } => {
                let letter = draft.find_letter(*letter_id).cloned();
                letter.map(|l| {
                    draft.dragging_letter = Some(l);
                    draft
                })
            }
            Action::DragLetterToRack { letter_id, over } => {
                self.drag_letter_to_rack(draft, *letter_id, *over)
            }
            Action::MoveLetterInRack { letter_id, over_id } => {
                move_letter_in_rack(draft, *letter_id, *over_id)
            }
            Action::RemoveLetterFromRack { letter_id } => {
                let capacity = self.config.pool_capacity_for_round(draft.round);
                remove_letter_from_rack(draft, *letter_id, capacity)
            }
            Action::SetLetterOrigins => set_letter_origins(draft),
            Action::RefreshPool => self.refresh_pool(draft),
        };

        Ok(next.unwrap_or_else(|| state.clone()))
    }

    fn buy_letter(
        &self,
        mut draft: GameState,
        letter_id: LetterId,
        index: Option<usize>,
    ) -> Option<GameState> {
        let cost = self.config.letter_buy_cost;
        let capacity = self.config.rack_capacity;
        let player = draft.active_player_mut()?;
        if player.rack.len() >= capacity || player.gold < cost {
            return None;
        }

        let from = player.pool_position(letter_id)?;
        let letter = player.pool.remove(from).with_origin(LetterOrigin::Rack);
        let at = index.unwrap_or(player.rack.len()).min(player.rack.len());
        player.rack.insert(at, letter);
        player.gold -= cost;

        draft.selected_letter = None;
        draft.sync_active();
        Some(draft)
    }

    /// Refunds the sell value and hands the letter back to the pool if it has room.
    fn sell_letter(&self, mut draft: GameState, letter_id: LetterId) -> Option<GameState> {
        let refund = self.config.letter_sell_value;
        let capacity = self.config.pool_capacity_for_round(draft.round);
        let player = draft.active_player_mut()?;
        let from = player.rack_position(letter_id)?;
        let letter = player.rack.remove(from);
        return_to_pool(&mut player.pool, letter, capacity);
        player.gold += refund;

        draft.selected_letter = None;
        draft.sync_active();
        Some(draft)
    }

    fn refresh_pool(&self, mut draft: GameState) -> Option<GameState> {
        let cost = self.config.pool_refresh_cost;
        let player = draft.active_player_mut()?;
        if player.gold < cost {
            return None;
        }
        player.gold -= cost;

        let (id, round) = (draft.active_player_id, draft.round);
        draft.refresh_player_pool(id, round, &self.config);
        draft.sync_active();
        Some(draft)
    }

    fn drag_letter_to_rack(
        &self,
        mut draft: GameState,
        letter_id: LetterId,
        over: DropTarget,
    ) -> Option<GameState> {
        let capacity = self.config.rack_capacity;
        let player = draft.active_player_mut()?;

        let letter = if let Some(from) = player.rack_position(letter_id) {
            player.rack.remove(from)
        } else {
            let from = player.pool_position(letter_id)?;
            if player.rack.len() >= capacity {
                return None;
            }
            player.pool.remove(from)
        };

        let at = match over {
            DropTarget::Rack => player.rack.len(),
            DropTarget::Letter(over_id) => player
                .rack_position(over_id)
                .unwrap_or(player.rack.len()),
        };
        player
            .rack
            .insert(at, letter.with_origin(LetterOrigin::Rack));

        draft.selected_letter = None;
        draft.sync_active();
        Some(draft)
    }

    /// Resolves the round when the last player in turn order ends their turn.
    fn end_turn(&self, mut draft: GameState) -> Option<GameState> {
        let ended = draft.player_index(draft.active_player_id)?;
        let count = draft.players.len();
        draft.players[ended].completed_turn = true;
        let next_id = draft.players[(ended + 1) % count].id;

        draft.active_player_id = next_id;
        draft.selected_letter = None;
        draft.dragging_letter = None;

        if ended + 1 < count {
            let round = draft.round;
            draft.refresh_player_pool(next_id, round, &self.config);
            let initial_gold = self.config.initial_gold;
            if let Some(next) = draft.player_mut(next_id) {
                next.gold = initial_gold;
            }
            draft.sync_active();
            return Some(draft);
        }

        let winner = self.battle_winner(&draft);
        if let Some(winner_id) = winner {
            let cost = self.config.health_cost_for_round(draft.round);
            for player in &mut draft.players {
                if player.id == winner_id {
                    player.battle_victories += 1;
                } else {
                    player.health -= cost;
                }
            }
        }

        let game_over = winner.is_some()
            && draft.players.iter().any(|p| {
                p.health <= self.config.health_to_lose
                    || p.battle_victories >= self.config.battle_victories_to_win
            });

        debug!(round = draft.round, ?winner, game_over, "battle resolved");

        draft.battle_winner_id = winner;
        if game_over {
            draft.game_over = true;
            draft.game_winner_id = winner;
        } else {
            draft.phase = Phase::Battle;
        }
        draft.sync_active();
        Some(draft)
    }

    /// The single player with the strictly highest round score, `None` on a tie at the top.
    pub fn battle_winner(&self, state: &GameState) -> Option<PlayerId> {
        let dictionary = self.dictionary.as_ref();
        let mut best: Option<(PlayerId, u32)> = None;
        let mut tied = false;
        for player in &state.players {
            let score = player.round_score(dictionary);
            match best {
                Some((_, top)) if score == top => tied = true,
                Some((_, top)) if score < top => {}
                _ => {
                    best = Some((player.id, score));
                    tied = false;
                }
            }
        }
        if tied { None } else { best.map(|(id, _)| id) }
    }

    fn increment_round(&self, mut draft: GameState) -> Result<GameState, TransitionError> {
        if draft.phase != Phase::Battle {
            return Err(TransitionError::InvalidTransition {
                action: Action::IncrementRound.kind(),
                phase: draft.phase,
            });
        }

        draft.round += 1;
        for player in &mut draft.players {
            player.gold = self.config.initial_gold;
            player.completed_turn = false;
        }

        if let Some(first_id) = draft.players.first().map(|p| p.id) {
            let round = draft.round;
            draft.refresh_player_pool(first_id, round, &self.config);
            draft.active_player_id = first_id;
        }

        draft.phase = Phase::Build;
        draft.battle_winner_id = None;
        draft.selected_letter = None;
        draft.dragging_letter = None;
        draft.sync_active();
        Ok(draft)
    }
}

fn toggle_freeze(mut draft: GameState, letter_id: LetterId) -> Option<GameState> {
    let player = draft.active_player_mut()?;
    let at = player.pool_position(letter_id)?;
    player.pool[at] = player.pool[at].toggled();

    draft.selected_letter = None;
    draft.sync_active();
    Some(draft)
}

fn spend_gold(mut draft: GameState, amount: u32) -> Option<GameState> {
    let player = draft.active_player_mut()?;
    player.gold = player.gold.checked_sub(amount)?;
    draft.sync_active();
    Some(draft)
}

fn move_letter_in_rack(
    mut draft: GameState,
    letter_id: LetterId,
    over_id: LetterId,
) -> Option<GameState> {
    let player = draft.active_player_mut()?;
    let from = player.rack_position(letter_id)?;
    let to = player.rack_position(over_id)?;
    let letter = player.rack.remove(from);
    player.rack.insert(to, letter);

    draft.sync_active();
    Some(draft)
}

fn remove_letter_from_rack(
    mut draft: GameState,
    letter_id: LetterId,
    capacity: usize,
) -> Option<GameState> {
    let player = draft.active_player_mut()?;
    let from = player.rack_position(letter_id)?;
    let letter = player.rack.remove(from);
    return_to_pool(&mut player.pool, letter, capacity);

    draft.sync_active();
    Some(draft)
}

/// Puts a letter leaving the rack back in the pool. A full pool discards it.
fn return_to_pool(pool: &mut Vec<Letter>, letter: Letter, capacity: usize) {
    if pool.len() < capacity {
        pool.push(letter.with_origin(LetterOrigin::Pool));
    }
}

fn set_letter_origins(mut draft: GameState) -> Option<GameState> {
    let player = draft.active_player_mut()?;
    for letter in &mut player.rack {
        letter.origin = LetterOrigin::Rack;
    }
    for letter in &mut player.pool {
        letter.origin = LetterOrigin::Pool;
    }

    draft.sync_active();
    Some(draft)
}
