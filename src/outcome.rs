use crate::player::PlayerId;
use crate::state::GameState;

/// The result of a game from the searching player's point of view.
#[derive(Debug, PartialEq, Copy, Clone)]
pub enum GameOutcome {
    /// The game is still ongoing.
    InProgress = 0,
    /// The searching player has won.
    Win = 1,
    /// Another player has won.
    Lose = 2,
    /// The game ended, or was cut short, without a winner.
    Draw = 3,
}

impl GameOutcome {
    /// Reads the outcome of `state` for `player`.
    pub fn of(state: &GameState, player: PlayerId) -> Self {
        if !state.game_over {
            return GameOutcome::InProgress;
        }
        match state.game_winner_id {
            Some(winner) if winner == player => GameOutcome::Win,
            Some(_) => GameOutcome::Lose,
            None => GameOutcome::Draw,
        }
    }

    /// Reward backpropagated through the tree.
    pub fn reward(self) -> f64 {
        match self {
            GameOutcome::Win => 1.0,
            GameOutcome::Lose => -1.0,
            GameOutcome::Draw | GameOutcome::InProgress => 0.0,
        }
    }
}
