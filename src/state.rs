use crate::config::GameConfig;
use crate::letter::{Letter, LetterId, LetterIds};
use crate::player::{Player, PlayerClassification, PlayerId};
use crate::random::advance_seed;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Build,
    Battle,
}

/// Who takes part in a new game.
#[derive(Debug, Clone)]
pub struct PlayerSetup {
    pub name: String,
    pub classification: PlayerClassification,
}

impl PlayerSetup {
    pub fn human(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classification: PlayerClassification::Human,
        }
    }

    pub fn computer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classification: PlayerClassification::Computer,
        }
    }
}

/// The root snapshot of a game.
///
/// `gold`, `rack` and `pool` mirror the active player's fields and are re-synced after
/// every transition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameState {
    /// Players in turn order.
    pub players: Vec<Player>,
    pub active_player_id: PlayerId,
    pub round: u32,
    pub phase: Phase,
    pub gold: u32,
    pub rack: Vec<Letter>,
    pub pool: Vec<Letter>,
    /// Winner of the last resolved battle, `None` on a draw or before any battle.
    pub battle_winner_id: Option<PlayerId>,
    pub game_winner_id: Option<PlayerId>,
    pub game_over: bool,
    pub game_count: u32,
    pub selected_letter: Option<Letter>,
    pub dragging_letter: Option<Letter>,
    pub letter_ids: LetterIds,
}

impl GameState {
    /// Starts a game at the configured initial round with full pools.
    ///
    /// Player ids are assigned in setup order starting at 1. Each player's seed is
    /// derived from `seed`.
    pub fn new(config: &GameConfig, setups: &[PlayerSetup], seed: u64) -> Self {
        let mut letter_ids = LetterIds::default();
        let mut player_seed = seed;
        let players: Vec<Player> = setups
            .iter()
            .enumerate()
            .map(|(i, setup)| {
                player_seed = advance_seed(player_seed);
                Player::new(
                    PlayerId(i as u32 + 1),
                    setup.name.clone(),
                    setup.classification,
                    player_seed,
                    config,
                    &mut letter_ids,
                )
            })
            .collect();

        let first = players.first();
        let mut state = Self {
            active_player_id: first.map_or(PlayerId(0), |p| p.id),
            gold: first.map_or(config.initial_gold, |p| p.gold),
            rack: Vec::new(),
            pool: Vec::new(),
            players,
            round: config.initial_round,
            phase: Phase::Build,
            battle_winner_id: None,
            game_winner_id: None,
            game_over: false,
            game_count: 0,
            selected_letter: None,
            dragging_letter: None,
            letter_ids,
        };
        state.sync_active();
        state
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn active_player(&self) -> Option<&Player> {
        self.player(self.active_player_id)
    }

    pub fn active_player_mut(&mut self) -> Option<&mut Player> {
        let id = self.active_player_id;
        self.player_mut(id)
    }

    pub fn player_index(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    /// Finds a letter in the active rack or pool.
    pub fn find_letter(&self, letter_id: LetterId) -> Option<&Letter> {
        self.rack
            .iter()
            .chain(self.pool.iter())
            .find(|l| l.id == letter_id)
    }

    /// Copies the active player's gold, rack and pool into the mirrors.
    pub fn sync_active(&mut self) {
        let Some(active) = self.active_player() else {
            return;
        };
        let (gold, rack, pool) = (active.gold, active.rack.clone(), active.pool.clone());
        self.gold = gold;
        self.rack = rack;
        self.pool = pool;
    }

    /// Steps every player's seed once.
    pub fn advance_seeds(&mut self) {
        for player in &mut self.players {
            player.seed = advance_seed(player.seed);
        }
    }

    /// Re-rolls a player's pool for `round` from their current seed.
    pub fn refresh_player_pool(&mut self, id: PlayerId, round: u32, config: &GameConfig) -> bool {
        let Self {
            players,
            letter_ids,
            ..
        } = self;
        match players.iter_mut().find(|p| p.id == id) {
            Some(player) => {
                player.refresh_pool(round, config, letter_ids);
                true
            }
            None => false,
        }
    }
}
