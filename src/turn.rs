//! Plays a whole Build turn for a computer player.
//!
//! The search runs on a copy of the current state. Its best line is then replayed on the
//! real state with plain [`Rules::apply`], so the caller sees exactly the snapshots a human
//! making the same moves would have produced.

use crate::config::SearchConfig;
use crate::mcts::{MonteCarloTreeSearch, SearchError};
use crate::moves::{END_TURN, Move};
use crate::random::SeededRandomGenerator;
use crate::reducer::Rules;
use crate::state::{GameState, Phase};
use std::time::Instant;
use tracing::{debug, info, warn};

/// What a computer turn did.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// Names of the moves applied, ending with the end-turn move when a turn was played.
    pub moves: Vec<String>,
    /// The state after the last move.
    pub state: GameState,
    /// Search iterations actually run.
    pub iterations: u32,
}

/// A computer opponent bound to a rule set and a search budget.
#[derive(Debug, Clone)]
pub struct ComputerPlayer<'a> {
    rules: &'a Rules,
    search: SearchConfig,
}

impl<'a> ComputerPlayer<'a> {
    pub fn new(rules: &'a Rules, search: SearchConfig) -> Self {
        Self { rules, search }
    }

    /// Searches and plays the active player's turn, returning the moves taken.
    ///
    /// A finished game or a Battle-phase state is returned unchanged with no moves.
    pub fn plan_turn(&self, state: &GameState) -> Result<TurnOutcome, SearchError> {
        if state.game_over || state.phase == Phase::Battle {
            warn!(
                game_over = state.game_over,
                phase = ?state.phase,
                "no turn to play"
            );
            return Ok(TurnOutcome {
                moves: Vec::new(),
                state: state.clone(),
                iterations: 0,
            });
        }

        let player_id = state.active_player_id;
        let seed = self
            .search
            .seed
            .or_else(|| state.active_player().map(|p| p.seed))
            .unwrap_or_default();
        debug!(%player_id, round = state.round, seed, "computer turn started");

        let started = Instant::now();
        let mut mcts = MonteCarloTreeSearch::builder(self.rules, state.clone())
            .with_random_generator(SeededRandomGenerator::new(seed))
            .with_config(&self.search)
            .build();
        let iterations = mcts.iterate_n_times(self.search.iterations)?;
        let line = mcts.best_line();
        info!(
            %player_id,
            iterations,
            nodes = mcts.node_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search finished"
        );

        let mut current = state.clone();
        let mut moves = Vec::with_capacity(line.len() + 1);
        for chosen in &line {
            current = chosen.apply(self.rules, &current)?;
            moves.push(chosen.name.clone());
        }
        if !line.last().is_some_and(Move::is_end_turn) {
            current = Move::end_turn().apply(self.rules, &current)?;
            moves.push(END_TURN.to_string());
        }

        debug!(
            %player_id,
            moves = moves.len(),
            game_over = current.game_over,
            "computer turn finished"
        );
        Ok(TurnOutcome {
            moves,
            state: current,
            iterations,
        })
    }

    /// Like [`ComputerPlayer::plan_turn`], keeping only the resulting state.
    pub fn play_turn(&self, state: &GameState) -> Result<GameState, SearchError> {
        self.plan_turn(state).map(|outcome| outcome.state)
    }
}

/// Plays the active player's Build turn with a fresh [`ComputerPlayer`].
pub fn play_computer_turn(
    rules: &Rules,
    search: &SearchConfig,
    state: &GameState,
) -> Result<GameState, SearchError> {
    ComputerPlayer::new(rules, search.clone()).play_turn(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::config::GameConfig;
    use crate::dictionary::WordList;
    use crate::letter::{Letter, LetterOrigin};
    use crate::player::PlayerId;
    use crate::state::PlayerSetup;

    fn letters(state: &mut GameState, word: &str, origin: LetterOrigin) -> Vec<Letter> {
        word.chars()
            .map(|c| {
                let id = state.letter_ids.next_id();
                Letter::from_glyph(id, c, origin).unwrap()
            })
            .collect()
    }

    fn last_chance() -> GameState {
        let mut state = GameState::new(
            &GameConfig::default(),
            &[PlayerSetup::human("Ada"), PlayerSetup::computer("Bot")],
            99,
        );
        let rack = letters(&mut state, "ae", LetterOrigin::Rack);
        let pool = letters(&mut state, "ze", LetterOrigin::Pool);
        let human = state.player_mut(PlayerId(1)).unwrap();
        human.rack = rack;
        human.health = 1;
        let bot = state.player_mut(PlayerId(2)).unwrap();
        bot.rack.clear();
        bot.pool = pool;
        bot.gold = 3;
        bot.health = 1;
        state.active_player_id = PlayerId(2);
        state.sync_active();
        state
    }

    #[test]
    fn computer_buys_its_way_to_victory() {
        // arrange
        let rules = Rules::new(GameConfig::default(), WordList::default());
        let player = ComputerPlayer::new(
            &rules,
            SearchConfig::default().with_iterations(2000).with_seed(17),
        );

        // act
        let outcome = player.plan_turn(&last_chance()).unwrap();

        // assert
        assert!(outcome.moves[0].starts_with("buy-letter-z"), "{:?}", outcome.moves);
        assert_eq!(outcome.moves.last().map(String::as_str), Some(END_TURN));
        assert!(outcome.state.game_over);
        assert_eq!(outcome.state.game_winner_id, Some(PlayerId(2)));
        assert_eq!(outcome.iterations, 2000);
    }

    #[test]
    fn first_turn_hands_over_to_next_player() {
        // arrange
        let rules = Rules::new(GameConfig::default(), WordList::new(["cat", "ten", "at"]));
        let state = GameState::new(
            &GameConfig::default(),
            &[PlayerSetup::computer("A"), PlayerSetup::computer("B")],
            8,
        );

        // act
        let next = play_computer_turn(
            &rules,
            &SearchConfig::default().with_iterations(20),
            &state,
        )
        .unwrap();

        // assert
        assert_eq!(next.active_player_id, PlayerId(2));
        assert_eq!(next.phase, Phase::Build);
        assert!(next.player(PlayerId(1)).unwrap().completed_turn);
        assert_eq!(state.active_player_id, PlayerId(1));
    }

    #[test]
    fn same_seed_same_turn() {
        let rules = Rules::new(GameConfig::default(), WordList::default());
        let player = ComputerPlayer::new(&rules, SearchConfig::default().with_iterations(50));
        let state = last_chance();
        assert_eq!(
            player.plan_turn(&state).unwrap(),
            player.plan_turn(&state).unwrap()
        );
    }

    #[test]
    fn battle_and_finished_games_are_left_alone() {
        let rules = Rules::new(GameConfig::default(), WordList::default());
        let player = ComputerPlayer::new(&rules, SearchConfig::default().with_iterations(10));

        let mut state = last_chance();
        state.player_mut(PlayerId(2)).unwrap().health = 10;
        let battle = rules.apply(&state, &Action::EndTurn).unwrap();
        assert_eq!(battle.phase, Phase::Battle);
        let outcome = player.plan_turn(&battle).unwrap();
        assert!(outcome.moves.is_empty());
        assert_eq!(outcome.state, battle);

        let mut over = last_chance();
        over.game_over = true;
        assert_eq!(player.play_turn(&over).unwrap(), over);
    }
}
