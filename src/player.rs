use crate::config::GameConfig;
use crate::dictionary::Dictionary;
use crate::letter::{Letter, LetterId, LetterIds};
use crate::pool::{generate_pool, refresh_pool};
use crate::random::rng_for_seed;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player-{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerClassification {
    Human,
    Computer,
}

/// One participant and everything they own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub classification: PlayerClassification,
    pub health: i32,
    pub gold: u32,
    pub battle_victories: u32,
    /// Ordered hand of letters that scores this round.
    pub rack: Vec<Letter>,
    /// Letters offered for purchase.
    pub pool: Vec<Letter>,
    /// Per-player pseudo-random state, advanced once per dispatched action.
    pub seed: u64,
    /// Whether the player has ended their turn this round.
    pub completed_turn: bool,
}

impl Player {
    /// Creates a player with an empty rack and a fresh pool for `config.initial_round`.
    pub fn new(
        id: PlayerId,
        name: impl Into<String>,
        classification: PlayerClassification,
        seed: u64,
        config: &GameConfig,
        ids: &mut LetterIds,
    ) -> Self {
        let round = config.initial_round;
        let pool = generate_pool(
            config.pool_tier_for_round(round),
            config.pool_capacity_for_round(round),
            &mut rng_for_seed(seed),
            ids,
        );

        Self {
            id,
            name: name.into(),
            classification,
            health: config.initial_health,
            gold: config.initial_gold,
            battle_victories: 0,
            rack: Vec::new(),
            pool,
            seed,
            completed_turn: false,
        }
    }

    pub fn is_computer(&self) -> bool {
        self.classification == PlayerClassification::Computer
    }

    /// Rack letter names concatenated in order.
    pub fn rack_word(&self) -> String {
        self.rack.iter().map(|l| l.name).collect()
    }

    pub fn rack_score(&self) -> u32 {
        self.rack.iter().map(|l| l.value).sum()
    }

    /// Length squared when the rack spells a word, zero otherwise.
    pub fn word_bonus(&self, dictionary: &dyn Dictionary) -> u32 {
        let word = self.rack_word();
        if word.is_empty() || !dictionary.is_word(&word) {
            return 0;
        }
        let length = self.rack.len() as u32;
        length * length
    }

    pub fn round_score(&self, dictionary: &dyn Dictionary) -> u32 {
        self.rack_score() + self.word_bonus(dictionary)
    }

    pub fn rack_position(&self, letter_id: LetterId) -> Option<usize> {
        self.rack.iter().position(|l| l.id == letter_id)
    }

    pub fn pool_position(&self, letter_id: LetterId) -> Option<usize> {
        self.pool.iter().position(|l| l.id == letter_id)
    }

    /// Re-rolls the pool for `round`, keeping frozen letters in their slots.
    pub fn refresh_pool(&mut self, round: u32, config: &GameConfig, ids: &mut LetterIds) {
        self.pool = refresh_pool(
            &self.pool,
            config.pool_tier_for_round(round),
            config.pool_capacity_for_round(round),
            &mut rng_for_seed(self.seed),
            ids,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::WordList;
    use crate::letter::LetterOrigin;

    fn rack_of(word: &str) -> Vec<Letter> {
        word.chars()
            .enumerate()
            .map(|(i, c)| Letter::from_glyph(LetterId(i as u64), c, LetterOrigin::Rack).unwrap())
            .collect()
    }

    fn player() -> Player {
        Player::new(
            PlayerId(1),
            "Ada",
            PlayerClassification::Human,
            5,
            &GameConfig::default(),
            &mut LetterIds::default(),
        )
    }

    #[test]
    fn starts_with_round_one_pool() {
        let p = player();
        assert_eq!(p.pool.len(), 3);
        assert!(p.pool.iter().all(|l| l.tier == 1));
        assert!(p.rack.is_empty());
        assert_eq!(p.gold, 10);
        assert_eq!(p.health, 10);
    }

    #[test]
    fn scores_word_bonus_only_for_words() {
        // arrange
        let words = WordList::new(["cat"]);
        let mut p = player();

        // act
        p.rack = rack_of("cat");
        let word_score = p.round_score(&words);
        p.rack = rack_of("tac");
        let plain_score = p.round_score(&words);

        // assert
        assert_eq!(p.rack_score(), 9 + 1 + 1);
        assert_eq!(word_score, 11 + 9);
        assert_eq!(plain_score, 11);
    }

    #[test]
    fn empty_rack_has_no_bonus() {
        let anything = |_: &str| true;
        assert_eq!(player().round_score(&anything), 0);
    }

    #[test]
    fn refresh_follows_round_tables() {
        let config = GameConfig::default();
        let mut ids = LetterIds::default();
        let mut p = player();
        p.refresh_pool(11, &config, &mut ids);
        assert_eq!(p.pool.len(), 6);
        assert!(p.pool.iter().all(|l| l.tier <= 6));
    }
}
