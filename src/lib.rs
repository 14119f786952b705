//! Rules engine and computer opponent for a two-phase letter-building game.
//!
//! Players take turns in a Build phase, buying letters from a private pool into a rack to
//! form a scoring word. When the last player ends their turn the racks battle: the highest
//! round score wins, the others lose health. Every transition goes through the pure
//! [`Rules::apply`] reducer, and computer players pick their moves with Monte Carlo tree
//! search over that same reducer.
//!
//! # Example
//!
//! ```rust
//! use letter_duel::config::{GameConfig, SearchConfig};
//! use letter_duel::dictionary::WordList;
//! use letter_duel::reducer::Rules;
//! use letter_duel::state::{GameState, PlayerSetup};
//! use letter_duel::turn::ComputerPlayer;
//!
//! let config = GameConfig::default();
//! let rules = Rules::new(config.clone(), WordList::new(["cat", "ten"]));
//! let state = GameState::new(
//!     &config,
//!     &[PlayerSetup::computer("Ada"), PlayerSetup::computer("Bot")],
//!     42,
//! );
//!
//! // Search a handful of iterations and play the first player's turn
//! let computer = ComputerPlayer::new(&rules, SearchConfig::default().with_iterations(50));
//! let outcome = computer.plan_turn(&state).unwrap();
//!
//! println!("Played {:?}", outcome.moves);
//! assert_eq!(outcome.state.active_player_id, state.players[1].id);
//! ```

/// Every transition the reducer understands.
pub mod action;
/// Game rules, search budget and the TOML/env configuration loader.
pub mod config;
/// The word predicate used for the length bonus.
pub mod dictionary;
/// Letters, tiers and identity.
pub mod letter;
/// The core module of the library, containing the `MonteCarloTreeSearch` implementation.
pub mod mcts;
/// Contains the `MctsNode` struct, which represents a node in the search tree.
pub mod mcts_node;
/// Legal moves of the active player and their sampling weights.
pub mod moves;
/// Game results from the searching player's point of view.
pub mod outcome;
/// Players and their derived scores.
pub mod player;
/// Pool generation and refresh.
pub mod pool;
/// Contains traits and implementations for random number generation.
pub mod random;
/// The pure game reducer.
pub mod reducer;
/// The game snapshot and new-game construction.
pub mod state;
/// The computer turn driver.
pub mod turn;

pub use action::Action;
pub use reducer::{Rules, TransitionError};
pub use state::{GameState, Phase};
pub use turn::{ComputerPlayer, TurnOutcome, play_computer_turn};
