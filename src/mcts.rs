use crate::action::Action;
use crate::config::SearchConfig;
use crate::mcts_node::MctsNode;
use crate::moves::{Move, generate_moves};
use crate::outcome::GameOutcome;
use crate::player::PlayerId;
use crate::random::{RandomGenerator, StandardRandomGenerator};
use crate::reducer::{Rules, TransitionError};
use crate::state::{GameState, Phase};
use ego_tree::{NodeId, Tree};
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("transition failed during search: {0}")]
    Transition(#[from] TransitionError),
    #[error("search tree has no node {0:?}")]
    DanglingNode(NodeId),
}

/// The main struct for running the Monte Carlo Tree Search algorithm.
///
/// It owns the search tree, the untouched root state and one working copy that each
/// iteration rebuilds from the root by replaying the moves along its path.
pub struct MonteCarloTreeSearch<'a, K: RandomGenerator> {
    rules: &'a Rules,
    tree: Tree<MctsNode>,
    root_id: NodeId,
    root_state: GameState,
    working: GameState,
    player_id: PlayerId,
    random: K,
    exploration: f64,
    max_rollout_steps: usize,
    next_action: MctsAction,
}

/// A builder for creating instances of `MonteCarloTreeSearch`.
pub struct MonteCarloTreeSearchBuilder<'a, K: RandomGenerator> {
    rules: &'a Rules,
    state: GameState,
    player_id: Option<PlayerId>,
    random_generator: K,
    exploration: f64,
    max_rollout_steps: usize,
}

impl<'a, K: RandomGenerator> MonteCarloTreeSearchBuilder<'a, K> {
    /// Creates a new builder searching on behalf of the active player of `state`.
    pub fn new(rules: &'a Rules, state: GameState) -> Self {
        let defaults = SearchConfig::default();
        Self {
            rules,
            state,
            player_id: None,
            random_generator: K::default(),
            exploration: defaults.exploration,
            max_rollout_steps: defaults.max_rollout_steps,
        }
    }

    /// Sets the random number generator for the MCTS search.
    pub fn with_random_generator(mut self, rg: K) -> Self {
        self.random_generator = rg;
        self
    }

    /// Searches on behalf of `player_id` instead of the active player.
    pub fn with_player(mut self, player_id: PlayerId) -> Self {
        self.player_id = Some(player_id);
        self
    }

    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    pub fn with_max_rollout_steps(mut self, steps: usize) -> Self {
        self.max_rollout_steps = steps;
        self
    }

    /// Takes exploration and rollout length from `config`.
    pub fn with_config(self, config: &SearchConfig) -> Self {
        self.with_exploration(config.exploration)
            .with_max_rollout_steps(config.max_rollout_steps)
    }

    /// Builds the `MonteCarloTreeSearch` instance with the configured parameters.
    pub fn build(self) -> MonteCarloTreeSearch<'a, K> {
        let player_id = self.player_id.unwrap_or(self.state.active_player_id);
        MonteCarloTreeSearch::new(
            self.rules,
            self.state,
            player_id,
            self.random_generator,
            self.exploration,
            self.max_rollout_steps,
        )
    }
}

impl<'a, K: RandomGenerator> MonteCarloTreeSearch<'a, K> {
    /// Returns a new builder for `MonteCarloTreeSearch`.
    pub fn builder(rules: &'a Rules, state: GameState) -> MonteCarloTreeSearchBuilder<'a, K> {
        MonteCarloTreeSearchBuilder::new(rules, state)
    }

    /// Creates a new `MonteCarloTreeSearch` instance.
    ///
    /// It is recommended to use the builder pattern via `MonteCarloTreeSearch::builder()` instead.
    pub fn new(
        rules: &'a Rules,
        state: GameState,
        player_id: PlayerId,
        rg: K,
        exploration: f64,
        max_rollout_steps: usize,
    ) -> Self {
        let root = MctsNode::new(None, generate_moves(&rules.config, &state), 0);
        let tree = Tree::new(root);
        let root_id = tree.root().id();

        Self {
            rules,
            tree,
            root_id,
            working: state.clone(),
            root_state: state,
            player_id,
            random: rg,
            exploration,
            max_rollout_steps,
            next_action: MctsAction::Selection {
                root: root_id,
                last_path: vec![],
            },
        }
    }

    /// Returns an immutable reference to the underlying search tree.
    pub fn get_tree(&self) -> &Tree<MctsNode> {
        &self.tree
    }

    /// Returns the root node's statistics.
    pub fn get_root(&self) -> &MctsNode {
        self.tree.root().value()
    }

    pub fn root_state(&self) -> &GameState {
        &self.root_state
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// Returns the next MCTS action to be performed. Useful for debugging and visualization.
    pub fn get_next_mcts_action(&self) -> &MctsAction {
        &self.next_action
    }

    pub fn node_count(&self) -> usize {
        self.tree.nodes().count()
    }

    /// Executes a single step of the MCTS algorithm (Selection, Expansion, Simulation, or Backpropagation).
    pub fn execute_action(&mut self) -> Result<(), SearchError> {
        let action = std::mem::replace(&mut self.next_action, MctsAction::EverythingIsCalculated);
        trace!(step = action.get_name(), "mcts");
        self.next_action = match action {
            MctsAction::Selection { root, .. } => {
                self.working = self.root_state.clone();
                if self.node(root)?.is_exhausted() {
                    MctsAction::EverythingIsCalculated
                } else {
                    MctsAction::Expansion {
                        leaf: self.select_next_node(root)?,
                    }
                }
            }
            MctsAction::Expansion { leaf } => MctsAction::Simulation {
                child: self.expand_node(leaf)?,
            },
            MctsAction::Simulation { child } => MctsAction::Backpropagation {
                child,
                outcome: self.simulate()?,
            },
            MctsAction::Backpropagation { child, outcome } => MctsAction::Selection {
                root: self.root_id,
                last_path: self.backpropagate(child, outcome)?,
            },
            MctsAction::EverythingIsCalculated => MctsAction::EverythingIsCalculated,
        };
        Ok(())
    }

    /// Performs one full iteration of the MCTS algorithm (Selection, Expansion, Simulation, Backpropagation).
    /// Returns the path of nodes that were updated during backpropagation.
    pub fn do_iteration(&mut self) -> Result<Vec<NodeId>, SearchError> {
        self.execute_action()?;
        while !matches!(
            self.next_action,
            MctsAction::Selection { .. } | MctsAction::EverythingIsCalculated
        ) {
            self.execute_action()?;
        }

        Ok(match &self.next_action {
            MctsAction::Selection { last_path, .. } => last_path.clone(),
            _ => vec![],
        })
    }

    /// Runs up to `n` iterations and returns how many completed.
    ///
    /// Stops early when the root has nothing left to explore.
    pub fn iterate_n_times(&mut self, n: u32) -> Result<u32, SearchError> {
        let mut iteration = 0;
        while iteration < n {
            self.do_iteration()?;
            if matches!(self.next_action, MctsAction::EverythingIsCalculated) {
                break;
            }
            iteration += 1;
        }
        Ok(iteration)
    }

    /// Walks down from the root taking the child with the highest raw win sum at each level.
    ///
    /// The walk stops after the end-turn move or at a node without children. Ties keep the
    /// first child in name order.
    pub fn best_line(&self) -> Vec<Move> {
        let mut line = Vec::new();
        let mut current = self.root_id;

        while let Some(node) = self.tree.get(current) {
            let mut best: Option<(NodeId, &MctsNode)> = None;
            for &child_id in node.value().children.values() {
                let Some(child) = self.tree.get(child_id).map(|c| c.value()) else {
                    continue;
                };
                trace!(
                    name = child.move_name(),
                    wins = child.wins,
                    visits = child.visits,
                    rate = child.wins_rate(),
                    "candidate"
                );
                if best.is_none_or(|(_, b)| child.wins > b.wins) {
                    best = Some((child_id, child));
                }
            }

            let Some((child_id, child)) = best else {
                break;
            };
            let Some(chosen) = child.prev_move.clone() else {
                break;
            };
            trace!(name = %chosen.name, wins = child.wins, "chosen move");
            let done = chosen.is_end_turn();
            line.push(chosen);
            if done {
                break;
            }
            current = child_id;
        }

        line
    }

    /// Descends by UCT until reaching a node that still has untried moves, replaying each
    /// chosen move on the working copy.
    fn select_next_node(&mut self, root_id: NodeId) -> Result<NodeId, SearchError> {
        let mut current = root_id;
        loop {
            let node = self.node(current)?;
            if !node.is_fully_expanded() || node.children.is_empty() {
                return Ok(current);
            }

            let parent_visits = node.visits;
            let mut best: Option<(NodeId, f64)> = None;
            for &child_id in node.children.values() {
                let score = self.node(child_id)?.uct(parent_visits, self.exploration);
                if best.is_none_or(|(_, s)| score > s) {
                    best = Some((child_id, score));
                }
            }
            let Some((best_id, _)) = best else {
                return Ok(current);
            };

            if let Some(chosen) = self.node(best_id)?.prev_move.clone() {
                self.step(&chosen)?;
            }

            if self.working.game_over && self.working.game_winner_id != Some(self.player_id) {
                self.update_node(current, |n| n.wins = f64::NEG_INFINITY)?;
            }
            current = best_id;
        }
    }

    /// Attaches one weighted-random untried move as a new child and returns it.
    ///
    /// A node with nothing left to try is returned as is.
    fn expand_node(&mut self, node_id: NodeId) -> Result<NodeId, SearchError> {
        let (height, names, weights) = {
            let node = self.node(node_id)?;
            let (names, weights): (Vec<String>, Vec<f64>) = node
                .unexplored_moves
                .values()
                .filter(|m| !node.children.contains_key(&m.name))
                .map(|m| (m.name.clone(), m.weight))
                .unzip();
            (node.height + 1, names, weights)
        };

        let Some(index) = self.random.pick_weighted(&weights) else {
            return Ok(node_id);
        };
        let mut taken = None;
        self.update_node(node_id, |n| taken = n.unexplored_moves.remove(&names[index]))?;
        let Some(chosen) = taken else {
            return Ok(node_id);
        };

        self.step(&chosen)?;
        let moves = generate_moves(&self.rules.config, &self.working);
        let name = chosen.name.clone();

        let mut parent = self
            .tree
            .get_mut(node_id)
            .ok_or(SearchError::DanglingNode(node_id))?;
        let child_id = parent.append(MctsNode::new(Some(chosen), moves, height)).id();
        parent.value().children.insert(name, child_id);
        Ok(child_id)
    }

    /// Plays weighted-random moves on the working copy until the game is over.
    fn simulate(&mut self) -> Result<GameOutcome, SearchError> {
        let mut steps = 0;
        while !self.working.game_over {
            if steps >= self.max_rollout_steps {
                trace!(steps, "rollout cut short");
                return Ok(GameOutcome::Draw);
            }

            let moves = generate_moves(&self.rules.config, &self.working);
            let candidates: Vec<&Move> = moves.values().collect();
            let weights: Vec<f64> = candidates.iter().map(|m| m.weight).collect();
            let Some(index) = self.random.pick_weighted(&weights) else {
                return Ok(GameOutcome::Draw);
            };
            self.step(candidates[index])?;
            steps += 1;
        }

        Ok(GameOutcome::of(&self.working, self.player_id))
    }

    /// Propagates the result of a simulation back up the tree, updating node statistics.
    fn backpropagate(
        &mut self,
        node_id: NodeId,
        outcome: GameOutcome,
    ) -> Result<Vec<NodeId>, SearchError> {
        let reward = outcome.reward();
        let mut branch = vec![node_id];
        branch.extend(
            self.tree
                .get(node_id)
                .ok_or(SearchError::DanglingNode(node_id))?
                .ancestors()
                .map(|n| n.id()),
        );

        for &id in &branch {
            self.update_node(id, |n| {
                n.visits += 1;
                n.wins += reward;
            })?;
        }

        Ok(branch)
    }

    /// Applies a move to the working copy. The searching player never acts during
    /// Battle, so a resolved battle rolls straight into the next round.
    fn step(&mut self, chosen: &Move) -> Result<(), SearchError> {
        self.working = chosen.apply(self.rules, &self.working)?;
        if self.working.phase == Phase::Battle && !self.working.game_over {
            self.working = self.rules.apply(&self.working, &Action::IncrementRound)?;
        }
        Ok(())
    }

    fn node(&self, id: NodeId) -> Result<&MctsNode, SearchError> {
        self.tree
            .get(id)
            .map(|n| n.value())
            .ok_or(SearchError::DanglingNode(id))
    }

    fn update_node(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut MctsNode),
    ) -> Result<(), SearchError> {
        let mut node = self.tree.get_mut(id).ok_or(SearchError::DanglingNode(id))?;
        f(node.value());
        Ok(())
    }
}

impl<'a> MonteCarloTreeSearch<'a, StandardRandomGenerator> {
    pub fn from_state(rules: &'a Rules, state: GameState) -> Self {
        MonteCarloTreeSearchBuilder::new(rules, state).build()
    }
}

/// Represents the four main stages of the MCTS algorithm.
///
/// This enum is used to manage the state of the search process.
#[derive(Debug, PartialEq, Clone)]
pub enum MctsAction {
    /// **Selection**: Start from the root and descend by UCT to a node with untried moves.
    Selection {
        root: NodeId,
        /// The path of nodes updated by the last backpropagation.
        last_path: Vec<NodeId>,
    },
    /// **Expansion**: Attach one new child to the selected leaf.
    Expansion { leaf: NodeId },
    /// **Simulation**: Run a random playout from the new child.
    Simulation { child: NodeId },
    /// **Backpropagation**: Update the statistics of the nodes on the path from the child to the root.
    Backpropagation { child: NodeId, outcome: GameOutcome },
    /// The root has no moves and no children; there is nothing to search.
    EverythingIsCalculated,
}

impl MctsAction {
    /// Returns the name of the current MCTS action.
    pub fn get_name(&self) -> &'static str {
        match self {
            MctsAction::Selection { .. } => "Selection",
            MctsAction::Expansion { .. } => "Expansion",
            MctsAction::Simulation { .. } => "Simulation",
            MctsAction::Backpropagation { .. } => "Backpropagation",
            MctsAction::EverythingIsCalculated => "EverythingIsCalculated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::dictionary::WordList;
    use crate::letter::{Letter, LetterOrigin};
    use crate::moves::END_TURN;
    use crate::random::SeededRandomGenerator;
    use crate::state::PlayerSetup;

    fn letters(state: &mut GameState, word: &str, origin: LetterOrigin) -> Vec<Letter> {
        word.chars()
            .map(|c| {
                let id = state.letter_ids.next_id();
                Letter::from_glyph(id, c, origin).unwrap()
            })
            .collect()
    }

    /// The computer moves last with one health left, trailing 2 to 0. Buying the `z`
    /// wins the battle and the game; anything else loses both.
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

    fn search(
        rules: &Rules,
        state: GameState,
        seed: u64,
    ) -> MonteCarloTreeSearch<'_, SeededRandomGenerator> {
        MonteCarloTreeSearch::builder(rules, state)
            .with_random_generator(SeededRandomGenerator::new(seed))
            .build()
    }

    #[test]
    fn finds_the_winning_buy() {
        // arrange
        let rules = Rules::new(GameConfig::default(), WordList::default());
        let mut mcts = search(&rules, last_chance(), 7);

        // act
        let iterations = mcts.iterate_n_times(2000).unwrap();
        let line = mcts.best_line();

        // assert
        assert_eq!(iterations, 2000);
        assert!(line[0].name.starts_with("buy-letter-z"), "{}", line[0].name);
        assert_eq!(mcts.player_id(), PlayerId(2));
    }

    #[test]
    fn forced_losses_poison_the_parent() {
        // arrange
        let rules = Rules::new(GameConfig::default(), WordList::default());
        let mut mcts = search(&rules, last_chance(), 3);

        // act
        mcts.iterate_n_times(500).unwrap();

        // assert
        let root = mcts.get_root();
        let end_turn = mcts.get_tree().get(root.children[END_TURN]).unwrap();
        assert_eq!(end_turn.value().wins, -(end_turn.value().visits as f64));
        assert_eq!(root.wins, f64::NEG_INFINITY);
    }

    #[test]
    fn iterations_grow_the_tree_without_touching_the_root_state() {
        // arrange
        let rules = Rules::new(GameConfig::default(), WordList::new(["cat", "ten"]));
        let state = GameState::new(
            &GameConfig::default(),
            &[PlayerSetup::computer("A"), PlayerSetup::computer("B")],
            5,
        );
        let mut mcts = search(&rules, state.clone(), 11);

        // act
        let iterations = mcts.iterate_n_times(20).unwrap();

        // assert
        assert_eq!(iterations, 20);
        assert_eq!(mcts.get_root().visits, 20);
        assert!(mcts.node_count() > 1 && mcts.node_count() <= 21);
        assert_eq!(mcts.root_state(), &state);
        assert!(matches!(
            mcts.get_next_mcts_action(),
            MctsAction::Selection { .. }
        ));
    }

    #[test]
    fn same_seed_same_line() {
        let rules = Rules::new(GameConfig::default(), WordList::default());
        let names = |seed| {
            let mut mcts = search(&rules, last_chance(), seed);
            mcts.iterate_n_times(200).unwrap();
            mcts.best_line()
                .into_iter()
                .map(|m| m.name)
                .collect::<Vec<_>>()
        };
        assert_eq!(names(21), names(21));
    }

    #[test]
    fn unseeded_search_still_visits_the_root() {
        let rules = Rules::new(GameConfig::default(), WordList::default());
        let mut mcts = MonteCarloTreeSearch::from_state(&rules, last_chance());
        assert_eq!(mcts.iterate_n_times(50).unwrap(), 50);
        assert_eq!(mcts.get_root().visits, 50);
    }

    #[test]
    fn finished_game_has_nothing_to_search() {
        let rules = Rules::new(GameConfig::default(), WordList::default());
        let mut state = last_chance();
        state.game_over = true;
        state.game_winner_id = Some(PlayerId(1));
        let mut mcts = search(&rules, state, 1);

        assert_eq!(mcts.iterate_n_times(10).unwrap(), 0);
        assert_eq!(
            mcts.get_next_mcts_action(),
            &MctsAction::EverythingIsCalculated
        );
        assert!(mcts.best_line().is_empty());
    }
}
