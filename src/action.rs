use crate::letter::LetterId;
use crate::state::GameState;

/// Where a dragged letter is dropped.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// The end of the rack.
    Rack,
    /// The slot currently held by this rack letter.
    Letter(LetterId),
}

/// Every transition the rules know about. Letter references are by identity and
/// always resolve against the active player's rack or pool.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Replaces the whole state; the only action that leaves seeds untouched.
    Set(Box<GameState>),
    /// Replaces the whole state with a new game, bumping `game_count`.
    RestartGame(Box<GameState>),
    EndTurn,
    IncrementRound,
    BuyLetter {
        letter_id: LetterId,
        /// Rack insertion index, the end of the rack when `None`.
        index: Option<usize>,
    },
    SellLetter {
        letter_id: LetterId,
    },
    ToggleFreeze {
        letter_id: LetterId,
    },
    SpendGold {
        amount: u32,
    },
    SelectLetter {
        letter_id: LetterId,
    },
    DeselectLetter,
    SetDraggingLetter {
        letter_id: Option<LetterId>,
    },
    DragLetterToRack {
        letter_id: LetterId,
        over: DropTarget,
    },
    /// Moves `letter_id` into the position of `over_id` (array move, not a swap).
    MoveLetterInRack {
        letter_id: LetterId,
        over_id: LetterId,
    },
    RemoveLetterFromRack {
        letter_id: LetterId,
    },
    SetLetterOrigins,
    RefreshPool,
}

impl Action {
    /// Whether the action swaps in a whole new snapshot.
    pub fn replaces_state(&self) -> bool {
        matches!(self, Action::Set(_) | Action::RestartGame(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Action::Set(_) => "Set",
            Action::RestartGame(_) => "RestartGame",
            Action::EndTurn => "EndTurn",
            Action::IncrementRound => "IncrementRound",
            Action::BuyLetter { .. } => "BuyLetter",
            Action::SellLetter { .. } => "SellLetter",
            Action::ToggleFreeze { .. } => "ToggleFreeze",
            Action::SpendGold { .. } => "SpendGold",
            Action::SelectLetter { .. } => "SelectLetter",
            Action::DeselectLetter => "DeselectLetter",
            Action::SetDraggingLetter { .. } => "SetDraggingLetter",
            Action::DragLetterToRack { .. } => "DragLetterToRack",
            Action::MoveLetterInRack { .. } => "MoveLetterInRack",
            Action::RemoveLetterFromRack { .. } => "RemoveLetterFromRack",
            Action::SetLetterOrigins => "SetLetterOrigins",
            Action::RefreshPool => "RefreshPool",
        }
    }
}
