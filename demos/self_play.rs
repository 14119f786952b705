use anyhow::{Result, bail};
use letter_duel::config::Config;
use letter_duel::dictionary::WordList;
use letter_duel::state::{GameState, Phase, PlayerSetup};
use letter_duel::{Action, ComputerPlayer, Rules};

const WORDS: &str = "a at ate cat eat tea ten net tan ant sat set vet zen zap quiz jazz";
const MAX_TURNS: usize = 400;

fn init_tracing(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    init_tracing("letter_duel=info");

    // Optional path to a TOML config, defaults otherwise
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => {
            let mut config = Config::default().apply_env_overrides();
            if std::env::var("LETTER_DUEL_SEARCH_ITERATIONS").is_err() {
                config.search.iterations = 500;
            }
            config.validate()?;
            config
        }
    };

    let rules = Rules::new(config.game.clone(), WordList::from_text(WORDS));
    let computer = ComputerPlayer::new(&rules, config.search.clone());
    let mut state = GameState::new(
        &config.game,
        &[PlayerSetup::computer("Ada"), PlayerSetup::computer("Bot")],
        config.search.seed.unwrap_or(2024),
    );

    for _ in 0..MAX_TURNS {
        if state.game_over {
            break;
        }
        if state.phase == Phase::Battle {
            state = rules.apply(&state, &Action::IncrementRound)?;
            continue;
        }

        let Some(active) = state.active_player() else {
            bail!("no active player");
        };
        if !active.is_computer() {
            bail!("{} is not a computer player", active.name);
        }
        let name = active.name.clone();
        let outcome = computer.plan_turn(&state)?;
        state = outcome.state;
        let rack = state
            .players
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.rack_word())
            .unwrap_or_default();
        println!(
            "Round {:>2} {name:<4} played {} moves, rack \"{rack}\"",
            state.round,
            outcome.moves.len()
        );
    }

    if !state.game_over {
        bail!("no winner after {MAX_TURNS} turns");
    }

    for player in &state.players {
        println!(
            "{}: health {}, victories {}",
            player.name, player.health, player.battle_victories
        );
    }
    match state.game_winner_id.and_then(|id| state.player(id)) {
        Some(winner) => println!("The winner is: {}", winner.name),
        None => println!("No winner"),
    }
    Ok(())
}
