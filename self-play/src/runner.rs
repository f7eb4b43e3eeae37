use crate::human::ConsoleDecider;
use crate::options::{GameConfig, PlayerKind};

use anyhow::Context;
use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::fmt;
use std::sync::{mpsc, Arc};
use threadpool::ThreadPool;
use ticket_to_ride::decision::{DecisionSource, RandomDecider};
use ticket_to_ride::game::{Game, GameSummary};
use ticket_to_ride::observation::NullSink;

/// Outcome of one game of a run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameReport {
    pub game: usize,
    pub seed: u64,
    #[serde(flatten)]
    pub summary: GameSummary,
}

impl fmt::Display for GameReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let summary = &self.summary;
        write!(f, "Game {} (seed {}): ", self.game, self.seed)?;

        match (summary.finished, summary.winner) {
            (true, Some(winner)) => write!(f, "player {} won", winner)?,
            (true, None) => write!(f, "nobody won")?,
            (false, _) => write!(f, "aborted")?,
        }

        let scores: Vec<String> = summary.scores.iter().map(i32::to_string).collect();
        write!(
            f,
            " after {} moves ({} completed), scores: {}",
            summary.total_moves,
            summary.completed_moves,
            scores.join(", ")
        )
    }
}

/// Aggregates the reports of a batch of games.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchStats {
    pub num_games: usize,
    pub num_aborted: usize,
    /// Games won, per player.
    pub wins: Vec<usize>,
    pub average_moves: f64,
}

impl BatchStats {
    pub fn new(reports: &[GameReport], num_players: usize) -> Self {
        let mut wins = vec![0; num_players];
        for winner in reports.iter().filter_map(|report| report.summary.winner) {
            if let Some(num_wins) = wins.get_mut(winner) {
                *num_wins += 1;
            }
        }

        let total_moves: usize = reports.iter().map(|report| report.summary.total_moves).sum();

        Self {
            num_games: reports.len(),
            num_aborted: reports.iter().filter(|report| !report.summary.finished).count(),
            wins,
            average_moves: if reports.is_empty() {
                0.0
            } else {
                total_moves as f64 / reports.len() as f64
            },
        }
    }
}

impl fmt::Display for BatchStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Played {} games ({} aborted), wins per player: {:?}, {:.1} moves on average",
            self.num_games, self.num_aborted, self.wins, self.average_moves
        )
    }
}

/// One decision source per player. Random players get their seeds from `seed`.
fn deciders(config: &GameConfig, seed: u64) -> Vec<Box<dyn DecisionSource>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    config
        .players
        .iter()
        .map(|kind| match kind {
            PlayerKind::Random => Box::new(RandomDecider::new(rng.gen())) as Box<dyn DecisionSource>,
            PlayerKind::Human => Box::new(ConsoleDecider::stdio(config.board.clone())),
        })
        .collect()
}

/// Plays a whole game. Games with the same config and seed play out the same way.
pub fn play_game(config: &GameConfig, game: usize, seed: u64) -> anyhow::Result<GameReport> {
    let mut state = Game::new(
        config.board.clone(),
        config.rules.clone(),
        deciders(config, seed),
        seed,
        NullSink,
    )
    .context("Could not set up the game")?
    .with_max_moves(config.max_moves);

    let summary = state
        .play()
        .with_context(|| format!("Game {} (seed {}) was interrupted", game, seed))?;

    Ok(GameReport {
        game,
        seed,
        summary,
    })
}

/// Plays `num_games` games, seeded from `first_seed` onwards, and returns their results
/// in game order.
///
/// Several games are spread over a thread pool of `num_threads` workers (one per CPU if
/// `None`). Games with human players are played one after the other on this thread.
pub fn run_games(
    config: GameConfig,
    num_games: usize,
    first_seed: u64,
    num_threads: Option<usize>,
) -> Vec<anyhow::Result<GameReport>> {
    let seed = move |game: usize| first_seed.wrapping_add(game as u64);

    if num_games <= 1 || config.has_human_player() {
        return (0..num_games)
            .map(|game| play_game(&config, game, seed(game)))
            .collect();
    }

    let thread_pool = match num_threads {
        Some(num_threads) => ThreadPool::new(num_threads.max(1)),
        None => ThreadPool::default(),
    };
    info!(
        "Playing {} games on {} threads.",
        num_games,
        thread_pool.max_count()
    );

    let config = Arc::new(config);
    let (tx, rx) = mpsc::channel();

    for game in 0..num_games {
        let config = config.clone();
        let tx = tx.clone();

        thread_pool.execute(move || {
            // The receiver only goes away once every game is collected.
            let _ = tx.send((game, play_game(&config, game, seed(game))));
        });
    }
    drop(tx);

    let mut results: Vec<(usize, anyhow::Result<GameReport>)> = rx.iter().collect();
    results.sort_by_key(|(game, _)| *game);

    results.into_iter().map(|(_, result)| result).collect()
}
