use anyhow::{bail, Context};
use std::fs;
use std::path::PathBuf;
use structopt::StructOpt;
use strum_macros::{Display, EnumString};
use ticket_to_ride::board::{Board, BoardVariant};
use ticket_to_ride::rules::Rules;

/// Who makes the decisions of a player.
#[derive(Clone, Copy, Debug, Display, EnumString, Eq, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum PlayerKind {
    Random,
    Human,
}

#[derive(Debug, StructOpt)]
#[structopt(name = "self-play", about = "Plays Ticket to Ride games between automated players")]
pub struct Opt {
    /// Comma-separated player kinds, in turn order (random or human), two random players if omitted
    #[structopt(short, long, use_delimiter = true)]
    pub players: Vec<PlayerKind>,

    /// Board edition, which selects the default rules (usa, europe or nordic)
    #[structopt(long, default_value = "usa")]
    pub variant: BoardVariant,

    /// Directory holding cities.txt, routes.txt and tickets.txt, instead of the built-in board
    #[structopt(long, parse(from_os_str))]
    pub data_dir: Option<PathBuf>,

    /// JSON file overriding some rules of the variant, the others keep the variant's defaults
    #[structopt(long, parse(from_os_str))]
    pub rules: Option<PathBuf>,

    /// Number of games to play
    #[structopt(short, long, default_value = "1")]
    pub games: usize,

    /// Seed of the first game, following games use the next seeds
    #[structopt(short, long, default_value = "0")]
    pub seed: u64,

    /// Abort a game after this many turns
    #[structopt(long)]
    pub max_moves: Option<usize>,

    /// Worker threads for batched games, defaults to the number of CPUs
    #[structopt(short, long)]
    pub threads: Option<usize>,

    /// Print one JSON summary per game
    #[structopt(long)]
    pub json: bool,

    /// Log card economy internals
    #[structopt(short, long)]
    pub verbose: bool,
}

/// Everything needed to set up the games of a run, shared by all of them.
#[derive(Clone, Debug)]
pub struct GameConfig {
    pub board: Board,
    pub rules: Rules,
    pub players: Vec<PlayerKind>,
    pub max_moves: Option<usize>,
}

impl GameConfig {
    /// Loads the board and the rules named by `opt`.
    pub fn from_opt(opt: &Opt) -> anyhow::Result<Self> {
        if opt.games == 0 {
            bail!("At least one game must be played.");
        }

        if opt.games > 1 && opt.players.contains(&PlayerKind::Human) {
            bail!("Human players can only play a single game at a time.");
        }

        let board = Board::load(opt.variant, opt.data_dir.as_deref()).with_context(|| {
            format!("Could not load the board of the {} variant", opt.variant)
        })?;

        let rules = match &opt.rules {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("Could not read the rules at {}", path.display()))?;
                Rules::from_json_for_variant(opt.variant, &json)
                    .with_context(|| format!("Invalid rules at {}", path.display()))?
            }
            None => Rules::for_variant(opt.variant),
        };

        let players = if opt.players.is_empty() {
            vec![PlayerKind::Random; 2]
        } else {
            opt.players.clone()
        };

        Ok(Self {
            board,
            rules,
            players,
            max_moves: opt.max_moves,
        })
    }

    pub fn has_human_player(&self) -> bool {
        self.players.contains(&PlayerKind::Human)
    }
}
