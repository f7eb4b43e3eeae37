use crate::board::{BoardVariant, DataKind};
use crate::card::TrainColor;
use crate::map::LinkId;
use crate::player::PlayerId;

use std::path::PathBuf;
use thiserror::Error;

/// Fatal problems with the static board data or the game setup.
///
/// These are raised before any turn is played.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Malformed line {line} in the {kind} data: `{content}`.")]
    MalformedLine {
        kind: DataKind,
        line: usize,
        content: String,
    },
    #[error("Line {line} in the {kind} data has an invalid number `{value}`.")]
    InvalidNumber {
        kind: DataKind,
        line: usize,
        value: String,
    },
    #[error("Line {line} in the {kind} data refers to an unknown city `{city}`.")]
    UnknownCity {
        kind: DataKind,
        line: usize,
        city: String,
    },
    #[error("Line {line} in the routes data has an unknown color `{color}`.")]
    UnknownColor { line: usize, color: String },
    #[error("City `{city}` is declared twice (line {line}).")]
    DuplicateCity { line: usize, city: String },
    #[error("Too many cities ({count}), at most {max} are supported.")]
    TooManyCities { count: usize, max: usize },
    #[error("Too many {kind} train cards ({count}), a hand holds at most {max} of a color.")]
    TooManyTrainCards {
        kind: &'static str,
        count: usize,
        max: usize,
    },
    #[error("There is no route value configured for routes of length {length}.")]
    MissingRouteValue { length: u8 },
    #[error("Cannot play with {0} players, only 2 to 5 players are supported.")]
    InvalidPlayerCount(usize),
    #[error("There is no built-in board for the {0} variant, a data directory is required.")]
    NoBuiltinBoard(BoardVariant),
    #[error("Could not read `{path}`: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid rules: {0}")]
    Rules(#[from] serde_json::Error),
}

/// Reasons why a route claim is rejected.
///
/// The first six variants are checked in declaration order by
/// [`crate::map::Map::validate_claim`], which returns the first one that applies.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum ClaimError {
    #[error("The player already owns a link on this route.")]
    OwnLinkAlreadyOnRoute,
    #[error("Every link of this route is already claimed.")]
    RouteFullyClaimed,
    #[error("Parallel links cannot both be claimed in a game with fewer than 4 players.")]
    RouteLockedBySingleUsePolicy,
    #[error("Cannot pay for a {link_color} link with {card_color} cards.")]
    ColorMismatch {
        link_color: TrainColor,
        card_color: TrainColor,
    },
    #[error("The route needs {needed} trains, but only {remaining} are left.")]
    InsufficientTrainFigures { needed: u8, remaining: u8 },
    #[error("The route needs {needed} cards, but only {offered} were offered.")]
    InsufficientCards { needed: u8, offered: u8 },
    #[error("Link {0} does not exist.")]
    LinkNotFound(LinkId),
    #[error("Wild cards can only complement a paying color, not be one.")]
    InvalidCardColor,
    #[error("The link is already claimed.")]
    AlreadyClaimed,
    #[error("The route does not accept another claim.")]
    RouteLocked,
}

/// Why a turn ended without completing its action.
///
/// A failed turn is still a turn: play moves on to the next player.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum TurnFailure {
    #[error("Could not claim the route: {0}")]
    Claim(#[from] ClaimError),
    #[error("There are no tickets left to draw.")]
    NoTicketsLeft,
    #[error("The ticket selection must split the {dealt} dealt tickets and keep at least {min_keep}.")]
    InvalidTicketSelection { dealt: usize, min_keep: usize },
    #[error("Face-up slot {0} holds no card.")]
    FaceUpSlotEmpty(usize),
    #[error("A face-up wild card can only be taken as the first draw of a turn.")]
    WildCardNotFirstDraw,
    #[error("There are no train cards left to draw.")]
    TrainCardsExhausted,
}

/// A broken engine invariant, i.e. a programming defect rather than an illegal move.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum InvariantViolation {
    #[error("Player {player} holds {held} {color} cards, cannot remove {requested}.")]
    NotEnoughCards {
        player: PlayerId,
        color: TrainColor,
        held: u8,
        requested: u8,
    },
    #[error("Player {player} has {remaining} trains left, cannot spend {requested}.")]
    NotEnoughTrains {
        player: PlayerId,
        remaining: u8,
        requested: u8,
    },
    #[error("Claim of link {link} bypassed validation: {source}")]
    UnvalidatedClaim { link: LinkId, source: ClaimError },
    #[error("Player {player} does not hold ticket {ticket}.")]
    UnknownTicket { player: PlayerId, ticket: usize },
    #[error("There is no route value for routes of length {0}.")]
    MissingRouteValue(u8),
    #[error("Face-up slot {0} was emptied while being drawn from.")]
    FaceUpSlotVanished(usize),
    #[error("The game is already finished.")]
    GameFinished,
}
