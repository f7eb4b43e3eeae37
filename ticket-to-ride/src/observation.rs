use crate::card::{TrainColor, NUM_FACE_UP_CARDS};
use crate::map::{LinkId, RouteId};
use crate::player::PlayerId;

use serde::Serialize;
use strum::{EnumCount, IntoEnumIterator};

/// A change of the game state, carrying the value after the change.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Observation {
    FaceUpCard {
        slot: usize,
        card: Option<TrainColor>,
    },
    DrawPileSize {
        size: usize,
    },
    DiscardPileSize {
        size: usize,
    },
    TicketPileSize {
        size: usize,
    },
    Trains {
        player: PlayerId,
        trains: u8,
    },
    TrainCards {
        player: PlayerId,
        color: TrainColor,
        num: u8,
    },
    Score {
        player: PlayerId,
        score: i32,
    },
    RouteOwner {
        player: PlayerId,
        route: RouteId,
        link: LinkId,
    },
    TicketOwner {
        player: PlayerId,
        ticket: usize,
    },
    TicketCompleted {
        player: PlayerId,
        ticket: usize,
    },
}

/// Receives every state change of a game, right after it happened.
///
/// Sinks cannot influence the game.
pub trait ObservationSink: Send {
    fn observe(&mut self, observation: Observation);
}

/// Sink dropping every observation.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl ObservationSink for NullSink {
    fn observe(&mut self, _observation: Observation) {}
}

/// Records every observation, in order.
impl ObservationSink for Vec<Observation> {
    fn observe(&mut self, observation: Observation) {
        self.push(observation);
    }
}

/// Keeps the latest value of every observed quantity, and flattens it into
/// the integer vector a learning policy consumes.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatState {
    face_up: [Option<TrainColor>; NUM_FACE_UP_CARDS],
    draw_pile_size: usize,
    discard_pile_size: usize,
    ticket_pile_size: usize,
    trains: Vec<u8>,
    scores: Vec<i32>,
    /// Per player, per color in `TrainColor` order.
    train_cards: Vec<[u8; TrainColor::COUNT]>,
    route_owners: Vec<Option<PlayerId>>,
    ticket_owners: Vec<Option<PlayerId>>,
    completed_tickets: Vec<bool>,
}

impl FlatState {
    pub fn new(num_players: usize, num_routes: usize, num_tickets: usize) -> Self {
        Self {
            face_up: [None; NUM_FACE_UP_CARDS],
            draw_pile_size: 0,
            discard_pile_size: 0,
            ticket_pile_size: 0,
            trains: vec![0; num_players],
            scores: vec![0; num_players],
            train_cards: vec![[0; TrainColor::COUNT]; num_players],
            route_owners: vec![None; num_routes],
            ticket_owners: vec![None; num_tickets],
            completed_tickets: vec![false; num_tickets],
        }
    }

    /// The state as seen by `viewer`, or `None` if this sink has no such player.
    ///
    /// Players are numbered relative to the viewer: the viewer is 1, the next player
    /// in turn order 2, and so on, with 0 meaning nobody. Only the viewer's own cards
    /// are detailed per color; opponents only show their total number of cards.
    ///
    /// Layout: face-up cards (color index + 1, or 0), draw, discard and ticket pile sizes,
    /// then per player trains, score and number of cards, then the viewer's cards per
    /// color, route owners, and per ticket 0 (not the viewer's), 1 (held) or 2 (completed).
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride::card::TrainColor;
    /// use ticket_to_ride::observation::{FlatState, Observation, ObservationSink};
    ///
    /// let mut state = FlatState::new(2, 3, 4);
    /// state.observe(Observation::Trains { player: 1, trains: 42 });
    /// state.observe(Observation::TrainCards { player: 1, color: TrainColor::Red, num: 2 });
    ///
    /// let vector = state.state_vector(1).unwrap();
    /// assert_eq!(vector.len(), FlatState::state_vector_len(2, 3, 4));
    /// // The viewer's trains come right after the face-up cards and the piles.
    /// assert_eq!(vector[8], 42);
    /// assert!(state.state_vector(2).is_none());
    /// ```
    pub fn state_vector(&self, viewer: PlayerId) -> Option<Vec<i32>> {
        let num_players = self.trains.len();
        if viewer >= num_players {
            return None;
        }

        let relative = |owner: Option<PlayerId>| match owner {
            Some(player) => ((player + num_players - viewer) % num_players + 1) as i32,
            None => 0,
        };
        let color_index = |card: &Option<TrainColor>| match card {
            Some(color) => TrainColor::iter().position(|c| c == *color).unwrap_or(0) as i32 + 1,
            None => 0,
        };

        let mut vector = Vec::with_capacity(Self::state_vector_len(
            num_players,
            self.route_owners.len(),
            self.ticket_owners.len(),
        ));

        vector.extend(self.face_up.iter().map(color_index));
        vector.push(self.draw_pile_size as i32);
        vector.push(self.discard_pile_size as i32);
        vector.push(self.ticket_pile_size as i32);

        for offset in 0..num_players {
            let player = (viewer + offset) % num_players;
            vector.push(self.trains[player] as i32);
            vector.push(self.scores[player]);
            vector.push(self.train_cards[player].iter().map(|num| *num as i32).sum());
        }

        vector.extend(self.train_cards[viewer].iter().map(|num| *num as i32));
        vector.extend(self.route_owners.iter().map(|owner| relative(*owner)));
        vector.extend(
            self.ticket_owners
                .iter()
                .zip(&self.completed_tickets)
                .map(|(owner, completed)| match (owner, completed) {
                    (Some(player), true) if *player == viewer => 2,
                    (Some(player), false) if *player == viewer => 1,
                    _ => 0,
                }),
        );

        Some(vector)
    }

    pub fn state_vector_len(num_players: usize, num_routes: usize, num_tickets: usize) -> usize {
        NUM_FACE_UP_CARDS + 3 + 3 * num_players + TrainColor::COUNT + num_routes + num_tickets
    }
}

impl ObservationSink for FlatState {
    fn observe(&mut self, observation: Observation) {
        // Out of range observations come from a state this sink was not sized for.
        match observation {
            Observation::FaceUpCard { slot, card } => {
                if let Some(face_up) = self.face_up.get_mut(slot) {
                    *face_up = card;
                }
            }
            Observation::DrawPileSize { size } => self.draw_pile_size = size,
            Observation::DiscardPileSize { size } => self.discard_pile_size = size,
            Observation::TicketPileSize { size } => self.ticket_pile_size = size,
            Observation::Trains { player, trains } => {
                if let Some(slot) = self.trains.get_mut(player) {
                    *slot = trains;
                }
            }
            Observation::Score { player, score } => {
                if let Some(slot) = self.scores.get_mut(player) {
                    *slot = score;
                }
            }
            Observation::TrainCards { player, color, num } => {
                let color_index = TrainColor::iter().position(|c| c == color);
                if let (Some(cards), Some(color_index)) =
                    (self.train_cards.get_mut(player), color_index)
                {
                    cards[color_index] = num;
                }
            }
            Observation::RouteOwner { player, route, .. } => {
                if let Some(owner) = self.route_owners.get_mut(route) {
                    *owner = Some(player);
                }
            }
            Observation::TicketOwner { player, ticket } => {
                if let Some(owner) = self.ticket_owners.get_mut(ticket) {
                    *owner = Some(player);
                }
            }
            Observation::TicketCompleted { ticket, .. } => {
                if let Some(completed) = self.completed_tickets.get_mut(ticket) {
                    *completed = true;
                }
            }
        }
    }
}
