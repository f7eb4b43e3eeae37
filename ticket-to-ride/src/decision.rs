use crate::card::{TrainColor, NUM_FACE_UP_CARDS};
use crate::map::{LinkId, Map};
use crate::player::Player;
use crate::rules::Rules;
use crate::ticket::Ticket;

use rand::seq::{IteratorRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use smallvec::SmallVec;
use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter};

/// The three things a player can do on their turn.
///
/// # JSON
/// Actions are serialized as an 8-bit unsigned integer.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize_repr,
    Display,
    EnumCountMacro,
    EnumIter,
    Eq,
    Hash,
    PartialEq,
    Serialize_repr,
)]
#[repr(u8)]
pub enum ActionKind {
    #[strum(serialize = "claim a route")]
    ClaimRoute = 0,
    #[strum(serialize = "draw tickets")]
    DrawTickets = 1,
    #[strum(serialize = "draw train cards")]
    DrawTrainCards = 2,
}

/// Where a player takes a train card from.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainCardDraw {
    FaceUp(usize),
    DrawPile,
}

impl TrainCardDraw {
    /// Maps `0..NUM_FACE_UP_CARDS` to the face-up slots, and anything above to the draw pile.
    pub fn from_index(index: usize) -> Self {
        if index < NUM_FACE_UP_CARDS {
            TrainCardDraw::FaceUp(index)
        } else {
            TrainCardDraw::DrawPile
        }
    }
}

/// Indices of dealt tickets to keep and to give back.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TicketSelection {
    pub kept: SmallVec<[usize; 3]>,
    pub discarded: SmallVec<[usize; 3]>,
}

impl TicketSelection {
    /// Whether the selection splits `0..num_dealt` in two, keeping at least `min_keep` tickets.
    ///
    /// # Example
    /// ```
    /// use smallvec::smallvec;
    /// use ticket_to_ride::decision::TicketSelection;
    ///
    /// let selection = TicketSelection { kept: smallvec![2, 0], discarded: smallvec![1] };
    /// assert!(selection.is_valid(3, 2));
    /// assert!(!selection.is_valid(3, 3));
    /// assert!(!selection.is_valid(4, 1));
    /// ```
    pub fn is_valid(&self, num_dealt: usize, min_keep: usize) -> bool {
        if self.kept.len() < min_keep || self.kept.len() + self.discarded.len() != num_dealt {
            return false;
        }

        let mut seen: SmallVec<[bool; 3]> = SmallVec::from_elem(false, num_dealt);
        for index in self.kept.iter().chain(&self.discarded) {
            match seen.get_mut(*index) {
                Some(seen) if !*seen => *seen = true,
                _ => return false,
            }
        }

        true
    }
}

/// Read-only view of the game handed to a decision source.
pub struct DecisionContext<'a> {
    /// The player deciding.
    pub player: &'a Player,
    pub map: &'a Map,
    pub face_up: &'a [Option<TrainColor>],
    pub rules: &'a Rules,
    pub num_players: usize,
}

/// Makes every choice on behalf of one player.
///
/// Answers outside of the expected domain are not trusted: the engine rejects them,
/// and the turn fails.
pub trait DecisionSource: Send {
    fn choose_action(&mut self, context: &DecisionContext) -> ActionKind;

    /// Picks which of the `dealt` tickets to keep, keeping at least `min_keep`.
    fn choose_tickets_to_keep(
        &mut self,
        context: &DecisionContext,
        dealt: &[Ticket],
        min_keep: usize,
    ) -> TicketSelection;

    fn choose_route(&mut self, context: &DecisionContext) -> LinkId;

    fn choose_card_color(&mut self, context: &DecisionContext) -> TrainColor;

    fn choose_wild_cards_to_offer(&mut self, context: &DecisionContext) -> u8;

    fn choose_train_card_draw(&mut self, context: &DecisionContext) -> TrainCardDraw;
}

/// Decides uniformly at random, with its own seeded generator.
#[derive(Clone, Debug)]
pub struct RandomDecider {
    rng: ChaCha8Rng,
}

impl RandomDecider {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl DecisionSource for RandomDecider {
    fn choose_action(&mut self, _context: &DecisionContext) -> ActionKind {
        match self.rng.gen_range(0..3) {
            0 => ActionKind::ClaimRoute,
            1 => ActionKind::DrawTickets,
            _ => ActionKind::DrawTrainCards,
        }
    }

    fn choose_tickets_to_keep(
        &mut self,
        _context: &DecisionContext,
        dealt: &[Ticket],
        min_keep: usize,
    ) -> TicketSelection {
        let min_keep = min_keep.min(dealt.len());
        let num_kept = self.rng.gen_range(min_keep..=dealt.len());

        let mut indices: SmallVec<[usize; 3]> = (0..dealt.len()).collect();
        indices.shuffle(&mut self.rng);
        let discarded = indices.drain(num_kept..).collect();

        TicketSelection {
            kept: indices,
            discarded,
        }
    }

    fn choose_route(&mut self, context: &DecisionContext) -> LinkId {
        self.rng.gen_range(0..context.map.num_links().max(1))
    }

    fn choose_card_color(&mut self, _context: &DecisionContext) -> TrainColor {
        TrainColor::paying_colors()
            .choose(&mut self.rng)
            .unwrap_or(TrainColor::Red)
    }

    fn choose_wild_cards_to_offer(&mut self, context: &DecisionContext) -> u8 {
        let max_offer = context.rules.wild_cards_num.min(u8::MAX as usize) as u8;
        self.rng.gen_range(0..=max_offer)
    }

    fn choose_train_card_draw(&mut self, _context: &DecisionContext) -> TrainCardDraw {
        TrainCardDraw::from_index(self.rng.gen_range(0..=NUM_FACE_UP_CARDS))
    }
}
