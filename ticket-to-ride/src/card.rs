use crate::rules::Rules;

use log::debug;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::iter::repeat;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter, EnumString};

/// Number of slots in the face-up display.
pub const NUM_FACE_UP_CARDS: usize = 5;
/// Number of train colors that are not wild.
pub const NUM_NON_WILD_COLORS: usize = TrainColor::COUNT - 1;

/// Represents the different variants of train cards.
///
/// On a link, [`TrainColor::Wild`] stands for a grey link, which accepts any color.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    EnumCountMacro,
    EnumIter,
    EnumString,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TrainColor {
    /// Also known as the *Hopper train*.
    Black,
    /// Also known as the *Tanker train*.
    Blue,
    /// Also known as the *Caboose train*.
    Green,
    /// Also known as the *Freight train*.
    Orange,
    /// Also known as the *Box train*.
    Pink,
    /// Also known as the *Coal train*.
    Red,
    /// Also known as the *Passenger train*.
    White,
    /// Also known as the *Locomotive*.
    /// This is a special train that matches with any color.
    Wild,
    /// Also known as the *Reefer train*.
    Yellow,
}

impl TrainColor {
    /// Whether the current color is wild, i.e. matches with any color.
    ///
    /// # Examples:
    /// ```
    /// use ticket_to_ride::card::TrainColor;
    ///
    /// let color = TrainColor::Black;
    /// assert!(!color.is_wild());
    ///
    /// let wild_color = TrainColor::Wild;
    /// assert!(wild_color.is_wild());
    /// ```
    #[inline]
    pub fn is_wild(&self) -> bool {
        *self == TrainColor::Wild
    }

    /// The opposite of `is_wild`.
    #[inline]
    pub fn is_not_wild(&self) -> bool {
        !self.is_wild()
    }

    /// All colors a route can be paid with, wild excluded.
    pub fn paying_colors() -> impl Iterator<Item = TrainColor> {
        TrainColor::iter().filter(TrainColor::is_not_wild)
    }
}

/// Public view of the train card economy.
#[derive(Debug, PartialEq, Serialize)]
pub struct CardDealerState<'a> {
    pub face_up: &'a [Option<TrainColor>],
    pub draw_pile_size: usize,
    pub discard_pile_size: usize,
}

/// Entity in charge of dealing and shuffling train cards.
///
/// Cards only ever move between the draw pile, the discard pile, the face-up
/// display and the players' hands, so the number of cards of each color is constant.
#[derive(Debug)]
pub struct CardDealer {
    face_up: [Option<TrainColor>; NUM_FACE_UP_CARDS],
    draw_pile: Vec<TrainColor>,
    discard_pile: Vec<TrainColor>,
    max_wild_cards: usize,
    max_face_up_wipes: usize,
    rng: ChaCha8Rng,
}

impl CardDealer {
    /// Creates a new `CardDealer` with a shuffled deck and a filled face-up display.
    ///
    /// # Example
    /// ```
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    /// use ticket_to_ride::card::CardDealer;
    /// use ticket_to_ride::rules::Rules;
    ///
    /// let card_dealer = CardDealer::new(&Rules::default(), ChaCha8Rng::seed_from_u64(7));
    /// assert_eq!(card_dealer.draw_pile().len(), 105);
    /// ```
    pub fn new(rules: &Rules, mut rng: ChaCha8Rng) -> Self {
        let mut draw_pile = Vec::with_capacity(rules.deck_size());

        for color in TrainColor::iter() {
            let num_of_train_cards_per_color = if color.is_wild() {
                rules.wild_cards_num
            } else {
                rules.cards_per_color_num
            };
            draw_pile.extend(repeat(color).take(num_of_train_cards_per_color));
        }

        draw_pile.shuffle(&mut rng);

        Self::from_piles(draw_pile, Vec::new(), rules, rng)
    }

    /// Creates a `CardDealer` from explicit piles, without shuffling.
    ///
    /// The face-up display is then filled from the end of `draw_pile`.
    pub fn from_piles(
        draw_pile: Vec<TrainColor>,
        discard_pile: Vec<TrainColor>,
        rules: &Rules,
        rng: ChaCha8Rng,
    ) -> Self {
        let mut card_dealer = Self {
            face_up: [None; NUM_FACE_UP_CARDS],
            draw_pile,
            discard_pile,
            max_wild_cards: rules.max_wild_cards,
            max_face_up_wipes: rules.max_face_up_wipes,
            rng,
        };
        card_dealer.refill_face_up();

        card_dealer
    }

    /// Takes the top card of the draw pile.
    ///
    /// An empty draw pile is first replenished from the discard pile. If both are empty, returns `None`.
    pub fn deal_draw_pile_card(&mut self) -> Option<TrainColor> {
        if self.draw_pile.is_empty() {
            self.reshuffle_discard_into_draw();
        }

        self.draw_pile.pop()
    }

    /// Looks at a face-up card without taking it.
    #[inline]
    pub fn peek_face_up_card(&self, slot: usize) -> Option<TrainColor> {
        self.face_up.get(slot).copied().flatten()
    }

    /// Takes the card displayed in `slot`, then refills the display.
    ///
    /// Returns `None` if the slot is empty or out of bounds, in which case nothing changes.
    ///
    /// # Example
    /// ```
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    /// use ticket_to_ride::card::CardDealer;
    /// use ticket_to_ride::rules::Rules;
    ///
    /// let mut card_dealer = CardDealer::new(&Rules::default(), ChaCha8Rng::seed_from_u64(7));
    ///
    /// assert!(card_dealer.deal_face_up_card(2).is_some());
    /// assert!(card_dealer.deal_face_up_card(5).is_none());
    /// assert!(card_dealer.face_up().iter().all(Option::is_some));
    /// ```
    pub fn deal_face_up_card(&mut self, slot: usize) -> Option<TrainColor> {
        let card = self.face_up.get_mut(slot)?.take()?;
        self.refill_face_up();

        Some(card)
    }

    /// Fills every empty face-up slot from the draw pile.
    ///
    /// Whenever a fill brings the display to the wild card limit while the discard pile
    /// holds cards, the whole display is discarded and filled again. This happens at most
    /// `max_face_up_wipes` times per call. Returns the number of wipes.
    pub fn refill_face_up(&mut self) -> usize {
        let mut num_wipes = 0;

        'refill: loop {
            for slot in 0..NUM_FACE_UP_CARDS {
                if self.face_up[slot].is_some() {
                    continue;
                }

                match self.deal_draw_pile_card() {
                    Some(card) => self.face_up[slot] = Some(card),
                    None => break 'refill,
                }

                if num_wipes < self.max_face_up_wipes && self.should_wipe_face_up() {
                    num_wipes += 1;
                    debug!(
                        "Wiping the face-up display ({} wild cards, wipe #{}).",
                        self.num_face_up_wild_cards(),
                        num_wipes
                    );
                    self.discard_pile
                        .extend(self.face_up.iter_mut().filter_map(Option::take));
                    continue 'refill;
                }
            }

            break;
        }

        num_wipes
    }

    /// Moves the discard pile into the draw pile and shuffles it.
    pub fn reshuffle_discard_into_draw(&mut self) {
        if self.discard_pile.is_empty() {
            return;
        }

        debug!(
            "Reshuffling {} discarded train cards into the draw pile.",
            self.discard_pile.len()
        );
        self.draw_pile.append(&mut self.discard_pile);
        self.draw_pile.shuffle(&mut self.rng);
    }

    /// Adds the given train cards to the discard pile.
    pub fn add_to_discard<I>(&mut self, cards: I)
    where
        I: IntoIterator<Item = TrainColor>,
    {
        self.discard_pile.extend(cards);
    }

    #[inline]
    pub fn num_face_up_wild_cards(&self) -> usize {
        self.face_up
            .iter()
            .filter(|card| matches!(card, Some(TrainColor::Wild)))
            .count()
    }

    #[inline]
    fn should_wipe_face_up(&self) -> bool {
        self.num_face_up_wild_cards() >= self.max_wild_cards && !self.discard_pile.is_empty()
    }

    /// Number of cards of each color across the piles and the face-up display.
    pub fn card_counts(&self) -> HashMap<TrainColor, usize> {
        let mut counts = HashMap::new();

        for card in self
            .draw_pile
            .iter()
            .chain(&self.discard_pile)
            .chain(self.face_up.iter().flatten())
        {
            *counts.entry(*card).or_insert(0) += 1;
        }

        counts
    }

    pub fn face_up(&self) -> &[Option<TrainColor>; NUM_FACE_UP_CARDS] {
        &self.face_up
    }

    pub fn draw_pile(&self) -> &Vec<TrainColor> {
        &self.draw_pile
    }

    pub fn discard_pile(&self) -> &Vec<TrainColor> {
        &self.discard_pile
    }

    /// Mutable accessor to the face-up display.
    ///
    /// Should only be used for testing!
    pub fn get_mut_face_up(&mut self) -> &mut [Option<TrainColor>; NUM_FACE_UP_CARDS] {
        &mut self.face_up
    }

    /// Mutable accessor to the draw pile.
    ///
    /// Should only be used for testing!
    pub fn get_mut_draw_pile(&mut self) -> &mut Vec<TrainColor> {
        &mut self.draw_pile
    }

    /// Mutable accessor to the discard pile.
    ///
    /// Should only be used for testing!
    pub fn get_mut_discard_pile(&mut self) -> &mut Vec<TrainColor> {
        &mut self.discard_pile
    }

    pub fn get_state(&self) -> CardDealerState {
        CardDealerState {
            face_up: &self.face_up,
            draw_pile_size: self.draw_pile.len(),
            discard_pile_size: self.discard_pile.len(),
        }
    }
}
