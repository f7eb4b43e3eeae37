use crate::city::{CityId, CityToCity};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::VecDeque;

/// Tickets dealt by a single draw. Three by default.
pub type DealtTickets = SmallVec<[Ticket; 3]>;

/// Encapsulates information about a destination ticket.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Ticket {
    /// Position of the ticket in the board's ticket list.
    pub id: usize,
    /// The two cities that must be connected to fulfill the ticket.
    pub destination: CityToCity,
    /// How many points are granted once this ticket is fulfilled.
    /// If not fulfilled, the same amount will rather be subtracted.
    pub points: i32,
}

impl Ticket {
    pub fn new(id: usize, start: CityId, end: CityId, points: i32) -> Self {
        Self {
            id,
            destination: (start, end),
            points,
        }
    }
}

/// Deck of destination tickets, shuffled once when created.
///
/// Tickets are dealt from the top, and returned tickets go to the bottom.
#[derive(Clone, Debug)]
pub struct TicketDeck {
    tickets: VecDeque<Ticket>,
}

impl TicketDeck {
    /// # Example
    /// ```
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    /// use ticket_to_ride::city::CityId;
    /// use ticket_to_ride::ticket::{Ticket, TicketDeck};
    ///
    /// let city = |index| CityId::new(index).unwrap();
    /// let tickets = vec![
    ///     Ticket::new(0, city(0), city(1), 5),
    ///     Ticket::new(1, city(1), city(2), 8),
    /// ];
    /// let mut ticket_deck = TicketDeck::new(tickets, &mut ChaCha8Rng::seed_from_u64(1));
    ///
    /// assert_eq!(ticket_deck.deal_tickets(3).len(), 2);
    /// assert!(ticket_deck.deal_tickets(3).is_empty());
    /// ```
    pub fn new<R: Rng>(mut tickets: Vec<Ticket>, rng: &mut R) -> Self {
        tickets.shuffle(rng);

        Self {
            tickets: VecDeque::from(tickets),
        }
    }

    /// Deals up to `num` tickets from the top of the deck.
    ///
    /// Fewer tickets, possibly none, are dealt once the deck runs out.
    pub fn deal_tickets(&mut self, num: usize) -> DealtTickets {
        let num = num.min(self.tickets.len());

        self.tickets.drain(..num).collect()
    }

    /// Puts a ticket back at the bottom of the deck.
    pub fn return_ticket(&mut self, ticket: Ticket) {
        self.tickets.push_back(ticket);
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.tickets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    /// Accessor to the tickets, top of the deck first.
    ///
    /// Should only be used for testing!
    pub fn get_tickets(&self) -> &VecDeque<Ticket> {
        &self.tickets
    }
}
