use crate::card::TrainColor;
use crate::error::InvariantViolation;
use crate::map::{ClaimRequest, LinkId, LinkInfo};
use crate::network::ClaimedNetwork;
use crate::ticket::Ticket;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter};

/// Position of a player in turn order.
pub type PlayerId = usize;

/// Every player has their own color.
#[derive(
    Clone, Copy, Debug, Deserialize, Display, EnumCountMacro, EnumIter, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlayerColor {
    Red,
    Blue,
    Green,
    Yellow,
    Black,
}

impl PlayerColor {
    /// The color handed to the player at `player_id`.
    pub fn for_player(player_id: PlayerId) -> Self {
        PlayerColor::iter()
            .nth(player_id % PlayerColor::COUNT)
            .unwrap_or(PlayerColor::Red)
    }
}

/// A ticket in a player's hand.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct HeldTicket {
    pub ticket: Ticket,
    /// Once set, never unset.
    pub completed: bool,
}

/// All the state owned by one player throughout a game.
#[derive(Clone, Debug)]
pub struct Player {
    id: PlayerId,
    color: PlayerColor,
    /// Train cards, by color. Colors never held are absent.
    hand: HashMap<TrainColor, u8>,
    /// The currency used, alongside train cards, to claim routes.
    trains_remaining: u8,
    /// Points gained by claiming routes, and at the end of the game for tickets and bonuses.
    /// Can be negative.
    score: i32,
    tickets: Vec<HeldTicket>,
    claimed_links: Vec<LinkId>,
    network: ClaimedNetwork,
    longest_path_bonus_awarded: bool,
    globetrotter_bonus_awarded: bool,
}

impl Player {
    pub fn new(id: PlayerId, trains: u8) -> Self {
        Self {
            id,
            color: PlayerColor::for_player(id),
            hand: HashMap::new(),
            trains_remaining: trains,
            score: 0,
            tickets: Vec::new(),
            claimed_links: Vec::new(),
            network: ClaimedNetwork::new(),
            longest_path_bonus_awarded: false,
            globetrotter_bonus_awarded: false,
        }
    }

    #[inline]
    pub fn id(&self) -> PlayerId {
        self.id
    }

    #[inline]
    pub fn color(&self) -> PlayerColor {
        self.color
    }

    pub fn hand(&self) -> &HashMap<TrainColor, u8> {
        &self.hand
    }

    /// How many cards of `color` the player holds.
    #[inline]
    pub fn num_cards(&self, color: TrainColor) -> u8 {
        self.hand.get(&color).copied().unwrap_or(0)
    }

    /// How many train cards the player holds, all colors included.
    pub fn num_train_cards(&self) -> usize {
        self.hand.values().map(|num| *num as usize).sum()
    }

    #[inline]
    pub fn trains_remaining(&self) -> u8 {
        self.trains_remaining
    }

    #[inline]
    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn tickets(&self) -> &[HeldTicket] {
        &self.tickets
    }

    pub fn num_completed_tickets(&self) -> usize {
        self.tickets.iter().filter(|held| held.completed).count()
    }

    pub fn claimed_links(&self) -> &[LinkId] {
        &self.claimed_links
    }

    pub fn network(&self) -> &ClaimedNetwork {
        &self.network
    }

    /// Length, in links, of the longest path through the player's claimed links.
    pub fn longest_path(&self) -> usize {
        self.network.longest_path()
    }

    #[inline]
    pub fn longest_path_bonus_awarded(&self) -> bool {
        self.longest_path_bonus_awarded
    }

    #[inline]
    pub fn globetrotter_bonus_awarded(&self) -> bool {
        self.globetrotter_bonus_awarded
    }

    /// Should only be used for testing!
    #[inline]
    pub fn get_mut_network(&mut self) -> &mut ClaimedNetwork {
        &mut self.network
    }

    pub fn add_train_card(&mut self, card: TrainColor) {
        *self.hand.entry(card).or_insert(0) += 1;
    }

    /// Takes `num` cards of `color` out of the hand.
    pub fn remove_train_cards(
        &mut self,
        color: TrainColor,
        num: u8,
    ) -> Result<(), InvariantViolation> {
        let held = self.num_cards(color);
        if held < num {
            return Err(InvariantViolation::NotEnoughCards {
                player: self.id,
                color,
                held,
                requested: num,
            });
        }

        if held == num {
            self.hand.remove(&color);
        } else {
            self.hand.insert(color, held - num);
        }

        Ok(())
    }

    pub fn spend_trains(&mut self, num: u8) -> Result<(), InvariantViolation> {
        self.trains_remaining =
            self.trains_remaining
                .checked_sub(num)
                .ok_or(InvariantViolation::NotEnoughTrains {
                    player: self.id,
                    remaining: self.trains_remaining,
                    requested: num,
                })?;

        Ok(())
    }

    #[inline]
    pub fn add_points(&mut self, points: i32) {
        self.score += points;
    }

    /// Adds a ticket to the player's hand, not completed yet.
    pub fn add_ticket(&mut self, ticket: Ticket) {
        self.tickets.push(HeldTicket {
            ticket,
            completed: false,
        });
    }

    /// Marks the held ticket `ticket_id` as completed.
    ///
    /// Returns whether it was not completed before.
    pub fn complete_ticket(&mut self, ticket_id: usize) -> Result<bool, InvariantViolation> {
        let held = self
            .tickets
            .iter_mut()
            .find(|held| held.ticket.id == ticket_id)
            .ok_or(InvariantViolation::UnknownTicket {
                player: self.id,
                ticket: ticket_id,
            })?;

        let newly_completed = !held.completed;
        held.completed = true;

        Ok(newly_completed)
    }

    /// Records a link the player just claimed.
    pub fn add_claimed_link(&mut self, link: &LinkInfo) {
        self.claimed_links.push(link.link_id);
        self.network.add_link(link.cities);
    }

    /// Marks as completed every held ticket whose cities the claimed links now connect.
    ///
    /// Returns the ids of the tickets completed by this call.
    pub fn check_completed_tickets(&mut self) -> SmallVec<[usize; 4]> {
        let mut newly_completed = SmallVec::new();

        for held in self.tickets.iter_mut().filter(|held| !held.completed) {
            let (start, end) = held.ticket.destination;
            if self.network.connects(start, end) {
                held.completed = true;
                newly_completed.push(held.ticket.id);
            }
        }

        newly_completed
    }

    /// What the player can pay for a route of `route_length` with `color` cards,
    /// topped up with at most `wild_cards_offered` wild cards.
    ///
    /// The wild cards are capped by the ones in hand and by the route length.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride::card::TrainColor;
    /// use ticket_to_ride::player::Player;
    ///
    /// let mut player = Player::new(0, 45);
    /// player.add_train_card(TrainColor::Red);
    /// player.add_train_card(TrainColor::Wild);
    ///
    /// let request = player.claim_request(TrainColor::Red, 4, 3);
    /// assert_eq!(request.color_cards, 1);
    /// assert_eq!(request.wild_cards, 1);
    /// assert_eq!(request.trains_remaining, 45);
    /// ```
    pub fn claim_request(
        &self,
        color: TrainColor,
        wild_cards_offered: u8,
        route_length: u8,
    ) -> ClaimRequest {
        ClaimRequest {
            player_id: self.id,
            color,
            color_cards: self.num_cards(color),
            wild_cards: wild_cards_offered
                .min(self.num_cards(TrainColor::Wild))
                .min(route_length),
            trains_remaining: self.trains_remaining,
        }
    }

    pub fn award_longest_path_bonus(&mut self, points: i32) {
        self.longest_path_bonus_awarded = true;
        self.score += points;
    }

    pub fn award_globetrotter_bonus(&mut self, points: i32) {
        self.globetrotter_bonus_awarded = true;
        self.score += points;
    }

    pub fn summary(&self) -> PlayerSummary {
        PlayerSummary {
            id: self.id,
            color: self.color,
            score: self.score,
            trains_remaining: self.trains_remaining,
            num_train_cards: self.num_train_cards(),
            claimed_links: self.claimed_links.clone(),
            longest_path: self.longest_path(),
            longest_path_bonus_awarded: self.longest_path_bonus_awarded,
            globetrotter_bonus_awarded: self.globetrotter_bonus_awarded,
            tickets: self.tickets.clone(),
        }
    }
}

/// Snapshot of a player, as reported once a game is over.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub color: PlayerColor,
    pub score: i32,
    pub trains_remaining: u8,
    pub num_train_cards: usize,
    pub claimed_links: Vec<LinkId>,
    pub longest_path: usize,
    pub longest_path_bonus_awarded: bool,
    pub globetrotter_bonus_awarded: bool,
    pub tickets: Vec<HeldTicket>,
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::city::CityId;

    fn city(index: usize) -> CityId {
        CityId::new(index).unwrap()
    }

    fn link(link_id: LinkId, start: usize, end: usize) -> LinkInfo {
        LinkInfo {
            link_id,
            route_id: link_id,
            cities: (city(start), city(end)),
            length: 2,
            color: TrainColor::Wild,
            claimed_by: Some(0),
        }
    }

    // Tests for `PlayerColor`.

    #[test]
    fn player_color_to_json() -> serde_json::Result<()> {
        assert_eq!(serde_json::to_string(&PlayerColor::Blue)?, r#""blue""#);
        Ok(())
    }

    #[test]
    fn json_to_player_color() -> serde_json::Result<()> {
        assert_eq!(
            serde_json::from_str::<PlayerColor>(r#""yellow""#)?,
            PlayerColor::Yellow
        );
        assert!(serde_json::from_str::<PlayerColor>(r#""turquoise""#).is_err());
        Ok(())
    }

    #[test]
    fn player_color_for_player() {
        assert_eq!(PlayerColor::for_player(0), PlayerColor::Red);
        assert_eq!(PlayerColor::for_player(4), PlayerColor::Black);
        assert_eq!(PlayerColor::for_player(5), PlayerColor::Red);
    }

    // Tests for `Player`.

    #[test]
    fn player_new() {
        let player = Player::new(2, 45);

        assert_eq!(player.id(), 2);
        assert_eq!(player.color(), PlayerColor::Green);
        assert_eq!(player.trains_remaining(), 45);
        assert_eq!(player.score(), 0);
        assert_eq!(player.num_train_cards(), 0);
        assert!(player.tickets().is_empty());
        assert_eq!(player.longest_path(), 0);
    }

    #[test]
    fn player_add_and_remove_train_cards() {
        let mut player = Player::new(0, 45);
        for card in [TrainColor::Red, TrainColor::Red, TrainColor::Wild] {
            player.add_train_card(card);
        }

        assert_eq!(player.num_cards(TrainColor::Red), 2);
        assert_eq!(player.num_train_cards(), 3);

        assert_eq!(player.remove_train_cards(TrainColor::Red, 2), Ok(()));
        assert_eq!(player.num_cards(TrainColor::Red), 0);
        assert!(!player.hand().contains_key(&TrainColor::Red));

        assert_eq!(player.remove_train_cards(TrainColor::Blue, 0), Ok(()));
    }

    #[test]
    fn player_remove_too_many_train_cards() {
        let mut player = Player::new(1, 45);
        player.add_train_card(TrainColor::Blue);

        assert_eq!(
            player.remove_train_cards(TrainColor::Blue, 2),
            Err(InvariantViolation::NotEnoughCards {
                player: 1,
                color: TrainColor::Blue,
                held: 1,
                requested: 2
            })
        );
        assert_eq!(player.num_cards(TrainColor::Blue), 1);
    }

    #[test]
    fn player_spend_trains() {
        let mut player = Player::new(0, 5);

        assert_eq!(player.spend_trains(5), Ok(()));
        assert_eq!(player.trains_remaining(), 0);
        assert_eq!(
            player.spend_trains(1),
            Err(InvariantViolation::NotEnoughTrains {
                player: 0,
                remaining: 0,
                requested: 1
            })
        );
    }

    #[test]
    fn player_score_can_go_negative() {
        let mut player = Player::new(0, 45);
        player.add_points(4);
        player.add_points(-9);

        assert_eq!(player.score(), -5);
    }

    #[test]
    fn player_complete_ticket_is_idempotent() {
        let mut player = Player::new(0, 45);
        player.add_ticket(Ticket::new(7, city(0), city(1), 5));

        assert_eq!(player.complete_ticket(7), Ok(true));
        assert_eq!(player.complete_ticket(7), Ok(false));
        assert!(player.tickets()[0].completed);
        assert_eq!(player.num_completed_tickets(), 1);

        assert_eq!(
            player.complete_ticket(8),
            Err(InvariantViolation::UnknownTicket {
                player: 0,
                ticket: 8
            })
        );
    }

    #[test]
    fn player_check_completed_tickets() {
        let mut player = Player::new(0, 45);
        player.add_ticket(Ticket::new(0, city(0), city(2), 5));
        player.add_ticket(Ticket::new(1, city(3), city(0), 8));

        player.add_claimed_link(&link(4, 0, 1));
        assert!(player.check_completed_tickets().is_empty());

        player.add_claimed_link(&link(9, 2, 1));
        assert_eq!(player.check_completed_tickets().to_vec(), vec![0]);

        // Already completed tickets are not reported again.
        assert!(player.check_completed_tickets().is_empty());
        assert_eq!(player.claimed_links(), &[4, 9]);
        assert_eq!(player.longest_path(), 2);
        assert!(!player.tickets()[1].completed);
    }

    #[test]
    fn player_claim_request_caps_wild_cards() {
        let mut player = Player::new(3, 10);
        for card in [TrainColor::Wild, TrainColor::Wild, TrainColor::Green] {
            player.add_train_card(card);
        }

        let request = player.claim_request(TrainColor::Green, 200, 6);
        assert_eq!(
            request,
            ClaimRequest {
                player_id: 3,
                color: TrainColor::Green,
                color_cards: 1,
                wild_cards: 2,
                trains_remaining: 10,
            }
        );

        assert_eq!(player.claim_request(TrainColor::Green, 2, 1).wild_cards, 1);
        assert_eq!(player.claim_request(TrainColor::Green, 0, 6).wild_cards, 0);
    }

    #[test]
    fn player_bonuses() {
        let mut player = Player::new(0, 45);
        player.award_longest_path_bonus(10);
        player.award_globetrotter_bonus(15);

        assert!(player.longest_path_bonus_awarded());
        assert!(player.globetrotter_bonus_awarded());
        assert_eq!(player.score(), 25);
    }
}
