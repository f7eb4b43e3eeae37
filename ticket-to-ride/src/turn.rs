use crate::board::Board;
use crate::card::{CardDealer, TrainColor};
use crate::decision::{ActionKind, DecisionContext, DecisionSource, TrainCardDraw};
use crate::error::{ClaimError, InvariantViolation, TurnFailure};
use crate::map::Map;
use crate::observation::{Observation, ObservationSink};
use crate::player::{Player, PlayerId};
use crate::rules::Rules;
use crate::ticket::TicketDeck;

use log::{debug, error, info, warn};
use std::iter::repeat;

/// Outcome of an action: `Ok` if it completed, otherwise why it did not.
pub type ActionResult = Result<(), TurnFailure>;

/// What happened during one turn.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TurnReport {
    pub player: PlayerId,
    pub action: ActionKind,
    pub result: ActionResult,
}

impl TurnReport {
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.result.is_ok()
    }
}

fn log_violation(violation: InvariantViolation) -> InvariantViolation {
    error!("{}", violation);
    violation
}

/// Plays turns on behalf of players, applying their decisions to the shared game state.
///
/// Illegal decisions end the turn with a [`TurnFailure`] and leave the state untouched,
/// except for train cards already drawn during the turn. Broken invariants are returned
/// as `Err`.
pub struct TurnEngine<'a> {
    map: &'a mut Map,
    card_dealer: &'a mut CardDealer,
    ticket_deck: &'a mut TicketDeck,
    board: &'a Board,
    rules: &'a Rules,
    num_players: usize,
    sink: &'a mut dyn ObservationSink,
}

impl<'a> TurnEngine<'a> {
    pub fn new(
        map: &'a mut Map,
        card_dealer: &'a mut CardDealer,
        ticket_deck: &'a mut TicketDeck,
        board: &'a Board,
        rules: &'a Rules,
        num_players: usize,
        sink: &'a mut dyn ObservationSink,
    ) -> Self {
        Self {
            map,
            card_dealer,
            ticket_deck,
            board,
            rules,
            num_players,
            sink,
        }
    }

    fn context<'c>(&'c self, player: &'c Player) -> DecisionContext<'c> {
        DecisionContext {
            player,
            map: &*self.map,
            face_up: self.card_dealer.face_up(),
            rules: self.rules,
            num_players: self.num_players,
        }
    }

    #[inline]
    fn observe(&mut self, observation: Observation) {
        self.sink.observe(observation);
    }

    fn observe_piles(&mut self) {
        let state = self.card_dealer.get_state();
        let (draw_pile_size, discard_pile_size) = (state.draw_pile_size, state.discard_pile_size);

        self.observe(Observation::DrawPileSize {
            size: draw_pile_size,
        });
        self.observe(Observation::DiscardPileSize {
            size: discard_pile_size,
        });
    }

    fn observe_card_dealer(&mut self) {
        let face_up = *self.card_dealer.face_up();
        for (slot, card) in face_up.into_iter().enumerate() {
            self.observe(Observation::FaceUpCard { slot, card });
        }

        self.observe_piles();
    }

    fn observe_train_cards(&mut self, player: &Player, color: TrainColor) {
        self.observe(Observation::TrainCards {
            player: player.id(),
            color,
            num: player.num_cards(color),
        });
    }

    /// Reports the whole shared state, as it stands before the first turn.
    pub fn observe_initial_state(&mut self, players: &[Player]) {
        self.observe_card_dealer();
        self.observe(Observation::TicketPileSize {
            size: self.ticket_deck.remaining(),
        });

        for player in players {
            self.observe(Observation::Trains {
                player: player.id(),
                trains: player.trains_remaining(),
            });
            self.observe(Observation::Score {
                player: player.id(),
                score: player.score(),
            });
        }
    }

    /// Plays a full turn for `player`: asks for an action, then carries it out.
    pub fn play_turn(
        &mut self,
        player: &mut Player,
        decider: &mut dyn DecisionSource,
    ) -> Result<TurnReport, InvariantViolation> {
        let action = decider.choose_action(&self.context(player));
        info!("Player {} chose to {}.", player.id(), action);

        let result = match action {
            ActionKind::ClaimRoute => self.claim_route(player, decider)?,
            ActionKind::DrawTickets => {
                let (num_dealt, min_keep) =
                    (self.rules.tickets_dealt_num, self.rules.tickets_to_keep_num);
                self.draw_tickets(player, decider, num_dealt, min_keep)?
            }
            ActionKind::DrawTrainCards => self.draw_train_cards(player, decider)?,
        };

        if let Err(failure) = &result {
            warn!("Player {} could not {}: {}", player.id(), action, failure);
        }

        Ok(TurnReport {
            player: player.id(),
            action,
            result,
        })
    }

    /// Claims the link chosen by the decision source, paying with the chosen color
    /// topped up with wild cards.
    ///
    /// Nothing changes unless the claim is valid. Otherwise, the link is claimed, the cards
    /// used are discarded, trains are spent, points are awarded, and the player's tickets
    /// are checked for completion.
    pub fn claim_route(
        &mut self,
        player: &mut Player,
        decider: &mut dyn DecisionSource,
    ) -> Result<ActionResult, InvariantViolation> {
        let link_id = decider.choose_route(&self.context(player));
        let link = match self
            .map
            .link_info(link_id)
            .and_then(|link| self.map.check_route_available(link_id, player.id()).map(|_| link))
        {
            Ok(link) => link,
            Err(e) => return Ok(Err(e.into())),
        };

        let color = decider.choose_card_color(&self.context(player));
        let wild_cards_offered = decider.choose_wild_cards_to_offer(&self.context(player));
        let request = player.claim_request(color, wild_cards_offered, link.length);
        if let Err(e) = self.map.validate_claim(link_id, &request) {
            return Ok(Err(e.into()));
        }

        let wild_cards_used = request.wild_cards;
        let color_cards_used = link.length.saturating_sub(wild_cards_used);
        if request.color_cards < color_cards_used {
            return Ok(Err(ClaimError::InsufficientCards {
                needed: link.length,
                offered: request.color_cards + wild_cards_used,
            }
            .into()));
        }

        let points = self
            .rules
            .route_value(link.length)
            .ok_or(InvariantViolation::MissingRouteValue(link.length))
            .map_err(log_violation)?;

        let claimed_link = self
            .map
            .claim_link(link_id, player.id())
            .map_err(|source| {
                log_violation(InvariantViolation::UnvalidatedClaim {
                    link: link_id,
                    source,
                })
            })?;
        player
            .remove_train_cards(color, color_cards_used)
            .map_err(log_violation)?;
        player
            .remove_train_cards(TrainColor::Wild, wild_cards_used)
            .map_err(log_violation)?;
        self.card_dealer.add_to_discard(
            repeat(color)
                .take(color_cards_used as usize)
                .chain(repeat(TrainColor::Wild).take(wild_cards_used as usize)),
        );
        player.spend_trains(link.length).map_err(log_violation)?;
        player.add_points(points);
        player.add_claimed_link(&claimed_link);

        info!(
            "Player {} has claimed the {} link between {} with {} {} cards and {} wild cards, for {} points.",
            player.id(),
            link.color,
            self.board.describe(link.cities),
            color_cards_used,
            color,
            wild_cards_used,
            points
        );

        self.observe(Observation::RouteOwner {
            player: player.id(),
            route: claimed_link.route_id,
            link: link_id,
        });
        self.observe_train_cards(player, color);
        self.observe_train_cards(player, TrainColor::Wild);
        self.observe_piles();
        self.observe(Observation::Trains {
            player: player.id(),
            trains: player.trains_remaining(),
        });
        self.observe(Observation::Score {
            player: player.id(),
            score: player.score(),
        });

        for ticket_id in player.check_completed_tickets() {
            info!("Player {} completed ticket {}.", player.id(), ticket_id);
            self.observe(Observation::TicketCompleted {
                player: player.id(),
                ticket: ticket_id,
            });
        }

        Ok(Ok(()))
    }

    /// Deals `num_dealt` tickets and lets the player keep at least `min_keep` of them.
    ///
    /// The minimum is lowered to the number of tickets actually dealt. An invalid selection
    /// gives every dealt ticket back to the deck.
    pub fn draw_tickets(
        &mut self,
        player: &mut Player,
        decider: &mut dyn DecisionSource,
        num_dealt: usize,
        min_keep: usize,
    ) -> Result<ActionResult, InvariantViolation> {
        let dealt = self.ticket_deck.deal_tickets(num_dealt);
        if dealt.is_empty() {
            return Ok(Err(TurnFailure::NoTicketsLeft));
        }

        let min_keep = min_keep.min(dealt.len());
        let selection = decider.choose_tickets_to_keep(&self.context(player), &dealt, min_keep);

        if !selection.is_valid(dealt.len(), min_keep) {
            let num_dealt = dealt.len();
            for ticket in dealt {
                self.ticket_deck.return_ticket(ticket);
            }

            return Ok(Err(TurnFailure::InvalidTicketSelection {
                dealt: num_dealt,
                min_keep,
            }));
        }

        for index in &selection.kept {
            let ticket = dealt[*index].clone();
            info!(
                "Player {} kept the ticket {} ({} points).",
                player.id(),
                self.board.describe(ticket.destination),
                ticket.points
            );
            self.observe(Observation::TicketOwner {
                player: player.id(),
                ticket: ticket.id,
            });
            player.add_ticket(ticket);
        }

        for index in &selection.discarded {
            self.ticket_deck.return_ticket(dealt[*index].clone());
        }

        self.observe(Observation::TicketPileSize {
            size: self.ticket_deck.remaining(),
        });

        Ok(Ok(()))
    }

    /// Takes up to `train_cards_dealt_num` train cards, from the face-up display or the draw pile.
    ///
    /// Under the wild card restriction, a face-up wild card can only be taken first, and
    /// taking it ends the draw. Cards drawn before a failed draw are kept.
    pub fn draw_train_cards(
        &mut self,
        player: &mut Player,
        decider: &mut dyn DecisionSource,
    ) -> Result<ActionResult, InvariantViolation> {
        for draw in 0..self.rules.train_cards_dealt_num {
            let (card, ends_draw) = match decider.choose_train_card_draw(&self.context(player)) {
                TrainCardDraw::FaceUp(slot) => {
                    let card = match self.card_dealer.peek_face_up_card(slot) {
                        Some(card) => card,
                        None => return Ok(Err(TurnFailure::FaceUpSlotEmpty(slot))),
                    };

                    let restricted = card.is_wild() && self.rules.wild_card_restriction;
                    if restricted && draw > 0 {
                        return Ok(Err(TurnFailure::WildCardNotFirstDraw));
                    }

                    self.card_dealer
                        .deal_face_up_card(slot)
                        .ok_or(InvariantViolation::FaceUpSlotVanished(slot))
                        .map_err(log_violation)?;
                    self.observe_card_dealer();

                    (card, restricted)
                }
                TrainCardDraw::DrawPile => match self.card_dealer.deal_draw_pile_card() {
                    Some(card) => {
                        self.observe_piles();
                        (card, false)
                    }
                    None => return Ok(Err(TurnFailure::TrainCardsExhausted)),
                },
            };

            player.add_train_card(card);
            debug!("Player {} drew a {} train card.", player.id(), card);
            self.observe_train_cards(player, card);

            if ends_draw {
                break;
            }
        }

        Ok(Ok(()))
    }

    /// Deals the starting hand of train cards, stopping early if the piles run out.
    pub fn deal_starting_hand(&mut self, player: &mut Player) {
        for _ in 0..self.rules.starting_hand_size {
            match self.card_dealer.deal_draw_pile_card() {
                Some(card) => {
                    player.add_train_card(card);
                    self.observe_train_cards(player, card);
                }
                None => {
                    warn!("No train cards left to deal to player {}.", player.id());
                    break;
                }
            }
        }

        self.observe_piles();
    }
}
