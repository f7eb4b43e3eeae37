use pretty_assertions::assert_eq;
use smallvec::SmallVec;
use std::collections::{HashMap, VecDeque};
use strum::IntoEnumIterator;
use ticket_to_ride::board::{Board, BoardVariant};
use ticket_to_ride::card::TrainColor;
use ticket_to_ride::decision::{
    ActionKind, DecisionContext, DecisionSource, RandomDecider, TicketSelection, TrainCardDraw,
};
use ticket_to_ride::error::{ClaimError, TurnFailure};
use ticket_to_ride::game::{Game, GamePhase};
use ticket_to_ride::map::LinkId;
use ticket_to_ride::observation::{NullSink, Observation, ObservationSink};
use ticket_to_ride::player::Player;
use ticket_to_ride::rules::Rules;
use ticket_to_ride::ticket::Ticket;

/// One scripted turn. Fields left empty fall back to drawing from the draw pile.
#[derive(Default)]
struct Turn {
    action: Option<ActionKind>,
    route: LinkId,
    color: Option<TrainColor>,
    wild_cards: u8,
    draws: Vec<TrainCardDraw>,
}

fn claim(route: LinkId, color: TrainColor, wild_cards: u8) -> Turn {
    Turn {
        action: Some(ActionKind::ClaimRoute),
        route,
        color: Some(color),
        wild_cards,
        ..Turn::default()
    }
}

fn draw(draws: Vec<TrainCardDraw>) -> Turn {
    Turn {
        action: Some(ActionKind::DrawTrainCards),
        draws,
        ..Turn::default()
    }
}

/// Plays its turns in order, keeping every ticket it is dealt.
struct ScriptedDecider {
    turns: VecDeque<Turn>,
    current: Turn,
}

impl ScriptedDecider {
    fn new(turns: Vec<Turn>) -> Self {
        Self {
            turns: VecDeque::from(turns),
            current: Turn::default(),
        }
    }
}

impl DecisionSource for ScriptedDecider {
    fn choose_action(&mut self, _context: &DecisionContext) -> ActionKind {
        self.current = self.turns.pop_front().unwrap_or_default();
        self.current.action.unwrap_or(ActionKind::DrawTrainCards)
    }

    fn choose_tickets_to_keep(
        &mut self,
        _context: &DecisionContext,
        dealt: &[Ticket],
        _min_keep: usize,
    ) -> TicketSelection {
        TicketSelection {
            kept: (0..dealt.len()).collect(),
            discarded: SmallVec::new(),
        }
    }

    fn choose_route(&mut self, _context: &DecisionContext) -> LinkId {
        self.current.route
    }

    fn choose_card_color(&mut self, _context: &DecisionContext) -> TrainColor {
        self.current.color.unwrap_or(TrainColor::Red)
    }

    fn choose_wild_cards_to_offer(&mut self, _context: &DecisionContext) -> u8 {
        self.current.wild_cards
    }

    fn choose_train_card_draw(&mut self, _context: &DecisionContext) -> TrainCardDraw {
        if self.current.draws.is_empty() {
            TrainCardDraw::DrawPile
        } else {
            self.current.draws.remove(0)
        }
    }
}

/// Albany - Buffalo is a grey route of length 3 (link 0), Buffalo - Chester a red/blue
/// double route of length 2 (links 1 and 2), Chester - Dover a green route of length 4 (link 3).
fn small_board() -> Board {
    Board::parse(
        "Albany\nBuffalo\nChester\nDover\n",
        "Albany, Buffalo, 3, grey\nBuffalo, Chester, 2, red, blue\nChester, Dover, 4, green\n",
        "Albany, Chester, 6\nAlbany, Dover, 9\nBuffalo, Dover, 7\nAlbany, Buffalo, 3\n\
         Buffalo, Chester, 2\nChester, Dover, 4\nDover, Albany, 9\nChester, Albany, 6\n",
    )
    .unwrap()
}

/// A started game on the small board, where player 0 plays first with an empty hand.
fn scripted_game(scripts: Vec<Vec<Turn>>) -> Game<Vec<Observation>> {
    let num_players = scripts.len();
    let deciders: Vec<Box<dyn DecisionSource>> = scripts
        .into_iter()
        .map(|turns| Box::new(ScriptedDecider::new(turns)) as Box<dyn DecisionSource>)
        .collect();

    let mut game = Game::new(small_board(), Rules::default(), deciders, 3, Vec::new()).unwrap();
    game.start().unwrap();
    game.set_current_player(0);

    for (id, player) in game.get_mut_players().iter_mut().enumerate() {
        let mut replacement = Player::new(id, 45);
        for held in player.tickets() {
            replacement.add_ticket(held.ticket.clone());
        }
        *player = replacement;
    }

    game
}

fn give(game: &mut Game<Vec<Observation>>, player_id: usize, cards: &[TrainColor]) {
    for card in cards {
        game.get_mut_players()[player_id].add_train_card(*card);
    }
}

fn total_card_counts<S: ObservationSink>(game: &Game<S>) -> HashMap<TrainColor, usize> {
    let mut counts = game.card_dealer().card_counts();
    for player in game.players() {
        for (color, num) in player.hand() {
            *counts.entry(*color).or_insert(0) += *num as usize;
        }
    }

    counts
}

#[test]
fn claim_grey_route_with_red_cards() {
    let mut game = scripted_game(vec![vec![claim(0, TrainColor::Red, 0)], vec![]]);
    give(&mut game, 0, &[TrainColor::Red; 3]);

    let report = game.play_turn().unwrap();

    assert_eq!(report.result, Ok(()));
    let player = &game.players()[0];
    assert_eq!(player.score(), 4);
    assert_eq!(player.trains_remaining(), 42);
    assert_eq!(player.num_cards(TrainColor::Red), 0);
    assert_eq!(game.map().route_owners(0).to_vec(), vec![Some(0)]);
    assert_eq!(game.card_dealer().discard_pile(), &vec![TrainColor::Red; 3]);
    assert_eq!(game.current_player(), 1);
    assert_eq!(game.completed_moves(), 1);
}

#[test]
fn draw_with_both_piles_empty() {
    let mut game = scripted_game(vec![vec![draw(vec![TrainCardDraw::DrawPile])], vec![]]);
    game.get_mut_card_dealer().get_mut_draw_pile().clear();
    game.get_mut_card_dealer().get_mut_discard_pile().clear();
    let face_up = *game.card_dealer().face_up();

    let report = game.play_turn().unwrap();

    assert_eq!(report.result, Err(TurnFailure::TrainCardsExhausted));
    assert_eq!(game.players()[0].num_train_cards(), 0);
    assert_eq!(game.card_dealer().face_up(), &face_up);
    // A failed turn still ends the turn.
    assert_eq!(game.current_player(), 1);
    assert_eq!(game.total_moves(), 1);
    assert_eq!(game.completed_moves(), 0);
}

#[test]
fn third_face_up_wild_card_wipes_display() {
    let mut game = scripted_game(vec![
        vec![draw(vec![TrainCardDraw::FaceUp(0), TrainCardDraw::FaceUp(1)])],
        vec![],
    ]);
    {
        let card_dealer = game.get_mut_card_dealer();
        *card_dealer.get_mut_face_up() = [
            Some(TrainColor::Blue),
            Some(TrainColor::Wild),
            Some(TrainColor::Wild),
            Some(TrainColor::Red),
            Some(TrainColor::Red),
        ];
        *card_dealer.get_mut_draw_pile() = vec![
            TrainColor::Green,
            TrainColor::Green,
            TrainColor::Green,
            TrainColor::Green,
            TrainColor::Green,
            TrainColor::Wild,
        ];
        *card_dealer.get_mut_discard_pile() = vec![TrainColor::Orange];
    }
    let num_observations = game.sink().len();

    let report = game.play_turn().unwrap();

    assert_eq!(report.result, Ok(()));
    let player = &game.players()[0];
    assert_eq!(player.num_cards(TrainColor::Blue), 1);
    assert_eq!(player.num_cards(TrainColor::Green), 1);

    let card_dealer = game.card_dealer();
    assert!(card_dealer.num_face_up_wild_cards() < 3);
    assert!(card_dealer.face_up().iter().all(Option::is_some));

    let counts = card_dealer.card_counts();
    assert_eq!(counts.get(&TrainColor::Wild), Some(&3));
    assert_eq!(counts.get(&TrainColor::Green), Some(&4));
    assert_eq!(counts.values().sum::<usize>(), 10);

    let wiped_display: Vec<Observation> = game.sink()[num_observations..]
        .iter()
        .filter(|observation| matches!(observation, Observation::FaceUpCard { .. }))
        .cloned()
        .take(5)
        .collect();
    assert_eq!(
        wiped_display,
        (0..5)
            .map(|slot| Observation::FaceUpCard {
                slot,
                card: Some(TrainColor::Green)
            })
            .collect::<Vec<_>>()
    );
}

#[test]
fn parallel_link_locked_with_two_players() {
    let mut game = scripted_game(vec![
        vec![claim(1, TrainColor::Red, 0)],
        vec![claim(2, TrainColor::Blue, 0)],
    ]);
    give(&mut game, 0, &[TrainColor::Red; 2]);
    give(&mut game, 1, &[TrainColor::Blue; 2]);

    assert_eq!(game.play_turn().unwrap().result, Ok(()));
    assert_eq!(
        game.play_turn().unwrap().result,
        Err(TurnFailure::Claim(ClaimError::RouteLockedBySingleUsePolicy))
    );

    assert_eq!(game.players()[1].num_cards(TrainColor::Blue), 2);
    assert_eq!(game.map().route_owners(1).to_vec(), vec![Some(0), None]);
}

#[test]
fn parallel_link_open_with_four_players() {
    let mut game = scripted_game(vec![
        vec![claim(1, TrainColor::Red, 0), claim(2, TrainColor::Blue, 0)],
        vec![claim(2, TrainColor::Blue, 0)],
        vec![],
        vec![],
    ]);
    give(&mut game, 0, &[TrainColor::Red, TrainColor::Red, TrainColor::Blue, TrainColor::Blue]);
    give(&mut game, 1, &[TrainColor::Blue; 2]);

    assert_eq!(game.play_turn().unwrap().result, Ok(()));
    assert_eq!(game.play_turn().unwrap().result, Ok(()));
    assert_eq!(game.map().route_owners(1).to_vec(), vec![Some(0), Some(1)]);

    game.play_turn().unwrap();
    game.play_turn().unwrap();
    assert_eq!(
        game.play_turn().unwrap().result,
        Err(TurnFailure::Claim(ClaimError::OwnLinkAlreadyOnRoute))
    );
}

#[test]
fn claiming_completes_ticket_and_scores_it() {
    let mut game = scripted_game(vec![
        vec![claim(0, TrainColor::Red, 1), claim(1, TrainColor::Red, 0)],
        vec![],
    ]);
    let albany_chester = game.board().tickets()[0].clone();
    game.get_mut_players()[0] = Player::new(0, 8);
    game.get_mut_players()[0].add_ticket(albany_chester.clone());
    give(
        &mut game,
        0,
        &[TrainColor::Red, TrainColor::Red, TrainColor::Wild, TrainColor::Red, TrainColor::Red],
    );

    game.play_turn().unwrap();
    game.play_turn().unwrap();
    game.play_turn().unwrap();

    // Player 0 is down to 3 trains after their second claim.
    assert_eq!(game.phase(), GamePhase::LastRound);
    assert!(game.players()[0].tickets()[0].completed);
    assert!(game.sink().contains(&Observation::TicketCompleted {
        player: 0,
        ticket: albany_chester.id
    }));

    game.play_turn().unwrap();
    game.play_turn().unwrap();
    assert_eq!(game.phase(), GamePhase::Finished);

    // 4 + 2 for the routes, the ticket, and the longest path bonus.
    let expected = 4 + 2 + albany_chester.points + 10;
    assert_eq!(game.players()[0].score(), expected);
    assert_eq!(game.winner(), Some(0));
}

fn random_game<S: ObservationSink>(num_players: usize, seed: u64, rules: Rules, sink: S) -> Game<S> {
    let deciders: Vec<Box<dyn DecisionSource>> = (0..num_players)
        .map(|id| Box::new(RandomDecider::new(seed * 10 + id as u64)) as Box<dyn DecisionSource>)
        .collect();

    Game::new(
        Board::builtin(BoardVariant::Usa).unwrap(),
        rules,
        deciders,
        seed,
        sink,
    )
    .unwrap()
}

#[test]
fn random_games_conserve_cards_tickets_and_trains() {
    for seed in 0..4 {
        let mut game = random_game(2 + seed as usize, seed, Rules::default(), NullSink);
        let num_tickets = game.board().tickets().len();
        game.start().unwrap();

        while game.phase() != GamePhase::Finished && game.total_moves() < 20_000 {
            game.play_turn().unwrap();

            let counts = total_card_counts(&game);
            for color in TrainColor::iter() {
                let expected = if color.is_wild() { 14 } else { 12 };
                assert_eq!(counts.get(&color).copied().unwrap_or(0), expected);
            }

            let num_held_tickets: usize = game.players().iter().map(|p| p.tickets().len()).sum();
            assert_eq!(game.ticket_deck().remaining() + num_held_tickets, num_tickets);

            for player in game.players() {
                let spent: u8 = player
                    .claimed_links()
                    .iter()
                    .map(|link_id| game.map().link_info(*link_id).unwrap().length)
                    .sum();
                assert_eq!(player.trains_remaining() + spent, 45);
            }
        }

        assert_eq!(game.phase(), GamePhase::Finished);
    }
}

#[test]
fn random_game_observations_match_final_state() {
    let mut game = random_game(3, 17, Rules::default(), Vec::new()).with_max_moves(Some(20_000));

    let summary = game.play().unwrap();
    assert!(summary.finished);

    let mut last_scores = vec![None; 3];
    let mut num_route_owners = 0;
    for observation in game.sink() {
        match observation {
            Observation::Score { player, score } => last_scores[*player] = Some(*score),
            Observation::RouteOwner { .. } => num_route_owners += 1,
            _ => {}
        }
    }

    let final_scores: Vec<Option<i32>> = summary.scores.iter().copied().map(Some).collect();
    assert_eq!(last_scores, final_scores);
    let num_claimed: usize = summary.players.iter().map(|p| p.claimed_links.len()).sum();
    assert_eq!(num_route_owners, num_claimed);
}

#[test]
fn random_games_with_nordic_rules() {
    let mut game = random_game(3, 5, Rules::for_variant(BoardVariant::Nordic), NullSink)
        .with_max_moves(Some(20_000));

    let summary = game.play().unwrap();

    assert!(summary.finished);
    assert!(summary.players.iter().any(|p| p.globetrotter_bonus_awarded));
    assert!(summary.players.iter().all(|p| !p.longest_path_bonus_awarded));
}

#[test]
fn random_games_are_reproducible() {
    let play = |seed| {
        random_game(2, seed, Rules::default(), NullSink)
            .with_max_moves(Some(20_000))
            .play()
            .unwrap()
    };

    assert_eq!(play(8), play(8));
}
