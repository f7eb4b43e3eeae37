use crate::board::Board;
use crate::card::CardDealer;
use crate::decision::DecisionSource;
use crate::error::{ConfigError, InvariantViolation};
use crate::map::Map;
use crate::observation::{Observation, ObservationSink};
use crate::player::{Player, PlayerId, PlayerSummary};
use crate::rules::{EndGameBonus, Rules};
use crate::scoring;
use crate::ticket::TicketDeck;
use crate::turn::{TurnEngine, TurnReport};

use log::{error, info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
/// Phases of the game, which act as states in the game's finite-state machine.
///
/// # JSON
/// Phases are serialized in snake_case.
pub enum GamePhase {
    /// Before the first turn: nothing has been dealt yet.
    Init,
    /// The main turn-based phase.
    Running,
    /// A player ended their turn with few trains left.
    ///
    /// Every player, that player included, gets one more turn.
    LastRound,
    /// Everybody played their last turn, and the final scores are in.
    ///
    /// No turn can be played at this point.
    Finished,
}

/// What is left of a game once it is over, or aborted.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameSummary {
    /// `false` if the game was cut short by the move limit, in which case there is
    /// no end-game scoring and no winner.
    pub finished: bool,
    pub scores: Vec<i32>,
    pub winner: Option<PlayerId>,
    /// Turns played, failed ones included.
    pub total_moves: usize,
    /// Turns whose action completed.
    pub completed_moves: usize,
    pub players: Vec<PlayerSummary>,
}

/// In charge of holding all the state of one game, and of moving turns amongst players.
///
/// This overall acts as a finite-state machine, driven by [`Game::play_turn`].
pub struct Game<S: ObservationSink> {
    /// The current phase of the game, which marks nodes (states) in this finite-state machine.
    phase: GamePhase,
    board: Board,
    rules: Rules,
    map: Map,
    card_dealer: CardDealer,
    ticket_deck: TicketDeck,
    /// Players, in turn order. A player's id is their index.
    players: Vec<Player>,
    /// One decision source per player, at the same index.
    deciders: Vec<Box<dyn DecisionSource>>,
    sink: S,
    /// Only used to pick the first player.
    rng: ChaCha8Rng,
    current_player: PlayerId,
    /// The player who triggered the last round.
    /// Only populated once we reach [`GamePhase::LastRound`]!
    last_player: Option<PlayerId>,
    total_moves: usize,
    completed_moves: usize,
    /// Once this many turns are played, [`Game::play`] gives up on the game.
    max_moves: Option<usize>,
    winner: Option<PlayerId>,
}

impl<S: ObservationSink> Game<S> {
    /// Sets up a game on `board`, with one player per decision source.
    ///
    /// Every random draw of the game derives from `seed`.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride::board::{Board, BoardVariant};
    /// use ticket_to_ride::decision::{DecisionSource, RandomDecider};
    /// use ticket_to_ride::game::{Game, GamePhase};
    /// use ticket_to_ride::observation::NullSink;
    /// use ticket_to_ride::rules::Rules;
    ///
    /// let deciders: Vec<Box<dyn DecisionSource>> =
    ///     vec![Box::new(RandomDecider::new(1)), Box::new(RandomDecider::new(2))];
    /// let mut game = Game::new(
    ///     Board::builtin(BoardVariant::Usa).unwrap(),
    ///     Rules::default(),
    ///     deciders,
    ///     42,
    ///     NullSink,
    /// )
    /// .unwrap();
    ///
    /// let summary = game.play().unwrap();
    /// assert!(summary.finished);
    /// assert_eq!(game.phase(), GamePhase::Finished);
    /// ```
    pub fn new(
        board: Board,
        rules: Rules,
        deciders: Vec<Box<dyn DecisionSource>>,
        seed: u64,
        sink: S,
    ) -> Result<Self, ConfigError> {
        let num_players = deciders.len();
        let map = Map::new(&board, num_players, rules.wild_card_restriction)?;
        rules.validate()?;

        if let Some(route) = board
            .routes()
            .iter()
            .find(|route| rules.route_value(route.length).is_none())
        {
            return Err(ConfigError::MissingRouteValue {
                length: route.length,
            });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let card_dealer = CardDealer::new(&rules, ChaCha8Rng::seed_from_u64(rng.gen()));
        let ticket_deck = TicketDeck::new(board.tickets().to_vec(), &mut rng);
        let players = (0..num_players)
            .map(|id| Player::new(id, rules.train_figures_num))
            .collect();

        Ok(Self {
            phase: GamePhase::Init,
            board,
            rules,
            map,
            card_dealer,
            ticket_deck,
            players,
            deciders,
            sink,
            rng,
            current_player: 0,
            last_player: None,
            total_moves: 0,
            completed_moves: 0,
            max_moves: None,
            winner: None,
        })
    }

    /// Caps the number of turns [`Game::play`] plays before giving up.
    pub fn with_max_moves(mut self, max_moves: Option<usize>) -> Self {
        self.max_moves = max_moves;
        self
    }

    /// Returns the number of players in the current game.
    #[inline]
    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    #[inline]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    #[inline]
    pub fn map(&self) -> &Map {
        &self.map
    }

    #[inline]
    pub fn card_dealer(&self) -> &CardDealer {
        &self.card_dealer
    }

    #[inline]
    pub fn ticket_deck(&self) -> &TicketDeck {
        &self.ticket_deck
    }

    #[inline]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[inline]
    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    #[inline]
    pub fn last_player(&self) -> Option<PlayerId> {
        self.last_player
    }

    #[inline]
    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    #[inline]
    pub fn total_moves(&self) -> usize {
        self.total_moves
    }

    #[inline]
    pub fn completed_moves(&self) -> usize {
        self.completed_moves
    }

    #[inline]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the game, handing back its observation sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Should only be used for testing!
    #[inline]
    pub fn get_mut_players(&mut self) -> &mut Vec<Player> {
        &mut self.players
    }

    /// Should only be used for testing!
    #[inline]
    pub fn get_mut_card_dealer(&mut self) -> &mut CardDealer {
        &mut self.card_dealer
    }

    /// Should only be used for testing!
    #[inline]
    pub fn get_mut_ticket_deck(&mut self) -> &mut TicketDeck {
        &mut self.ticket_deck
    }

    /// Should only be used for testing!
    #[inline]
    pub fn set_current_player(&mut self, player_id: PlayerId) {
        self.current_player = player_id;
    }

    /// Picks the first player, deals every player their starting hand and lets them
    /// select their initial tickets, then moves to [`GamePhase::Running`].
    ///
    /// Does nothing outside of [`GamePhase::Init`].
    pub fn start(&mut self) -> Result<(), InvariantViolation> {
        if self.phase != GamePhase::Init {
            return Ok(());
        }

        let num_players = self.num_players();
        self.current_player = self.rng.gen_range(0..num_players);
        info!(
            "Starting a game with {} players, player {} goes first.",
            num_players, self.current_player
        );

        let mut engine = TurnEngine::new(
            &mut self.map,
            &mut self.card_dealer,
            &mut self.ticket_deck,
            &self.board,
            &self.rules,
            num_players,
            &mut self.sink,
        );
        engine.observe_initial_state(&self.players);

        for (player, decider) in self.players.iter_mut().zip(self.deciders.iter_mut()) {
            engine.deal_starting_hand(player);

            let result = engine.draw_tickets(
                player,
                decider.as_mut(),
                self.rules.initial_tickets_dealt_num,
                self.rules.initial_tickets_to_keep_num,
            )?;
            if let Err(failure) = result {
                warn!(
                    "Player {} did not select their initial tickets: {}",
                    player.id(),
                    failure
                );
            }
        }

        self.phase = GamePhase::Running;

        Ok(())
    }

    /// Plays the turn of the current player, then hands the turn to the next player.
    ///
    /// Starts the game first if needed. A player ending their turn with
    /// `min_train_figures_num` trains or fewer starts the last round, and the game is
    /// over once that player has played one more turn: final scores are then computed.
    pub fn play_turn(&mut self) -> Result<TurnReport, InvariantViolation> {
        match self.phase {
            GamePhase::Init => self.start()?,
            GamePhase::Finished => {
                error!("Cannot play a turn, the game is already finished.");
                return Err(InvariantViolation::GameFinished);
            }
            _ => {}
        }

        let player_id = self.current_player;
        let num_players = self.num_players();

        let report = {
            let mut engine = TurnEngine::new(
                &mut self.map,
                &mut self.card_dealer,
                &mut self.ticket_deck,
                &self.board,
                &self.rules,
                num_players,
                &mut self.sink,
            );
            engine.play_turn(
                &mut self.players[player_id],
                self.deciders[player_id].as_mut(),
            )?
        };

        self.total_moves += 1;
        if report.is_complete() {
            self.completed_moves += 1;
        }

        let trains_remaining = self.players[player_id].trains_remaining();
        match self.phase {
            GamePhase::Running if trains_remaining <= self.rules.min_train_figures_num => {
                info!(
                    "Player {} has {} trains left, starting the last round.",
                    player_id, trains_remaining
                );
                self.last_player = Some(player_id);
                self.phase = GamePhase::LastRound;
            }
            GamePhase::LastRound if self.last_player == Some(player_id) => {
                self.finish();
                return Ok(report);
            }
            _ => {}
        }

        self.current_player = (player_id + 1) % num_players;

        Ok(report)
    }

    /// Plays turns until the game is over, or until the move limit is reached.
    pub fn play(&mut self) -> Result<GameSummary, InvariantViolation> {
        self.start()?;

        while self.phase != GamePhase::Finished {
            if let Some(max_moves) = self.max_moves {
                if self.total_moves >= max_moves {
                    warn!("Giving up on the game after {} moves.", self.total_moves);
                    return Ok(self.summary());
                }
            }

            self.play_turn()?;
        }

        Ok(self.summary())
    }

    /// Scores tickets and the end-game bonus, then picks the winner.
    fn finish(&mut self) {
        scoring::score_tickets(&mut self.players);

        match self.rules.end_game_bonus {
            EndGameBonus::LongestPath(points) => {
                scoring::award_longest_path_bonus(&mut self.players, points);
            }
            EndGameBonus::Globetrotter(points) => {
                scoring::award_globetrotter_bonus(&mut self.players, points);
            }
            EndGameBonus::None => {}
        }

        self.winner = scoring::determine_winner(&self.players);
        self.phase = GamePhase::Finished;

        for player in &self.players {
            self.sink.observe(Observation::Score {
                player: player.id(),
                score: player.score(),
            });
        }

        info!(
            "Game over after {} moves, the winner is player {:?}.",
            self.total_moves, self.winner
        );
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            finished: self.phase == GamePhase::Finished,
            scores: self.players.iter().map(Player::score).collect(),
            winner: self.winner,
            total_moves: self.total_moves,
            completed_moves: self.completed_moves,
            players: self.players.iter().map(Player::summary).collect(),
        }
    }
}
