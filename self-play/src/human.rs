use std::io::{self, BufRead, Write};
use strum::IntoEnumIterator;
use ticket_to_ride::board::Board;
use ticket_to_ride::card::{TrainColor, NUM_FACE_UP_CARDS};
use ticket_to_ride::decision::{
    ActionKind, DecisionContext, DecisionSource, TicketSelection, TrainCardDraw,
};
use ticket_to_ride::map::LinkId;
use ticket_to_ride::ticket::Ticket;

/// Asks a person for every decision, through a text console.
///
/// Invalid answers are asked again. Once the input is exhausted, the first option is
/// picked for every remaining question.
pub struct ConsoleDecider<R, W> {
    input: R,
    output: W,
    board: Board,
}

impl ConsoleDecider<io::BufReader<io::Stdin>, io::Stdout> {
    pub fn stdio(board: Board) -> Self {
        Self::new(io::BufReader::new(io::stdin()), io::stdout(), board)
    }
}

impl<R: BufRead, W: Write> ConsoleDecider<R, W> {
    pub fn new(input: R, output: W, board: Board) -> Self {
        Self {
            input,
            output,
            board,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    // Write errors are ignored.
    fn say(&mut self, message: &str) {
        let _ = writeln!(self.output, "{}", message);
    }

    /// Asks `question` until the answer is a number in `0..=max`.
    fn ask_number(&mut self, question: &str, max: usize) -> usize {
        loop {
            let _ = write!(self.output, "{} [0-{}]: ", question, max);
            let _ = self.output.flush();

            let mut answer = String::new();
            match self.input.read_line(&mut answer) {
                Ok(0) | Err(_) => return 0,
                Ok(_) => {}
            }

            match answer.trim().parse::<usize>() {
                Ok(number) if number <= max => return number,
                _ => self.say(&format!("Please answer with a number between 0 and {}.", max)),
            }
        }
    }

    fn ask_yes_no(&mut self, question: &str) -> bool {
        loop {
            let _ = write!(self.output, "{} [y/n]: ", question);
            let _ = self.output.flush();

            let mut answer = String::new();
            match self.input.read_line(&mut answer) {
                Ok(0) | Err(_) => return true,
                Ok(_) => {}
            }

            match answer.trim().to_lowercase().as_str() {
                "y" | "yes" => return true,
                "n" | "no" => return false,
                _ => self.say("Please answer with y or n."),
            }
        }
    }

    fn describe_hand(&mut self, context: &DecisionContext) {
        let player = context.player;
        let hand = TrainColor::iter()
            .filter(|color| player.num_cards(*color) > 0)
            .map(|color| format!("{} {}", player.num_cards(color), color))
            .collect::<Vec<_>>()
            .join(", ");

        self.say(&format!(
            "Player {}: {} points, {} trains, cards: {}",
            player.id(),
            player.score(),
            player.trains_remaining(),
            if hand.is_empty() { "none" } else { hand.as_str() }
        ));
    }

    fn describe_face_up(&mut self, context: &DecisionContext) {
        for (slot, card) in context.face_up.iter().enumerate() {
            let card = card.map_or(String::from("empty"), |color| color.to_string());
            self.say(&format!("  {}) face-up {}", slot, card));
        }
    }
}

impl<R: BufRead + Send, W: Write + Send> DecisionSource for ConsoleDecider<R, W> {
    fn choose_action(&mut self, context: &DecisionContext) -> ActionKind {
        self.describe_hand(context);
        for action in ActionKind::iter() {
            self.say(&format!("  {}) {}", action as u8, action));
        }

        match self.ask_number("What do you want to do?", ActionKind::iter().count() - 1) {
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
        self.say(&format!("Keep at least {} of these tickets.", min_keep));

        let mut selection = TicketSelection::default();
        for (index, ticket) in dealt.iter().enumerate() {
            let question = format!(
                "Keep {} ({} points)?",
                self.board.describe(ticket.destination),
                ticket.points
            );
            if self.ask_yes_no(&question) {
                selection.kept.push(index);
            } else {
                selection.discarded.push(index);
            }
        }

        selection
    }

    fn choose_route(&mut self, context: &DecisionContext) -> LinkId {
        let claimable = context.map.claimable_links(context.player.id());
        if claimable.is_empty() {
            self.say("There is no route left to claim.");
            return 0;
        }

        for (index, link_id) in claimable.iter().enumerate() {
            if let Ok(link) = context.map.link_info(*link_id) {
                self.say(&format!(
                    "  {}) {} ({} {})",
                    index,
                    self.board.describe(link.cities),
                    link.length,
                    if link.color.is_wild() {
                        String::from("grey")
                    } else {
                        link.color.to_string()
                    }
                ));
            }
        }

        let index = self.ask_number("Which route?", claimable.len() - 1);
        claimable[index]
    }

    fn choose_card_color(&mut self, context: &DecisionContext) -> TrainColor {
        let colors: Vec<TrainColor> = TrainColor::paying_colors().collect();
        for (index, color) in colors.iter().enumerate() {
            self.say(&format!(
                "  {}) {} ({} held)",
                index,
                color,
                context.player.num_cards(*color)
            ));
        }

        let index = self.ask_number("Which color do you pay with?", colors.len() - 1);
        colors[index]
    }

    fn choose_wild_cards_to_offer(&mut self, context: &DecisionContext) -> u8 {
        let held = context.player.num_cards(TrainColor::Wild);
        if held == 0 {
            return 0;
        }

        self.ask_number("How many wild cards do you add?", held as usize) as u8
    }

    fn choose_train_card_draw(&mut self, context: &DecisionContext) -> TrainCardDraw {
        self.describe_face_up(context);
        self.say(&format!("  {}) draw pile", NUM_FACE_UP_CARDS));

        TrainCardDraw::from_index(self.ask_number("Which card?", NUM_FACE_UP_CARDS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;
    use ticket_to_ride::board::BoardVariant;
    use ticket_to_ride::city::CityId;
    use ticket_to_ride::map::Map;
    use ticket_to_ride::player::Player;
    use ticket_to_ride::rules::Rules;

    fn console(input: &str) -> ConsoleDecider<Cursor<Vec<u8>>, Vec<u8>> {
        ConsoleDecider::new(
            Cursor::new(input.as_bytes().to_vec()),
            Vec::new(),
            Board::builtin(BoardVariant::Usa).unwrap(),
        )
    }

    fn with_context<F: FnOnce(&DecisionContext)>(player: &Player, test: F) {
        let board = Board::builtin(BoardVariant::Usa).unwrap();
        let map = Map::new(&board, 2, true).unwrap();
        let rules = Rules::default();
        let face_up = [Some(TrainColor::Blue); NUM_FACE_UP_CARDS];

        test(&DecisionContext {
            player,
            map: &map,
            face_up: &face_up,
            rules: &rules,
            num_players: 2,
        });
    }

    #[test]
    fn console_decider_action() {
        with_context(&Player::new(0, 45), |context| {
            let mut decider = console("2\n");
            assert_eq!(decider.choose_action(context), ActionKind::DrawTrainCards);

            let output = String::from_utf8(decider.into_output()).unwrap();
            assert!(output.contains("0) claim a route"));
            assert!(output.contains("Player 0: 0 points, 45 trains, cards: none"));
        });
    }

    #[test]
    fn console_decider_asks_again() {
        with_context(&Player::new(0, 45), |context| {
            let mut decider = console("seven\n9\n5\n");
            assert_eq!(
                decider.choose_train_card_draw(context),
                TrainCardDraw::DrawPile
            );

            let output = String::from_utf8(decider.into_output()).unwrap();
            assert_eq!(output.matches("Please answer").count(), 2);
        });
    }

    #[test]
    fn console_decider_end_of_input() {
        with_context(&Player::new(0, 45), |context| {
            let mut decider = console("");
            assert_eq!(decider.choose_action(context), ActionKind::ClaimRoute);
            assert_eq!(
                decider.choose_train_card_draw(context),
                TrainCardDraw::FaceUp(0)
            );
        });
    }

    #[test]
    fn console_decider_tickets() {
        with_context(&Player::new(0, 45), |context| {
            let city = |index| CityId::new(index).unwrap();
            let dealt = vec![
                Ticket::new(0, city(0), city(1), 5),
                Ticket::new(1, city(2), city(3), 8),
                Ticket::new(2, city(4), city(5), 11),
            ];
            let mut decider = console("y\nmaybe\nn\nyes\n");

            let selection = decider.choose_tickets_to_keep(context, &dealt, 1);

            assert_eq!(selection.kept.to_vec(), vec![0, 2]);
            assert_eq!(selection.discarded.to_vec(), vec![1]);
            assert!(selection.is_valid(3, 1));
        });
    }

    #[test]
    fn console_decider_claim() {
        let mut player = Player::new(1, 45);
        player.add_train_card(TrainColor::Wild);
        player.add_train_card(TrainColor::Wild);

        with_context(&player, |context| {
            let mut decider = console("3\n1\n4\n2\n");
            let claimable = context.map.claimable_links(1);

            assert_eq!(decider.choose_route(context), claimable[3]);
            assert_eq!(decider.choose_card_color(context), TrainColor::Blue);
            // Only 2 wild cards are held, so 4 is asked again.
            assert_eq!(decider.choose_wild_cards_to_offer(context), 2);
        });
    }
}
