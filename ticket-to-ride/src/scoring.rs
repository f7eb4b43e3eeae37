use crate::player::{Player, PlayerId};

use log::info;

/// Adds the points of completed tickets, and subtracts the points of the others.
pub fn score_tickets(players: &mut [Player]) {
    for player in players.iter_mut() {
        let points: i32 = player
            .tickets()
            .iter()
            .map(|held| {
                if held.completed {
                    held.ticket.points
                } else {
                    -held.ticket.points
                }
            })
            .sum();

        info!("Player {} scores {} points from tickets.", player.id(), points);
        player.add_points(points);
    }
}

/// Awards `points` to every player tied for the longest continuous path.
///
/// Returns the length of that path, in links. When nobody claimed anything, everybody
/// ties at 0 and gets the bonus.
pub fn award_longest_path_bonus(players: &mut [Player], points: i32) -> usize {
    let lengths: Vec<usize> = players.iter().map(Player::longest_path).collect();
    let longest = lengths.iter().copied().max().unwrap_or(0);

    for (player, length) in players.iter_mut().zip(lengths) {
        if length == longest {
            info!(
                "Player {} gets the longest path bonus ({} links).",
                player.id(),
                length
            );
            player.award_longest_path_bonus(points);
        }
    }

    longest
}

/// Awards `points` to every player tied for the most completed tickets.
///
/// Returns that number of tickets.
pub fn award_globetrotter_bonus(players: &mut [Player], points: i32) -> usize {
    let most_completed = players
        .iter()
        .map(Player::num_completed_tickets)
        .max()
        .unwrap_or(0);

    for player in players.iter_mut() {
        if player.num_completed_tickets() == most_completed {
            info!(
                "Player {} gets the globetrotter bonus ({} tickets).",
                player.id(),
                most_completed
            );
            player.award_globetrotter_bonus(points);
        }
    }

    most_completed
}

/// Player ids from first to last place.
///
/// Players are ranked by score, then by number of completed tickets, then by whether
/// they got the longest path bonus. Remaining ties keep turn order.
pub fn ranking(players: &[Player]) -> Vec<PlayerId> {
    let rank_key = |player: &Player| {
        (
            player.score(),
            player.num_completed_tickets(),
            player.longest_path_bonus_awarded(),
        )
    };

    let mut ranked: Vec<&Player> = players.iter().collect();
    ranked.sort_by(|a, b| rank_key(b).cmp(&rank_key(a)));

    ranked.into_iter().map(Player::id).collect()
}

pub fn determine_winner(players: &[Player]) -> Option<PlayerId> {
    ranking(players).first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::city::CityId;
    use crate::ticket::Ticket;

    fn city(index: usize) -> CityId {
        CityId::new(index).unwrap()
    }

    fn players(num: usize) -> Vec<Player> {
        (0..num).map(|id| Player::new(id, 45)).collect()
    }

    fn complete_ticket(player: &mut Player, ticket_id: usize, points: i32) {
        player.add_ticket(Ticket::new(ticket_id, city(0), city(1), points));
        player.complete_ticket(ticket_id).unwrap();
    }

    fn connect(player: &mut Player, cities: &[(usize, usize)]) {
        for (start, end) in cities {
            player.get_mut_network().add_link((city(*start), city(*end)));
        }
    }

    #[test]
    fn score_tickets_adds_and_subtracts() {
        let mut players = players(2);
        complete_ticket(&mut players[0], 0, 8);
        players[0].add_ticket(Ticket::new(1, city(2), city(3), 5));
        players[1].add_ticket(Ticket::new(2, city(2), city(3), 11));

        score_tickets(&mut players);

        assert_eq!(players[0].score(), 3);
        assert_eq!(players[1].score(), -11);
    }

    #[test]
    fn longest_path_bonus_single_winner() {
        let mut players = players(3);
        connect(&mut players[0], &[(0, 1), (1, 2)]);
        connect(&mut players[1], &[(3, 4), (4, 5), (5, 6)]);

        assert_eq!(award_longest_path_bonus(&mut players, 10), 3);

        assert!(!players[0].longest_path_bonus_awarded());
        assert!(players[1].longest_path_bonus_awarded());
        assert_eq!(players[1].score(), 10);
        assert_eq!(players[2].score(), 0);
    }

    #[test]
    fn longest_path_bonus_ties() {
        let mut players = players(3);
        connect(&mut players[0], &[(0, 1), (1, 2)]);
        connect(&mut players[2], &[(3, 4), (4, 5)]);

        assert_eq!(award_longest_path_bonus(&mut players, 10), 2);

        let awarded: Vec<bool> = players.iter().map(Player::longest_path_bonus_awarded).collect();
        assert_eq!(awarded, vec![true, false, true]);
    }

    #[test]
    fn longest_path_bonus_without_claims() {
        let mut players = players(2);

        assert_eq!(award_longest_path_bonus(&mut players, 10), 0);
        assert!(players.iter().all(|player| player.score() == 10));
    }

    #[test]
    fn globetrotter_bonus_ties() {
        let mut players = players(3);
        complete_ticket(&mut players[0], 0, 4);
        complete_ticket(&mut players[1], 1, 4);
        complete_ticket(&mut players[1], 2, 4);
        complete_ticket(&mut players[2], 3, 4);
        complete_ticket(&mut players[2], 4, 4);

        assert_eq!(award_globetrotter_bonus(&mut players, 10), 2);

        let awarded: Vec<bool> = players.iter().map(Player::globetrotter_bonus_awarded).collect();
        assert_eq!(awarded, vec![false, true, true]);
    }

    #[test]
    fn ranking_by_score() {
        let mut players = players(3);
        players[0].add_points(12);
        players[1].add_points(30);
        players[2].add_points(-4);

        assert_eq!(ranking(&players), vec![1, 0, 2]);
        assert_eq!(determine_winner(&players), Some(1));
    }

    #[test]
    fn ranking_tie_breaks() {
        let mut players = players(4);
        for player in players.iter_mut() {
            player.add_points(20);
        }
        // Player 2 completed more tickets, player 3 has the longest path bonus,
        // players 0 and 1 are tied on everything.
        complete_ticket(&mut players[2], 0, 0);
        players[3].award_longest_path_bonus(0);

        assert_eq!(ranking(&players), vec![2, 3, 0, 1]);
        assert_eq!(determine_winner(&players), Some(2));
    }

    #[test]
    fn determine_winner_without_players() {
        assert_eq!(determine_winner(&[]), None);
    }
}
