use crate::board::Board;
use crate::card::TrainColor;
use crate::city::CityToCity;
use crate::error::{ClaimError, ConfigError};
use crate::player::PlayerId;

use serde::Serialize;
use smallvec::SmallVec;

/// Index of a link, unique across the whole map.
pub type LinkId = usize;
/// Index of a route, in the order the board declares them.
pub type RouteId = usize;

/// Owners of the links of one route, in link order.
pub type RouteOwners = SmallVec<[Option<PlayerId>; 2]>;

/// One claimable track between two cities.
#[derive(Clone, Debug, PartialEq)]
struct Link {
    route_id: RouteId,
    /// The `Wild` color means that any color matches.
    color: TrainColor,
    claimed_by: Option<PlayerId>,
}

/// All "parallel" links connecting two adjacent cities.
#[derive(Clone, Debug, PartialEq)]
struct Route {
    cities: CityToCity,
    /// The number of train cards, and trains, needed to claim one of its links.
    length: u8,
    links: SmallVec<[LinkId; 2]>,
}

/// Everything there is to know about a link.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LinkInfo {
    pub link_id: LinkId,
    pub route_id: RouteId,
    pub cities: CityToCity,
    pub length: u8,
    pub color: TrainColor,
    pub claimed_by: Option<PlayerId>,
}

/// What a player puts on the table to claim a link.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ClaimRequest {
    pub player_id: PlayerId,
    /// The color the player pays with.
    pub color: TrainColor,
    /// How many cards of `color` the player holds.
    pub color_cards: u8,
    /// How many wild cards the player adds to the payment.
    pub wild_cards: u8,
    pub trains_remaining: u8,
}

/// The authoritative state of the board, per game.
/// This can be mutated as players claim links throughout the game.
#[derive(Clone, Debug)]
pub struct Map {
    routes: Vec<Route>,
    links: Vec<Link>,
    /// Depending on the number of players (>3) and the rules, parallel links might be claimed simultaneously.
    /// In all cases, parallel links cannot be claimed by the same player.
    parallel_links_allowed: bool,
}

impl Map {
    /// Creates the map of `board`, with no link claimed.
    ///
    /// Links are numbered in route order, then color order within a route.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride::board::{Board, BoardVariant};
    /// use ticket_to_ride::map::Map;
    ///
    /// let board = Board::builtin(BoardVariant::Usa).unwrap();
    ///
    /// let map = Map::new(&board, 2, true);
    /// assert!(map.is_ok());
    ///
    /// let map = Map::new(&board, 1, true);
    /// assert!(map.is_err());
    /// ```
    pub fn new(
        board: &Board,
        num_players: usize,
        wild_card_restriction: bool,
    ) -> Result<Self, ConfigError> {
        if !(2..=5).contains(&num_players) {
            return Err(ConfigError::InvalidPlayerCount(num_players));
        }

        let mut routes = Vec::with_capacity(board.routes().len());
        let mut links = Vec::new();

        for (route_id, route) in board.routes().iter().enumerate() {
            let mut route_links = SmallVec::new();
            for color in &route.colors {
                route_links.push(links.len());
                links.push(Link {
                    route_id,
                    color: *color,
                    claimed_by: None,
                });
            }

            routes.push(Route {
                cities: route.cities,
                length: route.length,
                links: route_links,
            });
        }

        Ok(Self {
            routes,
            links,
            parallel_links_allowed: !wild_card_restriction || num_players > 3,
        })
    }

    #[inline]
    pub fn num_links(&self) -> usize {
        self.links.len()
    }

    #[inline]
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    #[inline]
    pub fn parallel_links_allowed(&self) -> bool {
        self.parallel_links_allowed
    }

    /// # Example
    /// ```
    /// use ticket_to_ride::board::Board;
    /// use ticket_to_ride::card::TrainColor;
    /// use ticket_to_ride::error::ClaimError;
    /// use ticket_to_ride::map::Map;
    ///
    /// let board = Board::parse("Boston\nMontreal\n", "Boston, Montreal, 2, grey, red\n", "").unwrap();
    /// let map = Map::new(&board, 2, true).unwrap();
    ///
    /// let link = map.link_info(1).unwrap();
    /// assert_eq!(link.route_id, 0);
    /// assert_eq!(link.color, TrainColor::Red);
    /// assert_eq!(link.claimed_by, None);
    ///
    /// assert_eq!(map.link_info(2), Err(ClaimError::LinkNotFound(2)));
    /// ```
    pub fn link_info(&self, link_id: LinkId) -> Result<LinkInfo, ClaimError> {
        let (link, route) = self.link_and_route(link_id)?;

        Ok(LinkInfo {
            link_id,
            route_id: link.route_id,
            cities: route.cities,
            length: route.length,
            color: link.color,
            claimed_by: link.claimed_by,
        })
    }

    /// All the links, in id order.
    pub fn links(&self) -> impl Iterator<Item = LinkInfo> + '_ {
        (0..self.links.len()).filter_map(move |link_id| self.link_info(link_id).ok())
    }

    /// Who claimed each link of a route. Empty for an unknown route.
    pub fn route_owners(&self, route_id: RouteId) -> RouteOwners {
        self.routes
            .get(route_id)
            .map(|route| {
                route
                    .links
                    .iter()
                    .map(|link_id| self.links[*link_id].claimed_by)
                    .collect()
            })
            .unwrap_or_default()
    }

    #[inline]
    fn link_and_route(&self, link_id: LinkId) -> Result<(&Link, &Route), ClaimError> {
        let link = self
            .links
            .get(link_id)
            .ok_or(ClaimError::LinkNotFound(link_id))?;

        Ok((link, &self.routes[link.route_id]))
    }

    /// Whether the route of `link_id` still accepts a claim from `player_id`,
    /// regardless of the cards and trains the player holds.
    pub fn check_route_available(
        &self,
        link_id: LinkId,
        player_id: PlayerId,
    ) -> Result<(), ClaimError> {
        let (_, route) = self.link_and_route(link_id)?;
        let owners = route
            .links
            .iter()
            .map(|link_id| self.links[*link_id].claimed_by);

        if owners.clone().any(|owner| owner == Some(player_id)) {
            return Err(ClaimError::OwnLinkAlreadyOnRoute);
        }

        let num_claimed = owners.filter(Option::is_some).count();
        if num_claimed == route.links.len() {
            return Err(ClaimError::RouteFullyClaimed);
        }

        if num_claimed > 0 && !self.parallel_links_allowed {
            return Err(ClaimError::RouteLockedBySingleUsePolicy);
        }

        Ok(())
    }

    /// Checks whether `request` is enough to claim `link_id`.
    ///
    /// Returns the first reason the claim is rejected for, checking in order:
    /// the player's own links on the route, free links left on the route, the parallel
    /// link policy, the card color, the player's trains, and the number of cards offered.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride::board::Board;
    /// use ticket_to_ride::card::TrainColor;
    /// use ticket_to_ride::error::ClaimError;
    /// use ticket_to_ride::map::{ClaimRequest, Map};
    ///
    /// let board = Board::parse("Boston\nMontreal\n", "Boston, Montreal, 3, grey\n", "").unwrap();
    /// let map = Map::new(&board, 2, true).unwrap();
    ///
    /// let mut request = ClaimRequest {
    ///     player_id: 0,
    ///     color: TrainColor::Red,
    ///     color_cards: 3,
    ///     wild_cards: 0,
    ///     trains_remaining: 45,
    /// };
    /// assert_eq!(map.validate_claim(0, &request), Ok(()));
    ///
    /// request.color_cards = 2;
    /// assert_eq!(
    ///     map.validate_claim(0, &request),
    ///     Err(ClaimError::InsufficientCards { needed: 3, offered: 2 })
    /// );
    /// ```
    pub fn validate_claim(&self, link_id: LinkId, request: &ClaimRequest) -> Result<(), ClaimError> {
        self.check_route_available(link_id, request.player_id)?;

        let (link, route) = self.link_and_route(link_id)?;

        if request.color.is_wild() {
            return Err(ClaimError::InvalidCardColor);
        }

        if link.color.is_not_wild() && link.color != request.color {
            return Err(ClaimError::ColorMismatch {
                link_color: link.color,
                card_color: request.color,
            });
        }

        if route.length > request.trains_remaining {
            return Err(ClaimError::InsufficientTrainFigures {
                needed: route.length,
                remaining: request.trains_remaining,
            });
        }

        let offered = request.color_cards.saturating_add(request.wild_cards);
        if offered < route.length {
            return Err(ClaimError::InsufficientCards {
                needed: route.length,
                offered,
            });
        }

        Ok(())
    }

    /// Marks `link_id` as claimed by `player_id`.
    ///
    /// Only the link itself and its parallel links are looked at: the claim must have
    /// gone through [`Map::validate_claim`] first.
    pub fn claim_link(&mut self, link_id: LinkId, player_id: PlayerId) -> Result<LinkInfo, ClaimError> {
        let (link, route) = self.link_and_route(link_id)?;

        if link.claimed_by.is_some() {
            return Err(ClaimError::AlreadyClaimed);
        }

        let parallel_link_blocks = |other: &LinkId| match self.links[*other].claimed_by {
            Some(owner) => owner == player_id || !self.parallel_links_allowed,
            None => false,
        };
        if route.links.iter().any(parallel_link_blocks) {
            return Err(ClaimError::RouteLocked);
        }

        self.links[link_id].claimed_by = Some(player_id);

        self.link_info(link_id)
    }

    /// The links `player_id` could still claim, given enough cards and trains.
    pub fn claimable_links(&self, player_id: PlayerId) -> Vec<LinkId> {
        (0..self.links.len())
            .filter(|link_id| {
                self.links[*link_id].claimed_by.is_none()
                    && self.check_route_available(*link_id, player_id).is_ok()
            })
            .collect()
    }

    /// The links claimed by `player_id`, in id order.
    pub fn links_claimed_by(&self, player_id: PlayerId) -> Vec<LinkId> {
        self.links
            .iter()
            .enumerate()
            .filter(|(_, link)| link.claimed_by == Some(player_id))
            .map(|(link_id, _)| link_id)
            .collect()
    }
}
