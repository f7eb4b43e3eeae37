use crate::board::BoardVariant;
use crate::error::ConfigError;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Extra points handed out once the game is over.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndGameBonus {
    None,
    /// Awarded to every player tied for the longest continuous path.
    LongestPath(i32),
    /// Awarded to every player tied for the most completed tickets.
    Globetrotter(i32),
}

/// Every tunable of a game.
///
/// Missing fields fall back to the USA defaults when deserializing, see
/// [`Rules::from_json_for_variant`] for the defaults of another variant.
///
/// # Example
/// ```
/// use ticket_to_ride::rules::Rules;
///
/// let rules = Rules::from_json(r#"{"train_figures_num": 30}"#).unwrap();
/// assert_eq!(rules.train_figures_num, 30);
/// assert_eq!(rules.route_value(6), Some(15));
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Rules {
    /// Tickets dealt when a player draws tickets during the game.
    pub tickets_dealt_num: usize,
    /// Minimum number of those tickets the player keeps.
    pub tickets_to_keep_num: usize,
    /// Tickets dealt to every player before the first turn.
    pub initial_tickets_dealt_num: usize,
    pub initial_tickets_to_keep_num: usize,
    /// Trains each player starts with.
    pub train_figures_num: u8,
    pub wild_cards_num: usize,
    pub cards_per_color_num: usize,
    /// Train cards taken by one draw action.
    pub train_cards_dealt_num: usize,
    /// Face-up wild cards that trigger a wipe of the display.
    pub max_wild_cards: usize,
    /// Consecutive wipes allowed during one refill of the display.
    pub max_face_up_wipes: usize,
    pub starting_hand_size: usize,
    /// A player ending their turn with this many trains or fewer starts the last round.
    pub min_train_figures_num: u8,
    /// Points granted for claiming a route, by route length.
    pub route_values: BTreeMap<u8, i32>,
    /// Restricts face-up wild cards to the first draw, and closes parallel
    /// links after the first claim in games with fewer than 4 players.
    pub wild_card_restriction: bool,
    pub end_game_bonus: EndGameBonus,
}

impl Rules {
    /// Default rules of a board variant.
    pub fn for_variant(variant: BoardVariant) -> Self {
        let usa = Self {
            tickets_dealt_num: 3,
            tickets_to_keep_num: 1,
            initial_tickets_dealt_num: 3,
            initial_tickets_to_keep_num: 2,
            train_figures_num: 45,
            wild_cards_num: 14,
            cards_per_color_num: 12,
            train_cards_dealt_num: 2,
            max_wild_cards: 3,
            max_face_up_wipes: 5,
            starting_hand_size: 4,
            min_train_figures_num: 3,
            route_values: [(1, 1), (2, 2), (3, 4), (4, 7), (5, 10), (6, 15), (8, 21), (9, 27)]
                .into_iter()
                .collect(),
            wild_card_restriction: true,
            end_game_bonus: EndGameBonus::LongestPath(10),
        };

        match variant {
            BoardVariant::Usa | BoardVariant::Europe => usa,
            BoardVariant::Nordic => Self {
                wild_card_restriction: false,
                end_game_bonus: EndGameBonus::Globetrotter(10),
                ..usa
            },
        }
    }

    /// Parses rules from JSON, filling the gaps with the USA defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Self::from_json_for_variant(BoardVariant::Usa, json)
    }

    /// Parses rules from JSON, filling the gaps with the defaults of `variant`.
    ///
    /// Top-level fields replace the defaults as a whole, so a `route_values` object
    /// replaces the entire table.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride::board::BoardVariant;
    /// use ticket_to_ride::rules::{EndGameBonus, Rules};
    ///
    /// let json = r#"{"train_figures_num": 20}"#;
    /// let rules = Rules::from_json_for_variant(BoardVariant::Nordic, json).unwrap();
    /// assert_eq!(rules.train_figures_num, 20);
    /// assert!(!rules.wild_card_restriction);
    /// assert_eq!(rules.end_game_bonus, EndGameBonus::Globetrotter(10));
    /// ```
    pub fn from_json_for_variant(variant: BoardVariant, json: &str) -> Result<Self, ConfigError> {
        use serde_json::Value;

        let defaults = serde_json::to_value(Self::for_variant(variant))?;
        let overrides: Value = serde_json::from_str(json)?;

        let merged = match (defaults, overrides) {
            (Value::Object(mut fields), Value::Object(overrides)) => {
                fields.extend(overrides);
                Value::Object(fields)
            }
            (_, overrides) => overrides,
        };

        let rules: Self = serde_json::from_value(merged)?;
        rules.validate()?;

        Ok(rules)
    }

    /// Checks that every count fits in a player's hand.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let max = u8::MAX as usize;

        for (kind, count) in [
            ("wild", self.wild_cards_num),
            ("colored", self.cards_per_color_num),
        ] {
            if count > max {
                return Err(ConfigError::TooManyTrainCards { kind, count, max });
            }
        }

        Ok(())
    }

    /// Points for claiming a route of the given length.
    #[inline]
    pub fn route_value(&self, length: u8) -> Option<i32> {
        self.route_values.get(&length).copied()
    }

    /// Number of train cards in a full deck.
    pub fn deck_size(&self) -> usize {
        self.wild_cards_num + crate::card::NUM_NON_WILD_COLORS * self.cards_per_color_num
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::for_variant(BoardVariant::Usa)
    }
}
