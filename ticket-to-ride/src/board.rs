use crate::card::TrainColor;
use crate::city::{CityId, CityToCity, MAX_CITIES};
use crate::error::ConfigError;
use crate::ticket::Ticket;

use log::info;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

const USA_CITIES: &str = include_str!("../data/usa/cities.txt");
const USA_ROUTES: &str = include_str!("../data/usa/routes.txt");
const USA_TICKETS: &str = include_str!("../data/usa/tickets.txt");

/// The board editions the engine knows the rules of.
#[derive(
    Clone, Copy, Debug, Deserialize, Display, EnumIter, EnumString, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BoardVariant {
    Usa,
    Europe,
    Nordic,
}

/// The static data files making up a board.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum DataKind {
    Cities,
    Routes,
    Tickets,
}

impl DataKind {
    fn file_name(&self) -> &'static str {
        match self {
            DataKind::Cities => "cities.txt",
            DataKind::Routes => "routes.txt",
            DataKind::Tickets => "tickets.txt",
        }
    }
}

/// A route as declared in the board data: one color per parallel link.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RouteEntry {
    pub cities: CityToCity,
    pub length: u8,
    /// [`TrainColor::Wild`] denotes a grey link.
    pub colors: SmallVec<[TrainColor; 2]>,
}

/// Static, read-only description of a board: its cities, routes and tickets.
#[derive(Clone, Debug, PartialEq)]
pub struct Board {
    cities: Vec<String>,
    city_ids: HashMap<String, CityId>,
    routes: Vec<RouteEntry>,
    tickets: Vec<Ticket>,
}

impl Board {
    /// Parses a board from the contents of its three data files.
    ///
    /// Cities are listed one per line. Routes are `cityA, cityB, length, color[, color2]`,
    /// where `grey` accepts any color and a second color denotes a double route.
    /// Tickets are `cityA, cityB, value`. Blank lines are ignored.
    ///
    /// # Example
    /// ```
    /// use ticket_to_ride::board::Board;
    ///
    /// let board = Board::parse(
    ///     "Boston\nNew York\nMontreal\n",
    ///     "Boston, New York, 2, yellow, red\nBoston, Montreal, 2, grey\n",
    ///     "Montreal, New York, 4\n",
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(board.num_cities(), 3);
    /// assert_eq!(board.routes()[0].colors.len(), 2);
    /// assert_eq!(board.tickets()[0].points, 4);
    /// ```
    pub fn parse(cities: &str, routes: &str, tickets: &str) -> Result<Self, ConfigError> {
        let mut board = Self {
            cities: Vec::new(),
            city_ids: HashMap::new(),
            routes: Vec::new(),
            tickets: Vec::new(),
        };

        for (line, name) in data_lines(cities) {
            board.add_city(line, name)?;
        }

        for (line, content) in data_lines(routes) {
            let fields: SmallVec<[&str; 5]> = content.split(',').map(str::trim).collect();
            if fields.len() < 4 || fields.len() > 5 {
                return Err(malformed(DataKind::Routes, line, content));
            }

            let cities = board.parse_city_pair(DataKind::Routes, line, content, &fields)?;
            let length: u8 = parse_number(DataKind::Routes, line, fields[2])?;
            if length == 0 {
                return Err(malformed(DataKind::Routes, line, content));
            }
            let colors = fields[3..]
                .iter()
                .map(|color| parse_link_color(line, color))
                .collect::<Result<_, _>>()?;

            board.routes.push(RouteEntry {
                cities,
                length,
                colors,
            });
        }

        for (line, content) in data_lines(tickets) {
            let fields: SmallVec<[&str; 3]> = content.split(',').map(str::trim).collect();
            if fields.len() != 3 {
                return Err(malformed(DataKind::Tickets, line, content));
            }

            let (start, end) = board.parse_city_pair(DataKind::Tickets, line, content, &fields)?;
            let points = parse_number(DataKind::Tickets, line, fields[2])?;

            board
                .tickets
                .push(Ticket::new(board.tickets.len(), start, end, points));
        }

        Ok(board)
    }

    /// Reads `cities.txt`, `routes.txt` and `tickets.txt` from a directory.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let read = |kind: DataKind| {
            let path = dir.join(kind.file_name());
            fs::read_to_string(&path).map_err(|source| ConfigError::Io { path, source })
        };

        let board = Self::parse(
            &read(DataKind::Cities)?,
            &read(DataKind::Routes)?,
            &read(DataKind::Tickets)?,
        )?;
        info!(
            "Loaded a board with {} cities, {} routes and {} tickets from {}.",
            board.num_cities(),
            board.routes.len(),
            board.tickets.len(),
            dir.display()
        );

        Ok(board)
    }

    /// The board shipped with the crate for `variant`.
    ///
    /// Only the USA board is built in.
    pub fn builtin(variant: BoardVariant) -> Result<Self, ConfigError> {
        match variant {
            BoardVariant::Usa => Self::parse(USA_CITIES, USA_ROUTES, USA_TICKETS),
            _ => Err(ConfigError::NoBuiltinBoard(variant)),
        }
    }

    /// Loads the board from `data_dir` if given, otherwise falls back to the built-in board.
    pub fn load(variant: BoardVariant, data_dir: Option<&Path>) -> Result<Self, ConfigError> {
        match data_dir {
            Some(dir) => Self::load_dir(dir),
            None => Self::builtin(variant),
        }
    }

    fn add_city(&mut self, line: usize, name: &str) -> Result<(), ConfigError> {
        if self.city_ids.contains_key(name) {
            return Err(ConfigError::DuplicateCity {
                line,
                city: name.to_owned(),
            });
        }

        let city = CityId::new(self.cities.len()).ok_or(ConfigError::TooManyCities {
            count: self.cities.len() + 1,
            max: MAX_CITIES,
        })?;
        self.city_ids.insert(name.to_owned(), city);
        self.cities.push(name.to_owned());

        Ok(())
    }

    fn parse_city_pair(
        &self,
        kind: DataKind,
        line: usize,
        content: &str,
        fields: &[&str],
    ) -> Result<CityToCity, ConfigError> {
        let lookup = |name: &str| {
            self.city_id(name).ok_or_else(|| ConfigError::UnknownCity {
                kind,
                line,
                city: name.to_owned(),
            })
        };

        let cities = (lookup(fields[0])?, lookup(fields[1])?);
        if cities.0 == cities.1 {
            return Err(malformed(kind, line, content));
        }

        Ok(cities)
    }

    #[inline]
    pub fn num_cities(&self) -> usize {
        self.cities.len()
    }

    pub fn city_id(&self, name: &str) -> Option<CityId> {
        self.city_ids.get(name).copied()
    }

    pub fn city_name(&self, city: CityId) -> &str {
        self.cities
            .get(city.index())
            .map(String::as_str)
            .unwrap_or("?")
    }

    /// Human-readable form of a city pair, e.g. `Boston - Miami`.
    pub fn describe(&self, (start, end): CityToCity) -> String {
        format!("{} - {}", self.city_name(start), self.city_name(end))
    }

    pub fn cities(&self) -> &[String] {
        &self.cities
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }
}

/// Non-blank lines, with their 1-based line number.
fn data_lines(data: &str) -> impl Iterator<Item = (usize, &str)> {
    data.lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

fn malformed(kind: DataKind, line: usize, content: &str) -> ConfigError {
    ConfigError::MalformedLine {
        kind,
        line,
        content: content.to_owned(),
    }
}

fn parse_number<T: FromStr>(kind: DataKind, line: usize, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidNumber {
        kind,
        line,
        value: value.to_owned(),
    })
}

fn parse_link_color(line: usize, color: &str) -> Result<TrainColor, ConfigError> {
    match color {
        "grey" | "gray" => Ok(TrainColor::Wild),
        _ => TrainColor::from_str(color)
            .ok()
            .filter(TrainColor::is_not_wild)
            .ok_or_else(|| ConfigError::UnknownColor {
                line,
                color: color.to_owned(),
            }),
    }
}
